//! Matching configuration.
//!
//! Tunes the driver-likelihood policies of the leaf matchers and names the
//! ontology root. Loaded from TOML or YAML; every field has a default, so an
//! empty file is a valid configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{OncoactError, Result};
use crate::profile::DriverLikelihood;

/// Environment variable pointing at a matching config file.
pub const CONFIG_ENV_VAR: &str = "ONCOACT_CONFIG";

/// Disease Ontology code for "cancer", the root of the tumor ontology.
pub const DEFAULT_ONTOLOGY_ROOT: &str = "162";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Require `High` driver likelihood for exact hotspot matches.
    /// Off by default: an exact locus hit is actionable on its own.
    #[serde(default)]
    pub hotspot_requires_high_driver_likelihood: bool,

    /// Minimum driver likelihood for codon/exon range matches.
    #[serde(default = "default_high")]
    pub range_min_driver_likelihood: DriverLikelihood,

    /// Minimum driver likelihood for variant-based gene events.
    #[serde(default = "default_high")]
    pub gene_event_min_driver_likelihood: DriverLikelihood,

    /// Ontology code that means "any cancer type".
    #[serde(default = "default_ontology_root")]
    pub ontology_root_code: String,
}

fn default_high() -> DriverLikelihood { DriverLikelihood::High }
fn default_ontology_root() -> String { DEFAULT_ONTOLOGY_ROOT.to_string() }

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            hotspot_requires_high_driver_likelihood: false,
            range_min_driver_likelihood: default_high(),
            gene_event_min_driver_likelihood: default_high(),
            ontology_root_code: default_ontology_root(),
        }
    }
}

impl MatchingConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file, choosing the format by extension (`.yaml`/`.yml`, else TOML).
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content),
            _ => Self::from_toml_str(&content),
        }
    }

    /// Load from the file named by `ONCOACT_CONFIG`, or fall back to defaults.
    pub fn load() -> Result<Self> {
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) => {
                tracing::info!(path = %path, "Loading matching configuration");
                Self::from_path(&path)
            }
            Err(_) => {
                tracing::debug!("{} not set, using default matching configuration", CONFIG_ENV_VAR);
                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.ontology_root_code.trim().is_empty() {
            return Err(OncoactError::Config("ontology_root_code must not be empty".to_string()));
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
