use thiserror::Error;

#[derive(Debug, Error)]
pub enum OncoactError {
    #[error("Invalid knowledge-base record: {0}")]
    InvalidRecord(String),

    #[error("Ontology error: {0}")]
    Ontology(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, OncoactError>;
