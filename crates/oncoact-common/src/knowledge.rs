//! Knowledge-base record types: leaf predicates, criteria, treatment evidence and trials.
//! Records are validated once at construction and never mutated afterwards.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{OncoactError, Result};
use crate::profile::ProteinEffect;

// ---------------------------------------------------------------------------
// Leaf predicates
// ---------------------------------------------------------------------------

/// Exact single-locus alteration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HotspotPredicate {
    pub gene: String,
    pub chromosome: String,
    pub position: u64,
    pub ref_allele: String,
    pub alt_allele: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeKind {
    Codon,
    Exon,
}

/// Which kinds of mutation a range predicate applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationType {
    Any,
    Missense,
    NonsenseOrFrameshift,
    Splice,
    Inframe,
    InframeDeletion,
    InframeInsertion,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RangePredicate {
    pub gene: String,
    pub chromosome: String,
    pub start: u64,
    pub end: u64,
    pub kind: RangeKind,
    pub applicable_mutation_type: MutationType,
}

impl RangePredicate {
    pub fn new(
        gene: impl Into<String>,
        chromosome: impl Into<String>,
        start: u64,
        end: u64,
        kind: RangeKind,
        applicable_mutation_type: MutationType,
    ) -> Result<Self> {
        let range = Self {
            gene: gene.into(),
            chromosome: chromosome.into(),
            start,
            end,
            kind,
            applicable_mutation_type,
        };
        range.validate()?;
        Ok(range)
    }

    fn validate(&self) -> Result<()> {
        if self.start > self.end {
            return Err(OncoactError::InvalidRecord(format!(
                "range on {} has start {} after end {}",
                self.gene, self.start, self.end
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneEvent {
    AnyMutation,
    Activation,
    Inactivation,
    Amplification,
    Deletion,
    Fusion,
    AbsenceOfProtein,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GeneEventPredicate {
    pub gene: String,
    pub event: GeneEvent,
}

/// Exact fusion pair, optionally restricted to fused exon ranges.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FusionPredicate {
    pub gene_up: String,
    pub gene_down: String,
    #[serde(default)]
    pub min_exon_up: Option<u32>,
    #[serde(default)]
    pub max_exon_up: Option<u32>,
    #[serde(default)]
    pub min_exon_down: Option<u32>,
    #[serde(default)]
    pub max_exon_down: Option<u32>,
}

impl FusionPredicate {
    pub fn new(gene_up: impl Into<String>, gene_down: impl Into<String>) -> Self {
        Self {
            gene_up: gene_up.into(),
            gene_down: gene_down.into(),
            min_exon_up: None,
            max_exon_up: None,
            min_exon_down: None,
            max_exon_down: None,
        }
    }

    pub fn with_exon_up(mut self, min: u32, max: u32) -> Result<Self> {
        self.min_exon_up = Some(min);
        self.max_exon_up = Some(max);
        self.validate()?;
        Ok(self)
    }

    pub fn with_exon_down(mut self, min: u32, max: u32) -> Result<Self> {
        self.min_exon_down = Some(min);
        self.max_exon_down = Some(max);
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        let inverted = |min: Option<u32>, max: Option<u32>| matches!((min, max), (Some(lo), Some(hi)) if lo > hi);
        if inverted(self.min_exon_up, self.max_exon_up) || inverted(self.min_exon_down, self.max_exon_down) {
            return Err(OncoactError::InvalidRecord(format!(
                "fusion {}::{} has inverted exon bounds",
                self.gene_up, self.gene_down
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharacteristicType {
    MicrosatelliteStable,
    MicrosatelliteUnstable,
    HighTumorMutationalBurden,
    LowTumorMutationalBurden,
    HighTumorMutationalLoad,
    LowTumorMutationalLoad,
    HomologousRecombinationDeficient,
    HpvPositive,
    EbvPositive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparator {
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
}

impl Comparator {
    pub fn holds(self, value: f64, cutoff: f64) -> bool {
        match self {
            Comparator::Greater => value > cutoff,
            Comparator::GreaterOrEqual => value >= cutoff,
            Comparator::Less => value < cutoff,
            Comparator::LessOrEqual => value <= cutoff,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cutoff {
    pub comparator: Comparator,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacteristicPredicate {
    pub kind: CharacteristicType,
    /// When present the raw score is compared instead of the derived flag.
    #[serde(default)]
    pub cutoff: Option<Cutoff>,
}

impl CharacteristicPredicate {
    /// With a cutoff the raw score decides; otherwise the derived flag does.
    pub fn score_or_flag(&self, score: f64, flag: bool) -> bool {
        match self.cutoff {
            Some(cutoff) => cutoff.comparator.holds(score, cutoff.value),
            None => flag,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HlaPredicate {
    pub allele: String,
}

/// A single typed molecular condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LeafPredicate {
    Hotspot(HotspotPredicate),
    Range(RangePredicate),
    GeneEvent(GeneEventPredicate),
    Fusion(FusionPredicate),
    Characteristic(CharacteristicPredicate),
    Hla(HlaPredicate),
}

impl LeafPredicate {
    /// Gene the predicate is keyed on, if any.
    pub fn gene(&self) -> Option<&str> {
        match self {
            LeafPredicate::Hotspot(h) => Some(&h.gene),
            LeafPredicate::Range(r) => Some(&r.gene),
            LeafPredicate::GeneEvent(g) => Some(&g.gene),
            LeafPredicate::Fusion(f) => Some(&f.gene_up),
            LeafPredicate::Characteristic(_) | LeafPredicate::Hla(_) => None,
        }
    }

    pub fn as_hotspot(&self) -> Option<&HotspotPredicate> {
        match self {
            LeafPredicate::Hotspot(h) => Some(h),
            _ => None,
        }
    }

    fn validate(&self) -> Result<()> {
        match self {
            LeafPredicate::Range(r) => r.validate(),
            LeafPredicate::Fusion(f) => f.validate(),
            _ => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Criterion
// ---------------------------------------------------------------------------

/// Non-empty conjunction of leaf predicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCriterion")]
pub struct Criterion {
    source_event: String,
    predicates: Vec<LeafPredicate>,
}

#[derive(Deserialize)]
struct RawCriterion {
    source_event: String,
    predicates: Vec<LeafPredicate>,
}

impl TryFrom<RawCriterion> for Criterion {
    type Error = OncoactError;

    fn try_from(raw: RawCriterion) -> Result<Self> {
        Criterion::new(raw.source_event, raw.predicates)
    }
}

impl Criterion {
    pub fn new(source_event: impl Into<String>, predicates: Vec<LeafPredicate>) -> Result<Self> {
        let source_event = source_event.into();
        if predicates.is_empty() {
            return Err(OncoactError::InvalidRecord(format!(
                "criterion '{}' has no predicates",
                source_event
            )));
        }
        for predicate in &predicates {
            predicate.validate()?;
        }
        Ok(Self { source_event, predicates })
    }

    /// Convenience for the common single-predicate case.
    pub fn single(source_event: impl Into<String>, predicate: LeafPredicate) -> Result<Self> {
        Self::new(source_event, vec![predicate])
    }

    pub fn source_event(&self) -> &str {
        &self.source_event
    }

    pub fn predicates(&self) -> &[LeafPredicate] {
        &self.predicates
    }

    /// The lone hotspot of a single-predicate hotspot criterion.
    pub fn sole_hotspot(&self) -> Option<&HotspotPredicate> {
        match self.predicates.as_slice() {
            [only] => only.as_hotspot(),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Indications and treatments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CancerType {
    pub name: String,
    /// Tumor ontology code, e.g. a DOID.
    pub code: String,
}

impl CancerType {
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self { name: name.into(), code: code.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Indication {
    pub applicable: CancerType,
    #[serde(default)]
    pub excluded_subtypes: BTreeSet<CancerType>,
}

impl Indication {
    pub fn new(applicable: CancerType) -> Self {
        Self { applicable, excluded_subtypes: BTreeSet::new() }
    }

    pub fn excluding(mut self, subtype: CancerType) -> Self {
        self.excluded_subtypes.insert(subtype);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Treatment {
    pub name: String,
    #[serde(default)]
    pub drug_classes: BTreeSet<String>,
}

impl Treatment {
    pub fn has_drug_class(&self) -> bool {
        !self.drug_classes.is_empty()
    }
}

/// Approval / guideline level; `A` is the strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EvidenceLevel {
    A,
    B,
    C,
    D,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceDirection {
    Responsive,
    PredictedResponsive,
    Resistant,
    PredictedResistant,
    NoBenefit,
}

impl EvidenceDirection {
    pub fn is_responsive(self) -> bool {
        matches!(self, EvidenceDirection::Responsive | EvidenceDirection::PredictedResponsive)
    }

    pub fn is_resistant(self) -> bool {
        matches!(self, EvidenceDirection::Resistant | EvidenceDirection::PredictedResistant)
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EfficacyEvidence {
    pub source: String,
    pub criterion: Criterion,
    pub treatment: Treatment,
    pub indication: Indication,
    pub level: EvidenceLevel,
    pub direction: EvidenceDirection,
    #[serde(default)]
    pub description: Option<String>,
}

/// Clinical trial eligibility record. Any one criterion suffices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionableTrial {
    pub nct_id: String,
    pub title: String,
    #[serde(default)]
    pub acronym: Option<String>,
    #[serde(default)]
    pub therapy_names: Vec<String>,
    #[serde(default)]
    pub countries: BTreeSet<String>,
    pub indications: Vec<Indication>,
    pub criteria: Vec<Criterion>,
}

/// Curated known alteration with its functional annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownHotspot {
    pub gene: String,
    pub chromosome: String,
    pub position: u64,
    pub ref_allele: String,
    pub alt_allele: String,
    pub protein_effect: ProteinEffect,
    #[serde(default)]
    pub associated_with_drug_resistance: bool,
}

type LocusKey = (String, u64, String, String);

fn locus_key(chromosome: &str, position: u64, ref_allele: &str, alt_allele: &str) -> LocusKey {
    (chromosome.to_string(), position, ref_allele.to_string(), alt_allele.to_string())
}

// ---------------------------------------------------------------------------
// Knowledge base
// ---------------------------------------------------------------------------

/// Immutable collection of evidence, trials and known hotspots.
/// Build once and share as `Arc<KnowledgeBase>`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "RawKnowledgeBase")]
pub struct KnowledgeBase {
    evidences: Vec<EfficacyEvidence>,
    trials: Vec<ActionableTrial>,
    known_hotspots: Vec<KnownHotspot>,
    #[serde(skip)]
    hotspot_index: HashMap<LocusKey, usize>,
}

#[derive(Deserialize)]
struct RawKnowledgeBase {
    #[serde(default)]
    evidences: Vec<EfficacyEvidence>,
    #[serde(default)]
    trials: Vec<ActionableTrial>,
    #[serde(default)]
    known_hotspots: Vec<KnownHotspot>,
}

impl TryFrom<RawKnowledgeBase> for KnowledgeBase {
    type Error = OncoactError;

    fn try_from(raw: RawKnowledgeBase) -> Result<Self> {
        KnowledgeBase::new(raw.evidences, raw.trials, raw.known_hotspots)
    }
}

impl KnowledgeBase {
    pub fn new(
        evidences: Vec<EfficacyEvidence>,
        trials: Vec<ActionableTrial>,
        known_hotspots: Vec<KnownHotspot>,
    ) -> Result<Self> {
        for trial in &trials {
            if trial.criteria.is_empty() {
                return Err(OncoactError::InvalidRecord(format!("trial {} has no criteria", trial.nct_id)));
            }
            if trial.indications.is_empty() {
                return Err(OncoactError::InvalidRecord(format!("trial {} has no indications", trial.nct_id)));
            }
        }

        // First curation wins when the same locus is listed twice.
        let mut hotspot_index = HashMap::new();
        for (i, known) in known_hotspots.iter().enumerate() {
            hotspot_index
                .entry(locus_key(&known.chromosome, known.position, &known.ref_allele, &known.alt_allele))
                .or_insert(i);
        }

        tracing::debug!(
            evidences = evidences.len(),
            trials = trials.len(),
            known_hotspots = known_hotspots.len(),
            "Knowledge base built"
        );

        Ok(Self { evidences, trials, known_hotspots, hotspot_index })
    }

    pub fn evidences(&self) -> &[EfficacyEvidence] {
        &self.evidences
    }

    pub fn trials(&self) -> &[ActionableTrial] {
        &self.trials
    }

    pub fn known_hotspots(&self) -> &[KnownHotspot] {
        &self.known_hotspots
    }

    /// Curated annotation for the locus of a hotspot predicate.
    pub fn known_hotspot_for(&self, hotspot: &HotspotPredicate) -> Option<&KnownHotspot> {
        let key = locus_key(&hotspot.chromosome, hotspot.position, &hotspot.ref_allele, &hotspot.alt_allele);
        self.hotspot_index.get(&key).map(|&i| &self.known_hotspots[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_characteristic_cutoff_overrides_flag() {
        let flag_only = CharacteristicPredicate { kind: CharacteristicType::HighTumorMutationalLoad, cutoff: None };
        assert!(flag_only.score_or_flag(0.0, true));
        assert!(!flag_only.score_or_flag(500.0, false));

        let below = CharacteristicPredicate {
            kind: CharacteristicType::LowTumorMutationalLoad,
            cutoff: Some(Cutoff { comparator: Comparator::Less, value: 140.0 }),
        };
        assert!(below.score_or_flag(139.0, false));
        assert!(!below.score_or_flag(140.0, true));

        let at_most = CharacteristicPredicate {
            kind: CharacteristicType::LowTumorMutationalLoad,
            cutoff: Some(Cutoff { comparator: Comparator::LessOrEqual, value: 140.0 }),
        };
        assert!(at_most.score_or_flag(140.0, false));
        assert!(!at_most.score_or_flag(140.5, true));
    }

    fn braf_hotspot() -> HotspotPredicate {
        HotspotPredicate {
            gene: "BRAF".to_string(),
            chromosome: "7".to_string(),
            position: 140453136,
            ref_allele: "T".to_string(),
            alt_allele: "A".to_string(),
        }
    }

    #[test]
    fn test_empty_criterion_rejected() {
        let err = Criterion::new("nothing", vec![]).unwrap_err();
        assert!(matches!(err, OncoactError::InvalidRecord(_)));
    }

    #[test]
    fn test_inverted_range_rejected() {
        assert!(RangePredicate::new("EGFR", "7", 200, 100, RangeKind::Exon, MutationType::Any).is_err());
        assert!(RangePredicate::new("EGFR", "7", 100, 200, RangeKind::Exon, MutationType::Any).is_ok());
    }

    #[test]
    fn test_inverted_exon_bounds_rejected() {
        assert!(FusionPredicate::new("EML4", "ALK").with_exon_up(6, 2).is_err());
        let ok = FusionPredicate::new("EML4", "ALK").with_exon_up(2, 6).unwrap();
        assert_eq!(ok.max_exon_up, Some(6));
    }

    #[test]
    fn test_criterion_deserialisation_validates() {
        let empty = r#"{ "source_event": "x", "predicates": [] }"#;
        assert!(serde_json::from_str::<Criterion>(empty).is_err());

        let single = r#"{ "source_event": "BRAF amp", "predicates": [ { "type": "gene_event", "gene": "BRAF", "event": "amplification" } ] }"#;
        let criterion: Criterion = serde_json::from_str(single).unwrap();
        assert_eq!(criterion.predicates().len(), 1);
        assert!(criterion.sole_hotspot().is_none());
    }

    #[test]
    fn test_known_hotspot_lookup_by_locus() {
        let known = KnownHotspot {
            gene: "BRAF".to_string(),
            chromosome: "7".to_string(),
            position: 140453136,
            ref_allele: "T".to_string(),
            alt_allele: "A".to_string(),
            protein_effect: ProteinEffect::GainOfFunction,
            associated_with_drug_resistance: false,
        };
        let kb = KnowledgeBase::new(vec![], vec![], vec![known]).unwrap();
        assert!(kb.known_hotspot_for(&braf_hotspot()).is_some());

        let other = HotspotPredicate { alt_allele: "G".to_string(), ..braf_hotspot() };
        assert!(kb.known_hotspot_for(&other).is_none());
    }

    #[test]
    fn test_trial_without_criteria_rejected() {
        let trial = ActionableTrial {
            nct_id: "NCT00000001".to_string(),
            title: "Empty".to_string(),
            acronym: None,
            therapy_names: vec![],
            countries: BTreeSet::new(),
            indications: vec![Indication::new(CancerType::new("Cancer", "162"))],
            criteria: vec![],
        };
        assert!(KnowledgeBase::new(vec![], vec![trial], vec![]).is_err());
    }

    #[test]
    fn test_direction_classes() {
        assert!(EvidenceDirection::PredictedResistant.is_resistant());
        assert!(!EvidenceDirection::Responsive.is_resistant());
        assert!(EvidenceDirection::Responsive.is_responsive());
        assert!(!EvidenceDirection::NoBenefit.is_responsive());
    }
}
