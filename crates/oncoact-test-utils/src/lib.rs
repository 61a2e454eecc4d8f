//! oncoact-test-utils — Fixtures and builders shared by Oncoact tests.
//!
//! Factories return fully-populated, reportable, high-likelihood drivers so
//! tests only spell out the fields they care about:
//!
//! ```ignore
//! let profile = ProfileBuilder::new("S1")
//!     .with_variant(variant("BRAF", "7", 140453136, "T", "A"))
//!     .build();
//! ```

use std::collections::BTreeSet;

use oncoact_common::knowledge::{
    ActionableTrial, CancerType, CharacteristicPredicate, CharacteristicType, Criterion,
    EfficacyEvidence, EvidenceDirection, EvidenceLevel, FusionPredicate, GeneEvent,
    GeneEventPredicate, HotspotPredicate, Indication, KnowledgeBase, KnownHotspot, LeafPredicate,
    MutationType, RangeKind, RangePredicate, Treatment,
};
use oncoact_common::profile::{
    CodingEffect, CopyNumber, CopyNumberType, Disruption, DriverLikelihood, Fusion,
    FusionDriverType, GeneRole, HomologousRecombination, HomozygousDisruption,
    MicrosatelliteStatus, MolecularProfile, MutationalBurden, MutationalLoad, ProteinEffect,
    Variant, VariantType, Virus, VirusType,
};

pub use pretty_assertions;

/// Install a test subscriber once; honours `RUST_LOG`.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("oncoact=debug,warn")),
        )
        .with_test_writer()
        .try_init();
}

// ── Drivers ──────────────────────────────────────────────────────────────────

pub fn variant(gene: &str, chromosome: &str, position: u64, ref_allele: &str, alt_allele: &str) -> Variant {
    Variant {
        gene: gene.to_string(),
        chromosome: chromosome.to_string(),
        position,
        ref_allele: ref_allele.to_string(),
        alt_allele: alt_allele.to_string(),
        variant_type: VariantType::Snv,
        coding_effect: CodingEffect::Missense,
        driver_likelihood: DriverLikelihood::High,
        gene_role: GeneRole::Unknown,
        protein_effect: ProteinEffect::Unknown,
        is_reportable: true,
    }
}

/// BRAF V600E at chr7:140453136 T>A.
pub fn braf_v600e() -> Variant {
    Variant {
        gene_role: GeneRole::Oncogene,
        protein_effect: ProteinEffect::GainOfFunction,
        ..variant("BRAF", "7", 140453136, "T", "A")
    }
}

pub fn copy_number(gene: &str, copy_number_type: CopyNumberType) -> CopyNumber {
    CopyNumber {
        gene: gene.to_string(),
        copy_number_type,
        gene_role: GeneRole::Unknown,
        is_reportable: true,
    }
}

pub fn fusion(gene_up: &str, gene_down: &str, driver_type: FusionDriverType) -> Fusion {
    Fusion {
        gene_up: gene_up.to_string(),
        gene_down: gene_down.to_string(),
        driver_type,
        fused_exon_up: 1,
        fused_exon_down: 1,
        driver_likelihood: DriverLikelihood::High,
        is_reportable: true,
    }
}

pub fn disruption(gene: &str, gene_role: GeneRole) -> Disruption {
    Disruption { gene: gene.to_string(), gene_role, is_reportable: true }
}

pub fn homozygous_disruption(gene: &str) -> HomozygousDisruption {
    HomozygousDisruption { gene: gene.to_string(), gene_role: GeneRole::TumorSuppressor, is_reportable: true }
}

pub fn virus(virus_type: VirusType) -> Virus {
    Virus { name: format!("{:?}", virus_type), virus_type, is_reportable: true }
}

/// Builder for [`MolecularProfile`].
#[derive(Debug, Default)]
pub struct ProfileBuilder {
    profile: MolecularProfile,
}

impl ProfileBuilder {
    pub fn new(sample_id: &str) -> Self {
        Self { profile: MolecularProfile { sample_id: sample_id.to_string(), ..Default::default() } }
    }

    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.profile.variants.push(variant);
        self
    }

    pub fn with_copy_number(mut self, copy_number: CopyNumber) -> Self {
        self.profile.copy_numbers.push(copy_number);
        self
    }

    pub fn with_fusion(mut self, fusion: Fusion) -> Self {
        self.profile.fusions.push(fusion);
        self
    }

    pub fn with_disruption(mut self, disruption: Disruption) -> Self {
        self.profile.disruptions.push(disruption);
        self
    }

    pub fn with_homozygous_disruption(mut self, disruption: HomozygousDisruption) -> Self {
        self.profile.homozygous_disruptions.push(disruption);
        self
    }

    pub fn with_virus(mut self, virus: Virus) -> Self {
        self.profile.viruses.push(virus);
        self
    }

    pub fn with_msi(mut self, indel_rate: f64, is_unstable: bool) -> Self {
        self.profile.characteristics.microsatellite = Some(MicrosatelliteStatus { indel_rate, is_unstable });
        self
    }

    pub fn with_tmb(mut self, score: f64, is_high: bool) -> Self {
        self.profile.characteristics.mutational_burden = Some(MutationalBurden { score, is_high });
        self
    }

    pub fn with_tml(mut self, count: u32, is_high: bool) -> Self {
        self.profile.characteristics.mutational_load = Some(MutationalLoad { count, is_high });
        self
    }

    pub fn with_hrd(mut self, score: f64, is_deficient: bool) -> Self {
        self.profile.characteristics.homologous_recombination = Some(HomologousRecombination { score, is_deficient });
        self
    }

    pub fn build(self) -> MolecularProfile {
        self.profile
    }
}

// ── Predicates ───────────────────────────────────────────────────────────────

pub fn hotspot(gene: &str, chromosome: &str, position: u64, ref_allele: &str, alt_allele: &str) -> LeafPredicate {
    LeafPredicate::Hotspot(HotspotPredicate {
        gene: gene.to_string(),
        chromosome: chromosome.to_string(),
        position,
        ref_allele: ref_allele.to_string(),
        alt_allele: alt_allele.to_string(),
    })
}

pub fn braf_v600e_hotspot() -> LeafPredicate {
    hotspot("BRAF", "7", 140453136, "T", "A")
}

pub fn codon(gene: &str, chromosome: &str, start: u64, end: u64, mutation_type: MutationType) -> LeafPredicate {
    let range = RangePredicate::new(gene, chromosome, start, end, RangeKind::Codon, mutation_type)
        .expect("valid codon range");
    LeafPredicate::Range(range)
}

pub fn gene_event(gene: &str, event: GeneEvent) -> LeafPredicate {
    LeafPredicate::GeneEvent(GeneEventPredicate { gene: gene.to_string(), event })
}

pub fn fusion_pair(gene_up: &str, gene_down: &str) -> LeafPredicate {
    LeafPredicate::Fusion(FusionPredicate::new(gene_up, gene_down))
}

pub fn characteristic(kind: CharacteristicType) -> LeafPredicate {
    LeafPredicate::Characteristic(CharacteristicPredicate { kind, cutoff: None })
}

pub fn criterion(predicates: Vec<LeafPredicate>) -> Criterion {
    let label = format!("{} predicate(s)", predicates.len());
    Criterion::new(label, predicates).expect("non-empty criterion")
}

// ── Records ──────────────────────────────────────────────────────────────────

pub fn cancer(name: &str, code: &str) -> CancerType {
    CancerType::new(name, code)
}

/// Indication covering every cancer type.
pub fn all_cancers() -> Indication {
    Indication::new(cancer("Cancer", "162"))
}

/// Builder for [`EfficacyEvidence`]; defaults to level A, responsive, all cancers.
#[derive(Debug)]
pub struct EvidenceBuilder {
    treatment: Treatment,
    predicates: Vec<LeafPredicate>,
    indication: Indication,
    level: EvidenceLevel,
    direction: EvidenceDirection,
}

impl EvidenceBuilder {
    pub fn new(treatment: &str) -> Self {
        Self {
            treatment: Treatment { name: treatment.to_string(), drug_classes: BTreeSet::new() },
            predicates: vec![],
            indication: all_cancers(),
            level: EvidenceLevel::A,
            direction: EvidenceDirection::Responsive,
        }
    }

    pub fn predicate(mut self, predicate: LeafPredicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn drug_class(mut self, class: &str) -> Self {
        self.treatment.drug_classes.insert(class.to_string());
        self
    }

    pub fn indication(mut self, indication: Indication) -> Self {
        self.indication = indication;
        self
    }

    pub fn level(mut self, level: EvidenceLevel) -> Self {
        self.level = level;
        self
    }

    pub fn direction(mut self, direction: EvidenceDirection) -> Self {
        self.direction = direction;
        self
    }

    pub fn build(self) -> EfficacyEvidence {
        EfficacyEvidence {
            source: "TEST".to_string(),
            criterion: criterion(self.predicates),
            treatment: self.treatment,
            indication: self.indication,
            level: self.level,
            direction: self.direction,
            description: None,
        }
    }
}

/// Builder for [`ActionableTrial`]; defaults to an all-cancers indication.
#[derive(Debug)]
pub struct TrialBuilder {
    trial: ActionableTrial,
}

impl TrialBuilder {
    pub fn new(nct_id: &str) -> Self {
        Self {
            trial: ActionableTrial {
                nct_id: nct_id.to_string(),
                title: format!("Trial {}", nct_id),
                acronym: None,
                therapy_names: vec![],
                countries: BTreeSet::new(),
                indications: vec![],
                criteria: vec![],
            },
        }
    }

    pub fn criterion(mut self, predicates: Vec<LeafPredicate>) -> Self {
        self.trial.criteria.push(criterion(predicates));
        self
    }

    pub fn indication(mut self, indication: Indication) -> Self {
        self.trial.indications.push(indication);
        self
    }

    pub fn build(mut self) -> ActionableTrial {
        if self.trial.indications.is_empty() {
            self.trial.indications.push(all_cancers());
        }
        self.trial
    }
}

pub fn known_hotspot(
    gene: &str,
    chromosome: &str,
    position: u64,
    ref_allele: &str,
    alt_allele: &str,
    protein_effect: ProteinEffect,
    associated_with_drug_resistance: bool,
) -> KnownHotspot {
    KnownHotspot {
        gene: gene.to_string(),
        chromosome: chromosome.to_string(),
        position,
        ref_allele: ref_allele.to_string(),
        alt_allele: alt_allele.to_string(),
        protein_effect,
        associated_with_drug_resistance,
    }
}

pub fn knowledge_base(
    evidences: Vec<EfficacyEvidence>,
    trials: Vec<ActionableTrial>,
    known_hotspots: Vec<KnownHotspot>,
) -> KnowledgeBase {
    KnowledgeBase::new(evidences, trials, known_hotspots).expect("valid knowledge base")
}

// ── Ontology ─────────────────────────────────────────────────────────────────

/// Small Disease Ontology excerpt as parent → child edges, rooted at "162".
///
/// ```text
/// 162 cancer
/// ├── 1324 lung cancer
/// │   └── 3910 lung adenocarcinoma
/// ├── 1612 breast cancer
/// ├── 9256 colorectal cancer
/// │   └── 0050861 colorectal adenocarcinoma
/// └── 1909 melanoma
/// ```
pub fn sample_ontology_edges() -> Vec<(String, String)> {
    [
        ("162", "1324"),
        ("1324", "3910"),
        ("162", "1612"),
        ("162", "9256"),
        ("9256", "0050861"),
        ("162", "1909"),
    ]
    .into_iter()
    .map(|(parent, child)| (parent.to_string(), child.to_string()))
    .collect()
}

pub fn patient_codes(codes: &[&str]) -> BTreeSet<String> {
    codes.iter().map(|c| c.to_string()).collect()
}
