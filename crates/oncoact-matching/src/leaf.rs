//! Leaf predicate matchers.
//!
//! Each matcher answers one question: does this single driver instance
//! satisfy this single predicate? Matchers are pure and never fail; a driver
//! of the wrong category, a missing value or a non-reportable driver is simply
//! "not satisfied".

use oncoact_common::knowledge::{
    CharacteristicPredicate, CharacteristicType, FusionPredicate, GeneEvent, GeneEventPredicate,
    HlaPredicate, HotspotPredicate, LeafPredicate, MutationType, RangePredicate,
};
use oncoact_common::profile::{
    CodingEffect, DriverLikelihood, DriverRef, Fusion, FusionDriverType, Variant, VariantType,
    VirusType,
};
use oncoact_common::MatchingConfig;

/// Mismatch-repair genes. Absence-of-protein predicates only ever match these.
pub const MISMATCH_REPAIR_GENES: [&str; 5] = ["MLH1", "MSH2", "MSH6", "PMS2", "EPCAM"];

pub fn is_mismatch_repair_gene(gene: &str) -> bool {
    MISMATCH_REPAIR_GENES.contains(&gene)
}

/// Capability of a predicate to be satisfied by one driver instance.
pub trait SatisfiedBy {
    fn satisfied_by(&self, driver: DriverRef<'_>, config: &MatchingConfig) -> bool;
}

impl SatisfiedBy for LeafPredicate {
    fn satisfied_by(&self, driver: DriverRef<'_>, config: &MatchingConfig) -> bool {
        if !driver.is_reportable() {
            return false;
        }
        match self {
            LeafPredicate::Hotspot(p) => p.satisfied_by(driver, config),
            LeafPredicate::Range(p) => p.satisfied_by(driver, config),
            LeafPredicate::GeneEvent(p) => p.satisfied_by(driver, config),
            LeafPredicate::Fusion(p) => p.satisfied_by(driver, config),
            LeafPredicate::Characteristic(p) => p.satisfied_by(driver, config),
            LeafPredicate::Hla(p) => p.satisfied_by(driver, config),
        }
    }
}

// ── Variants ─────────────────────────────────────────────────────────────────

impl SatisfiedBy for HotspotPredicate {
    fn satisfied_by(&self, driver: DriverRef<'_>, config: &MatchingConfig) -> bool {
        let DriverRef::Variant(v) = driver else { return false };
        let likely_enough = !config.hotspot_requires_high_driver_likelihood
            || v.driver_likelihood == DriverLikelihood::High;

        v.is_reportable
            && likely_enough
            && v.gene == self.gene
            && v.chromosome == self.chromosome
            && v.position == self.position
            && v.ref_allele == self.ref_allele
            && v.alt_allele == self.alt_allele
    }
}

impl SatisfiedBy for RangePredicate {
    fn satisfied_by(&self, driver: DriverRef<'_>, config: &MatchingConfig) -> bool {
        let DriverRef::Variant(v) = driver else { return false };

        v.is_reportable
            && v.driver_likelihood >= config.range_min_driver_likelihood
            && v.gene == self.gene
            && v.chromosome == self.chromosome
            && (self.start..=self.end).contains(&v.position)
            && mutation_type_applies(self.applicable_mutation_type, v)
    }
}

/// Whether a variant's coding effect and type fit a range's mutation-type filter.
pub fn mutation_type_applies(mutation_type: MutationType, variant: &Variant) -> bool {
    let effect = variant.coding_effect;
    let is_missense = effect == CodingEffect::Missense;
    match mutation_type {
        MutationType::Any => effect.is_coding_impactful(),
        MutationType::Missense => is_missense && !variant.variant_type.is_indel(),
        MutationType::NonsenseOrFrameshift => effect == CodingEffect::NonsenseOrFrameshift,
        MutationType::Splice => effect == CodingEffect::Splice,
        MutationType::Inframe => is_missense && variant.variant_type.is_indel(),
        MutationType::InframeDeletion => is_missense && variant.variant_type == VariantType::Delete,
        MutationType::InframeInsertion => is_missense && variant.variant_type == VariantType::Insert,
    }
}

// ── Gene events ──────────────────────────────────────────────────────────────

fn is_qualifying_variant(v: &Variant, config: &MatchingConfig) -> bool {
    v.is_reportable
        && v.coding_effect.is_coding_impactful()
        && v.driver_likelihood >= config.gene_event_min_driver_likelihood
}

fn is_promiscuous_match(gene: &str, fusion: &Fusion) -> bool {
    match fusion.driver_type {
        FusionDriverType::Promiscuous5 => fusion.gene_up == gene,
        FusionDriverType::Promiscuous3 => fusion.gene_down == gene,
        FusionDriverType::PromiscuousBoth | FusionDriverType::KnownPair => {
            fusion.gene_up == gene || fusion.gene_down == gene
        }
        FusionDriverType::None => false,
    }
}

impl SatisfiedBy for GeneEventPredicate {
    fn satisfied_by(&self, driver: DriverRef<'_>, config: &MatchingConfig) -> bool {
        let gene = self.gene.as_str();
        if self.event == GeneEvent::AbsenceOfProtein && !is_mismatch_repair_gene(gene) {
            return false;
        }

        match (self.event, driver) {
            (GeneEvent::AnyMutation | GeneEvent::Activation | GeneEvent::AbsenceOfProtein, DriverRef::Variant(v)) => {
                v.gene == gene && is_qualifying_variant(v, config)
            }
            (GeneEvent::AnyMutation, DriverRef::Disruption(d)) => {
                d.is_reportable && d.gene == gene && !d.gene_role.is_oncogenic_only()
            }
            (
                GeneEvent::AnyMutation | GeneEvent::Deletion | GeneEvent::Inactivation | GeneEvent::AbsenceOfProtein,
                DriverRef::HomozygousDisruption(h),
            ) => h.is_reportable && h.gene == gene,
            (GeneEvent::Amplification, DriverRef::CopyNumber(c)) => {
                c.is_reportable && c.gene == gene && c.is_gain()
            }
            (GeneEvent::Deletion | GeneEvent::AbsenceOfProtein, DriverRef::CopyNumber(c)) => {
                c.is_reportable && c.gene == gene && c.is_loss()
            }
            (GeneEvent::Inactivation, DriverRef::CopyNumber(c)) => {
                c.is_reportable && c.gene == gene && c.is_loss() && !c.gene_role.is_oncogenic_only()
            }
            (GeneEvent::Fusion, DriverRef::Fusion(f)) => f.is_reportable && is_promiscuous_match(gene, f),
            _ => false,
        }
    }
}

// ── Fusions ──────────────────────────────────────────────────────────────────

fn exon_within(exon: u32, min: Option<u32>, max: Option<u32>) -> bool {
    min.map_or(true, |lo| exon >= lo) && max.map_or(true, |hi| exon <= hi)
}

impl SatisfiedBy for FusionPredicate {
    fn satisfied_by(&self, driver: DriverRef<'_>, _config: &MatchingConfig) -> bool {
        let DriverRef::Fusion(f) = driver else { return false };

        f.is_reportable
            && f.gene_up == self.gene_up
            && f.gene_down == self.gene_down
            && exon_within(f.fused_exon_up, self.min_exon_up, self.max_exon_up)
            && exon_within(f.fused_exon_down, self.min_exon_down, self.max_exon_down)
    }
}

// ── Characteristics ──────────────────────────────────────────────────────────

impl SatisfiedBy for CharacteristicPredicate {
    fn satisfied_by(&self, driver: DriverRef<'_>, _config: &MatchingConfig) -> bool {
        use CharacteristicType as T;

        match (self.kind, driver) {
            (T::MicrosatelliteUnstable, DriverRef::Microsatellite(m)) => self.score_or_flag(m.indel_rate, m.is_unstable),
            (T::MicrosatelliteStable, DriverRef::Microsatellite(m)) => self.score_or_flag(m.indel_rate, !m.is_unstable),
            (T::HighTumorMutationalBurden, DriverRef::MutationalBurden(b)) => self.score_or_flag(b.score, b.is_high),
            (T::LowTumorMutationalBurden, DriverRef::MutationalBurden(b)) => self.score_or_flag(b.score, !b.is_high),
            (T::HighTumorMutationalLoad, DriverRef::MutationalLoad(l)) => self.score_or_flag(f64::from(l.count), l.is_high),
            (T::LowTumorMutationalLoad, DriverRef::MutationalLoad(l)) => self.score_or_flag(f64::from(l.count), !l.is_high),
            (T::HomologousRecombinationDeficient, DriverRef::HomologousRecombination(h)) => {
                self.score_or_flag(h.score, h.is_deficient)
            }
            (T::HpvPositive, DriverRef::Virus(v)) => v.is_reportable && v.virus_type == VirusType::HumanPapillomavirus,
            (T::EbvPositive, DriverRef::Virus(v)) => v.is_reportable && v.virus_type == VirusType::EpsteinBarrVirus,
            _ => false,
        }
    }
}

// ── HLA ──────────────────────────────────────────────────────────────────────

impl SatisfiedBy for HlaPredicate {
    /// The molecular profile carries no HLA alleles, so nothing can satisfy this.
    fn satisfied_by(&self, _driver: DriverRef<'_>, _config: &MatchingConfig) -> bool {
        false
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
