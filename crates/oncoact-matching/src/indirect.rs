//! Indirect evidence for variants without an exact knowledge-base hit.
//!
//! A variant inherits evidence from a curated hotspot on the same gene when
//! both alter protein function in the same direction (gain or loss), the
//! hotspot is not a resistance mutation and the treatment has a drug class.
//! Results are additive; direct matches are never touched.

use std::collections::BTreeMap;

use ahash::{AHashMap, AHashSet};
use tracing::debug;

use oncoact_common::knowledge::{EfficacyEvidence, KnownHotspot};
use oncoact_common::profile::{DriverId, DriverRef, FunctionalClass, MolecularProfile, Variant};
use oncoact_common::KnowledgeBase;

use crate::actionability::ActionabilityMatches;

struct IndexedEvidence<'kb> {
    evidence: &'kb EfficacyEvidence,
    class: FunctionalClass,
}

pub struct IndirectEvidenceMatcher<'kb> {
    by_gene: AHashMap<&'kb str, Vec<IndexedEvidence<'kb>>>,
    /// (gene, chromosome, position) of every curated hotspot.
    known_loci: AHashSet<(&'kb str, &'kb str, u64)>,
}

impl<'kb> IndirectEvidenceMatcher<'kb> {
    pub fn new(knowledge_base: &'kb KnowledgeBase) -> Self {
        let mut by_gene: AHashMap<&str, Vec<IndexedEvidence>> = AHashMap::new();
        for evidence in knowledge_base.evidences() {
            if !evidence.treatment.has_drug_class() || evidence.direction.is_resistant() {
                continue;
            }
            let Some(hotspot) = evidence.criterion.sole_hotspot() else {
                continue;
            };
            let Some(class) = knowledge_base.known_hotspot_for(hotspot).and_then(usable_class) else {
                continue;
            };
            by_gene
                .entry(hotspot.gene.as_str())
                .or_default()
                .push(IndexedEvidence { evidence, class });
        }

        let known_loci = knowledge_base
            .known_hotspots()
            .iter()
            .map(|k| (k.gene.as_str(), k.chromosome.as_str(), k.position))
            .collect();

        debug!(
            genes = by_gene.len(),
            evidences = by_gene.values().map(Vec::len).sum::<usize>(),
            "Indirect evidence index built"
        );

        Self { by_gene, known_loci }
    }

    /// Indirect evidence per variant driver, in knowledge-base order.
    pub fn find(
        &self,
        profile: &MolecularProfile,
        direct: &ActionabilityMatches,
    ) -> BTreeMap<DriverId, Vec<EfficacyEvidence>> {
        let mut found = BTreeMap::new();
        for (id, driver) in profile.drivers() {
            let DriverRef::Variant(variant) = driver else {
                continue;
            };
            if !variant.is_reportable || self.is_known_locus(variant) || has_direct_hotspot_match(id, variant, direct) {
                continue;
            }
            let Some(class) = variant.protein_effect.functional_class() else {
                continue;
            };

            let evidences: Vec<EfficacyEvidence> = self
                .by_gene
                .get(variant.gene.as_str())
                .into_iter()
                .flatten()
                .filter(|indexed| indexed.class == class)
                .map(|indexed| indexed.evidence.clone())
                .collect();

            if !evidences.is_empty() {
                debug!(gene = %variant.gene, position = variant.position, count = evidences.len(), "Indirect evidence found");
                found.insert(id, evidences);
            }
        }
        found
    }

    fn is_known_locus(&self, variant: &Variant) -> bool {
        self.known_loci
            .contains(&(variant.gene.as_str(), variant.chromosome.as_str(), variant.position))
    }
}

fn usable_class(known: &KnownHotspot) -> Option<FunctionalClass> {
    if known.associated_with_drug_resistance {
        return None;
    }
    known.protein_effect.functional_class()
}

fn has_direct_hotspot_match(id: DriverId, variant: &Variant, direct: &ActionabilityMatches) -> bool {
    let Some(matched) = direct.get(id) else {
        return false;
    };
    matched
        .evidences
        .iter()
        .flat_map(|e| e.criterion.predicates())
        .filter_map(|p| p.as_hotspot())
        .any(|h| h.chromosome == variant.chromosome && h.position == variant.position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use oncoact_common::knowledge::EvidenceDirection;
    use oncoact_common::profile::ProteinEffect;
    use oncoact_common::MatchingConfig;
    use oncoact_test_utils::*;

    use crate::actionability::ActionabilityMatcher;

    // BRAF G469A, a different gain-of-function hotspot on the same gene.
    fn braf_g469a() -> Variant {
        Variant {
            chromosome: "7".to_string(),
            position: 140481402,
            ref_allele: "C".to_string(),
            alt_allele: "G".to_string(),
            ..braf_v600e()
        }
    }

    fn braf_v600e_evidence(treatment: &str) -> EfficacyEvidence {
        EvidenceBuilder::new(treatment)
            .predicate(braf_v600e_hotspot())
            .drug_class("BRAF inhibitor")
            .build()
    }

    fn braf_v600e_known(effect: ProteinEffect, resistant: bool) -> KnownHotspot {
        known_hotspot("BRAF", "7", 140453136, "T", "A", effect, resistant)
    }

    fn run(kb: &KnowledgeBase, variant: Variant) -> BTreeMap<DriverId, Vec<EfficacyEvidence>> {
        let profile = ProfileBuilder::new("S1").with_variant(variant).build();
        let direct = ActionabilityMatcher::new(Arc::new(kb.clone()), MatchingConfig::default()).match_profile(&profile);
        IndirectEvidenceMatcher::new(kb).find(&profile, &direct)
    }

    #[test]
    fn test_same_gene_same_class_is_inherited() {
        let kb = knowledge_base(
            vec![braf_v600e_evidence("Vemurafenib")],
            vec![],
            vec![braf_v600e_known(ProteinEffect::GainOfFunction, false)],
        );
        let found = run(&kb, braf_g469a());
        let treatments: Vec<&str> = found[&DriverId::Variant(0)].iter().map(|e| e.treatment.name.as_str()).collect();
        assert_eq!(treatments, vec!["Vemurafenib"]);
    }

    #[test]
    fn test_resistance_hotspot_never_contributes() {
        let kb = knowledge_base(
            vec![braf_v600e_evidence("Vemurafenib")],
            vec![],
            vec![braf_v600e_known(ProteinEffect::GainOfFunction, true)],
        );
        assert!(run(&kb, braf_g469a()).is_empty());
    }

    #[test]
    fn test_exact_position_variant_is_excluded() {
        let kb = knowledge_base(
            vec![braf_v600e_evidence("Vemurafenib")],
            vec![],
            vec![braf_v600e_known(ProteinEffect::GainOfFunction, false)],
        );
        assert!(run(&kb, braf_v600e()).is_empty());

        // Same position, different alt allele: still covered by the curated locus.
        let other_alt = Variant { alt_allele: "G".to_string(), ..braf_v600e() };
        assert!(run(&kb, other_alt).is_empty());
    }

    #[test]
    fn test_unknown_effect_hotspot_contributes_nothing() {
        let kb = knowledge_base(
            vec![braf_v600e_evidence("Vemurafenib")],
            vec![],
            vec![braf_v600e_known(ProteinEffect::Unknown, false)],
        );
        assert!(run(&kb, braf_g469a()).is_empty());
    }

    #[test]
    fn test_functional_class_must_agree() {
        let kb = knowledge_base(
            vec![braf_v600e_evidence("Vemurafenib")],
            vec![],
            vec![braf_v600e_known(ProteinEffect::GainOfFunction, false)],
        );
        let loss = Variant { protein_effect: ProteinEffect::LossOfFunction, ..braf_g469a() };
        assert!(run(&kb, loss).is_empty());
    }

    #[test]
    fn test_requires_drug_class_and_non_resistant_direction() {
        let no_class = EvidenceBuilder::new("Unclassified").predicate(braf_v600e_hotspot()).build();
        let resistant = EvidenceBuilder::new("Resisted")
            .predicate(braf_v600e_hotspot())
            .drug_class("BRAF inhibitor")
            .direction(EvidenceDirection::Resistant)
            .build();
        let kb = knowledge_base(
            vec![no_class, resistant],
            vec![],
            vec![braf_v600e_known(ProteinEffect::GainOfFunction, false)],
        );
        assert!(run(&kb, braf_g469a()).is_empty());
    }

    #[test]
    fn test_other_gene_not_inherited() {
        let kb = knowledge_base(
            vec![braf_v600e_evidence("Vemurafenib")],
            vec![],
            vec![braf_v600e_known(ProteinEffect::GainOfFunction, false)],
        );
        let kras = Variant { gene: "KRAS".to_string(), ..braf_g469a() };
        assert!(run(&kb, kras).is_empty());
    }

    #[test]
    fn test_non_reportable_variant_skipped() {
        let kb = knowledge_base(
            vec![braf_v600e_evidence("Vemurafenib")],
            vec![],
            vec![braf_v600e_known(ProteinEffect::GainOfFunction, false)],
        );
        let hidden = Variant { is_reportable: false, ..braf_g469a() };
        assert!(run(&kb, hidden).is_empty());
    }
}
