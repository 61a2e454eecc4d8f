//! End-to-end matching: knowledge base + profile + ontology through to the
//! clinical view and indirect evidence.
//!
//! Run with: cargo test --package oncoact-matching --test test_matching_e2e

use std::collections::BTreeSet;
use std::sync::Arc;

use oncoact_common::knowledge::{GeneEvent, Indication, MutationType};
use oncoact_common::profile::{CopyNumberType, DriverLikelihood, FusionDriverType, ProteinEffect, Variant};
use oncoact_common::{DriverId, KnowledgeBase, MatchingConfig, MolecularProfile};
use oncoact_matching::{
    ActionabilityMatcher, CancerTypeApplicability, CancerTypeResolver, ClinicalEvidenceAssembler,
    IndirectEvidenceMatcher, OntologyIndex,
};
use oncoact_test_utils::*;
use pretty_assertions::assert_eq;

fn matcher(kb: KnowledgeBase) -> ActionabilityMatcher {
    ActionabilityMatcher::new(Arc::new(kb), MatchingConfig::default())
}

fn ontology() -> Arc<OntologyIndex> {
    Arc::new(OntologyIndex::from_config(&MatchingConfig::default(), sample_ontology_edges()).unwrap())
}

fn single_evidence_kb(predicates: Vec<oncoact_common::LeafPredicate>) -> KnowledgeBase {
    let builder = predicates
        .into_iter()
        .fold(EvidenceBuilder::new("Drug"), |b, p| b.predicate(p));
    knowledge_base(vec![builder.build()], vec![], vec![])
}

#[test]
fn test_hotspot_example_matches_regardless_of_likelihood() {
    init_test_logging();
    let kb = single_evidence_kb(vec![braf_v600e_hotspot()]);
    for likelihood in [DriverLikelihood::Low, DriverLikelihood::Medium, DriverLikelihood::High] {
        let v = Variant { driver_likelihood: likelihood, ..braf_v600e() };
        let profile = ProfileBuilder::new("S1").with_variant(v).build();
        let matches = matcher(kb.clone()).match_profile(&profile);
        assert_eq!(matches.evidence_count(), 1, "likelihood {:?}", likelihood);
    }
}

#[test]
fn test_conjunction_needs_both_predicates() {
    init_test_logging();
    let kb = single_evidence_kb(vec![braf_v600e_hotspot(), fusion_pair("EML4", "ALK")]);

    let only_hotspot = ProfileBuilder::new("S1").with_variant(braf_v600e()).build();
    assert!(matcher(kb.clone()).match_profile(&only_hotspot).is_empty());

    let both = ProfileBuilder::new("S2")
        .with_variant(braf_v600e())
        .with_fusion(fusion("EML4", "ALK", FusionDriverType::KnownPair))
        .build();
    let matches = matcher(kb).match_profile(&both);
    let credited: Vec<DriverId> = matches.drivers().collect();
    assert_eq!(credited, vec![DriverId::Variant(0), DriverId::Fusion(0)]);
    assert_eq!(
        matches.get(DriverId::Variant(0)).unwrap().evidences,
        matches.get(DriverId::Fusion(0)).unwrap().evidences
    );
}

#[test]
fn test_non_reportable_drivers_never_match() {
    init_test_logging();
    let kb = knowledge_base(
        vec![
            EvidenceBuilder::new("A").predicate(braf_v600e_hotspot()).build(),
            EvidenceBuilder::new("B").predicate(fusion_pair("EML4", "ALK")).build(),
            EvidenceBuilder::new("C").predicate(gene_event("PTEN", GeneEvent::AnyMutation)).build(),
        ],
        vec![],
        vec![],
    );
    let mut hidden_fusion = fusion("EML4", "ALK", FusionDriverType::KnownPair);
    hidden_fusion.is_reportable = false;
    let mut hidden_disruption = disruption("PTEN", oncoact_common::profile::GeneRole::TumorSuppressor);
    hidden_disruption.is_reportable = false;

    let profile = ProfileBuilder::new("S1")
        .with_variant(Variant { is_reportable: false, ..braf_v600e() })
        .with_fusion(hidden_fusion)
        .with_disruption(hidden_disruption)
        .build();
    assert!(matcher(kb).match_profile(&profile).is_empty());
}

#[test]
fn test_range_respects_driver_likelihood_threshold() {
    init_test_logging();
    let kb = single_evidence_kb(vec![codon("BRAF", "7", 140453136, 140453138, MutationType::Any)]);

    let medium = Variant { driver_likelihood: DriverLikelihood::Medium, ..braf_v600e() };
    let profile = ProfileBuilder::new("S1").with_variant(medium).build();
    assert!(matcher(kb.clone()).match_profile(&profile).is_empty());

    let profile = ProfileBuilder::new("S2").with_variant(braf_v600e()).build();
    assert_eq!(matcher(kb).match_profile(&profile).evidence_count(), 1);
}

#[test]
fn test_absence_of_protein_limited_to_mismatch_repair_genes() {
    init_test_logging();
    let mmr = single_evidence_kb(vec![gene_event("MLH1", GeneEvent::AbsenceOfProtein)]);
    let profile = ProfileBuilder::new("S1")
        .with_copy_number(copy_number("MLH1", CopyNumberType::FullLoss))
        .build();
    assert_eq!(matcher(mmr).match_profile(&profile).evidence_count(), 1);

    let non_mmr = single_evidence_kb(vec![gene_event("BRCA1", GeneEvent::AbsenceOfProtein)]);
    let profile = ProfileBuilder::new("S2")
        .with_copy_number(copy_number("BRCA1", CopyNumberType::FullLoss))
        .with_homozygous_disruption(homozygous_disruption("BRCA1"))
        .build();
    assert!(matcher(non_mmr).match_profile(&profile).is_empty());
}

#[test]
fn test_full_pipeline_clinical_view() {
    init_test_logging();
    let kb = knowledge_base(
        vec![
            EvidenceBuilder::new("Vemurafenib")
                .predicate(braf_v600e_hotspot())
                .indication(Indication::new(cancer("Melanoma", "1909")))
                .build(),
            EvidenceBuilder::new("Pembrolizumab")
                .predicate(characteristic(oncoact_common::knowledge::CharacteristicType::MicrosatelliteUnstable))
                .build(),
            EvidenceBuilder::new("Trastuzumab")
                .predicate(gene_event("ERBB2", GeneEvent::Amplification))
                .indication(Indication::new(cancer("Breast cancer", "1612")))
                .build(),
        ],
        vec![TrialBuilder::new("NCT00000001")
            .criterion(vec![braf_v600e_hotspot()])
            .indication(Indication::new(cancer("Lung cancer", "1324")))
            .build()],
        vec![],
    );
    let profile = ProfileBuilder::new("S1")
        .with_variant(braf_v600e())
        .with_copy_number(copy_number("ERBB2", CopyNumberType::FullGain))
        .with_msi(4.5, true)
        .build();

    let matches = matcher(kb).match_profile(&profile);
    let resolver = CancerTypeResolver::new(ontology(), patient_codes(&["1909"]));
    let view = ClinicalEvidenceAssembler::assemble(&matches, &resolver);

    let braf = view.get(DriverId::Variant(0)).unwrap();
    assert_eq!(braf.on_label.len(), 1);
    assert_eq!(braf.on_label[0].applicability, CancerTypeApplicability::SpecificType);

    let erbb2 = view.get(DriverId::CopyNumber(0)).unwrap();
    assert!(erbb2.on_label.is_empty());
    assert_eq!(erbb2.off_label[0].treatment, "Trastuzumab");

    let msi = view
        .get(DriverId::Characteristic(oncoact_common::profile::CharacteristicKind::Microsatellite))
        .unwrap();
    assert_eq!(msi.on_label[0].applicability, CancerTypeApplicability::AllTypes);

    assert!(view.on_label_trials.is_empty());
    assert_eq!(view.off_label_trials.len(), 1);
    assert_eq!(view.off_label_trials[0].drivers, BTreeSet::from([DriverId::Variant(0)]));
}

#[test]
fn test_ontology_resolution_properties() {
    init_test_logging();
    let ontology = Arc::new(OntologyIndex::from_edges("root", vec![("root", "parent"), ("parent", "child")]).unwrap());

    let resolver = CancerTypeResolver::new(ontology.clone(), patient_codes(&["child"]));
    assert_eq!(
        resolver.resolve(&Indication::new(cancer("Parent", "parent"))),
        CancerTypeApplicability::SpecificType
    );
    assert_eq!(resolver.resolve(&Indication::new(cancer("Root", "root"))), CancerTypeApplicability::AllTypes);

    let unrelated = CancerTypeResolver::new(ontology, patient_codes(&["elsewhere"]));
    assert_eq!(
        unrelated.resolve(&Indication::new(cancer("Parent", "parent"))),
        CancerTypeApplicability::OtherType
    );
}

#[test]
fn test_indirect_evidence_is_additive() {
    init_test_logging();
    let kb = knowledge_base(
        vec![EvidenceBuilder::new("Vemurafenib")
            .predicate(braf_v600e_hotspot())
            .drug_class("BRAF inhibitor")
            .build()],
        vec![],
        vec![
            known_hotspot("BRAF", "7", 140453136, "T", "A", ProteinEffect::GainOfFunction, false),
            known_hotspot("KRAS", "12", 25398284, "C", "A", ProteinEffect::GainOfFunction, true),
        ],
    );
    let g469a = Variant { position: 140481402, ref_allele: "C".to_string(), alt_allele: "G".to_string(), ..braf_v600e() };
    let profile = ProfileBuilder::new("S1").with_variant(braf_v600e()).with_variant(g469a).build();

    let direct = matcher(kb.clone()).match_profile(&profile);
    let before = direct.clone();
    let indirect = IndirectEvidenceMatcher::new(&kb).find(&profile, &direct);

    assert_eq!(direct, before);
    assert_eq!(direct.drivers().collect::<Vec<_>>(), vec![DriverId::Variant(0)]);
    assert_eq!(indirect.keys().copied().collect::<Vec<_>>(), vec![DriverId::Variant(1)]);
}

#[test]
fn test_knowledge_base_from_json() {
    init_test_logging();
    let json = r#"{
        "evidences": [{
            "source": "CKB",
            "criterion": {
                "source_event": "BRAF V600E",
                "predicates": [{
                    "type": "hotspot",
                    "gene": "BRAF",
                    "chromosome": "7",
                    "position": 140453136,
                    "ref_allele": "T",
                    "alt_allele": "A"
                }]
            },
            "treatment": { "name": "Vemurafenib", "drug_classes": ["BRAF inhibitor"] },
            "indication": { "applicable": { "name": "Melanoma", "code": "1909" } },
            "level": "A",
            "direction": "responsive"
        }]
    }"#;
    let kb: KnowledgeBase = serde_json::from_str(json).unwrap();
    let profile = ProfileBuilder::new("S1").with_variant(braf_v600e()).build();
    let matches = matcher(kb).match_profile(&profile);
    assert_eq!(matches.evidence_count(), 1);

    let empty_criterion = r#"{"source_event": "none", "predicates": []}"#;
    assert!(serde_json::from_str::<oncoact_common::Criterion>(empty_criterion).is_err());
}

#[test]
fn test_cohort_shares_one_knowledge_base() {
    init_test_logging();
    let kb = single_evidence_kb(vec![braf_v600e_hotspot()]);
    let profiles: Vec<MolecularProfile> = (0..16)
        .map(|i| {
            let builder = ProfileBuilder::new(&format!("S{}", i));
            if i % 2 == 0 { builder.with_variant(braf_v600e()).build() } else { builder.build() }
        })
        .collect();

    let m = matcher(kb);
    let results = m.match_cohort(&profiles);
    for (i, (profile, result)) in profiles.iter().zip(&results).enumerate() {
        assert_eq!(result, &m.match_profile(profile));
        assert_eq!(result.is_empty(), i % 2 == 1);
    }
}
