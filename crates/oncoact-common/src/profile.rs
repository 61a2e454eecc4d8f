//! Patient molecular profile types.
//! One profile is produced per molecular test and is read-only input to the matching engine.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Shared annotations
// ---------------------------------------------------------------------------

/// Driver likelihood tier. Ordered so that thresholds can be expressed as `>=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverLikelihood {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodingEffect {
    NonsenseOrFrameshift,
    Splice,
    Missense,
    Synonymous,
    None,
}

impl CodingEffect {
    /// Whether the effect changes the protein product.
    pub fn is_coding_impactful(self) -> bool {
        matches!(
            self,
            CodingEffect::NonsenseOrFrameshift | CodingEffect::Splice | CodingEffect::Missense
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantType {
    Snv,
    Mnv,
    Insert,
    Delete,
}

impl VariantType {
    pub fn is_indel(self) -> bool {
        matches!(self, VariantType::Insert | VariantType::Delete)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneRole {
    Oncogene,
    TumorSuppressor,
    Both,
    Unknown,
}

impl GeneRole {
    /// True only for genes acting purely as oncogenes.
    pub fn is_oncogenic_only(self) -> bool {
        self == GeneRole::Oncogene
    }
}

/// Curated functional consequence of an alteration on its protein.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProteinEffect {
    GainOfFunction,
    GainOfFunctionPredicted,
    LossOfFunction,
    LossOfFunctionPredicted,
    NoEffect,
    NoEffectPredicted,
    Ambiguous,
    Unknown,
}

/// Coarse functional class shared by confirmed and predicted protein effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionalClass {
    Gain,
    Loss,
}

impl ProteinEffect {
    pub fn functional_class(self) -> Option<FunctionalClass> {
        match self {
            ProteinEffect::GainOfFunction | ProteinEffect::GainOfFunctionPredicted => {
                Some(FunctionalClass::Gain)
            }
            ProteinEffect::LossOfFunction | ProteinEffect::LossOfFunctionPredicted => {
                Some(FunctionalClass::Loss)
            }
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Driver instances
// ---------------------------------------------------------------------------

/// A small variant (SNV, MNV or indel).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub gene: String,
    pub chromosome: String,
    pub position: u64,
    pub ref_allele: String,
    pub alt_allele: String,
    pub variant_type: VariantType,
    pub coding_effect: CodingEffect,
    pub driver_likelihood: DriverLikelihood,
    pub gene_role: GeneRole,
    pub protein_effect: ProteinEffect,
    pub is_reportable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CopyNumberType {
    FullGain,
    PartialGain,
    FullLoss,
    PartialLoss,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CopyNumber {
    pub gene: String,
    pub copy_number_type: CopyNumberType,
    pub gene_role: GeneRole,
    pub is_reportable: bool,
}

impl CopyNumber {
    pub fn is_gain(&self) -> bool {
        matches!(self.copy_number_type, CopyNumberType::FullGain | CopyNumberType::PartialGain)
    }

    pub fn is_loss(&self) -> bool {
        matches!(self.copy_number_type, CopyNumberType::FullLoss | CopyNumberType::PartialLoss)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FusionDriverType {
    /// Promiscuous on the 5' (upstream) partner.
    Promiscuous5,
    /// Promiscuous on the 3' (downstream) partner.
    Promiscuous3,
    PromiscuousBoth,
    KnownPair,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fusion {
    pub gene_up: String,
    pub gene_down: String,
    pub driver_type: FusionDriverType,
    pub fused_exon_up: u32,
    pub fused_exon_down: u32,
    pub driver_likelihood: DriverLikelihood,
    pub is_reportable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Disruption {
    pub gene: String,
    pub gene_role: GeneRole,
    pub is_reportable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomozygousDisruption {
    pub gene: String,
    pub gene_role: GeneRole,
    pub is_reportable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VirusType {
    HumanPapillomavirus,
    EpsteinBarrVirus,
    MerkelCellVirus,
    HepatitisB,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Virus {
    pub name: String,
    pub virus_type: VirusType,
    pub is_reportable: bool,
}

// ---------------------------------------------------------------------------
// Tumor-wide characteristics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MicrosatelliteStatus {
    pub indel_rate: f64,
    pub is_unstable: bool,
}

/// Tumor mutational burden (mutations per megabase).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationalBurden {
    pub score: f64,
    pub is_high: bool,
}

/// Tumor mutational load (missense mutation count).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationalLoad {
    pub count: u32,
    pub is_high: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomologousRecombination {
    pub score: f64,
    pub is_deficient: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TumorCharacteristics {
    #[serde(default)]
    pub microsatellite: Option<MicrosatelliteStatus>,
    #[serde(default)]
    pub mutational_burden: Option<MutationalBurden>,
    #[serde(default)]
    pub mutational_load: Option<MutationalLoad>,
    #[serde(default)]
    pub homologous_recombination: Option<HomologousRecombination>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharacteristicKind {
    Microsatellite,
    MutationalBurden,
    MutationalLoad,
    HomologousRecombination,
}

// ---------------------------------------------------------------------------
// Driver identity
// ---------------------------------------------------------------------------

/// Handle to one driver instance within a [`MolecularProfile`].
/// The derived ordering follows the profile's enumeration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverId {
    Variant(usize),
    CopyNumber(usize),
    Fusion(usize),
    Disruption(usize),
    HomozygousDisruption(usize),
    Virus(usize),
    Characteristic(CharacteristicKind),
}

/// Borrowed view of one driver instance, as seen by the leaf matchers.
#[derive(Debug, Clone, Copy)]
pub enum DriverRef<'a> {
    Variant(&'a Variant),
    CopyNumber(&'a CopyNumber),
    Fusion(&'a Fusion),
    Disruption(&'a Disruption),
    HomozygousDisruption(&'a HomozygousDisruption),
    Virus(&'a Virus),
    Microsatellite(&'a MicrosatelliteStatus),
    MutationalBurden(&'a MutationalBurden),
    MutationalLoad(&'a MutationalLoad),
    HomologousRecombination(&'a HomologousRecombination),
}

impl<'a> DriverRef<'a> {
    /// Tumor-wide characteristics carry no reportable flag and always count as reportable.
    pub fn is_reportable(&self) -> bool {
        match self {
            DriverRef::Variant(v) => v.is_reportable,
            DriverRef::CopyNumber(c) => c.is_reportable,
            DriverRef::Fusion(f) => f.is_reportable,
            DriverRef::Disruption(d) => d.is_reportable,
            DriverRef::HomozygousDisruption(h) => h.is_reportable,
            DriverRef::Virus(v) => v.is_reportable,
            _ => true,
        }
    }

    /// Short human-readable event label, e.g. `BRAF 7:140453136 T>A`.
    pub fn event(&self) -> String {
        match self {
            DriverRef::Variant(v) => format!(
                "{} {}:{} {}>{}",
                v.gene, v.chromosome, v.position, v.ref_allele, v.alt_allele
            ),
            DriverRef::CopyNumber(c) => format!("{} {:?}", c.gene, c.copy_number_type),
            DriverRef::Fusion(f) => format!("{}::{} fusion", f.gene_up, f.gene_down),
            DriverRef::Disruption(d) => format!("{} disruption", d.gene),
            DriverRef::HomozygousDisruption(h) => format!("{} homozygous disruption", h.gene),
            DriverRef::Virus(v) => format!("{} ({:?})", v.name, v.virus_type),
            DriverRef::Microsatellite(m) => {
                if m.is_unstable { "MSI".to_string() } else { "MSS".to_string() }
            }
            DriverRef::MutationalBurden(b) => format!("TMB {:.1}", b.score),
            DriverRef::MutationalLoad(l) => format!("TML {}", l.count),
            DriverRef::HomologousRecombination(h) => format!("HRD {:.2}", h.score),
        }
    }
}

// ---------------------------------------------------------------------------
// Molecular profile
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MolecularProfile {
    #[serde(default)]
    pub sample_id: String,
    #[serde(default)]
    pub variants: Vec<Variant>,
    #[serde(default)]
    pub copy_numbers: Vec<CopyNumber>,
    #[serde(default)]
    pub fusions: Vec<Fusion>,
    #[serde(default)]
    pub disruptions: Vec<Disruption>,
    #[serde(default)]
    pub homozygous_disruptions: Vec<HomozygousDisruption>,
    #[serde(default)]
    pub viruses: Vec<Virus>,
    #[serde(default)]
    pub characteristics: TumorCharacteristics,
}

impl MolecularProfile {
    /// Enumerate every driver instance in stable order: variants, copy numbers,
    /// fusions, disruptions, homozygous disruptions, viruses, then the
    /// characteristics that are present.
    pub fn drivers(&self) -> impl Iterator<Item = (DriverId, DriverRef<'_>)> + '_ {
        let variants = self.variants.iter().enumerate()
            .map(|(i, v)| (DriverId::Variant(i), DriverRef::Variant(v)));
        let copy_numbers = self.copy_numbers.iter().enumerate()
            .map(|(i, c)| (DriverId::CopyNumber(i), DriverRef::CopyNumber(c)));
        let fusions = self.fusions.iter().enumerate()
            .map(|(i, f)| (DriverId::Fusion(i), DriverRef::Fusion(f)));
        let disruptions = self.disruptions.iter().enumerate()
            .map(|(i, d)| (DriverId::Disruption(i), DriverRef::Disruption(d)));
        let hom_disruptions = self.homozygous_disruptions.iter().enumerate()
            .map(|(i, h)| (DriverId::HomozygousDisruption(i), DriverRef::HomozygousDisruption(h)));
        let viruses = self.viruses.iter().enumerate()
            .map(|(i, v)| (DriverId::Virus(i), DriverRef::Virus(v)));

        let kinds = [
            CharacteristicKind::Microsatellite,
            CharacteristicKind::MutationalBurden,
            CharacteristicKind::MutationalLoad,
            CharacteristicKind::HomologousRecombination,
        ];
        let characteristics = kinds.into_iter().filter_map(move |kind| {
            let id = DriverId::Characteristic(kind);
            self.driver(id).map(|driver| (id, driver))
        });

        variants
            .chain(copy_numbers)
            .chain(fusions)
            .chain(disruptions)
            .chain(hom_disruptions)
            .chain(viruses)
            .chain(characteristics)
    }

    /// Resolve a [`DriverId`] back to the driver it identifies.
    pub fn driver(&self, id: DriverId) -> Option<DriverRef<'_>> {
        let c = &self.characteristics;
        match id {
            DriverId::Variant(i) => self.variants.get(i).map(DriverRef::Variant),
            DriverId::CopyNumber(i) => self.copy_numbers.get(i).map(DriverRef::CopyNumber),
            DriverId::Fusion(i) => self.fusions.get(i).map(DriverRef::Fusion),
            DriverId::Disruption(i) => self.disruptions.get(i).map(DriverRef::Disruption),
            DriverId::HomozygousDisruption(i) => {
                self.homozygous_disruptions.get(i).map(DriverRef::HomozygousDisruption)
            }
            DriverId::Virus(i) => self.viruses.get(i).map(DriverRef::Virus),
            DriverId::Characteristic(CharacteristicKind::Microsatellite) => {
                c.microsatellite.as_ref().map(DriverRef::Microsatellite)
            }
            DriverId::Characteristic(CharacteristicKind::MutationalBurden) => {
                c.mutational_burden.as_ref().map(DriverRef::MutationalBurden)
            }
            DriverId::Characteristic(CharacteristicKind::MutationalLoad) => {
                c.mutational_load.as_ref().map(DriverRef::MutationalLoad)
            }
            DriverId::Characteristic(CharacteristicKind::HomologousRecombination) => {
                c.homologous_recombination.as_ref().map(DriverRef::HomologousRecombination)
            }
        }
    }

    /// Number of driver instances enumerated by [`MolecularProfile::drivers`].
    pub fn driver_count(&self) -> usize {
        self.drivers().count()
    }
}
