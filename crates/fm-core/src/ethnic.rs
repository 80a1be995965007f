//! Ethnic taxonomy: the closed category set and the nation code lookup table.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;
use std::str::FromStr;

use strum::{Display, EnumIter, EnumString};
use thiserror::Error;

/// One of the fixed set of visual categories a portrait folder is named after.
///
/// The serialized spellings are the ones the game uses for the image folders,
/// so they also show up in the stored mapping paths and the override config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
pub enum EthnicCategory {
    African,
    Asian,
    Caucasian,
    #[strum(serialize = "Central European")]
    CentralEuropean,
    #[strum(serialize = "EECA")]
    EasternEuropeanCentralAsian,
    #[strum(serialize = "Italmed")]
    ItalianMediterranean,
    #[strum(serialize = "MENA")]
    MiddleEastNorthAfrican,
    #[strum(serialize = "MESA")]
    MiddleEastSouthAsian,
    #[strum(serialize = "SAMed")]
    SouthAmericanMediterranean,
    Scandinavian,
    #[strum(serialize = "Seasian")]
    SouthEastAsian,
    #[strum(serialize = "South American")]
    SouthAmerican,
    #[strum(serialize = "SpanMed")]
    SpanishMediterranean,
    #[strum(serialize = "YugoGreek")]
    YugoslavGreek,
}

impl EthnicCategory {
    /// Membership test against the closed set, by wire name.
    pub fn is_valid(name: &str) -> bool {
        Self::from_str(name).is_ok()
    }
}

/// An override entry that referenced a category outside the closed set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidOverride {
    pub nation: String,
    pub category: String,
}

/// All invalid entries of one override batch, aggregated.
#[derive(Error, Debug)]
#[error("{}", describe_invalid(.invalid))]
pub struct OverrideError {
    pub invalid: Vec<InvalidOverride>,
}

fn describe_invalid(invalid: &[InvalidOverride]) -> String {
    let mut msg = String::new();
    for (i, entry) in invalid.iter().enumerate() {
        if i > 0 {
            msg.push('\n');
        }
        let _ = write!(
            msg,
            "ethnic value \"{}\" is not a valid ethnic for \"{}\"",
            entry.category, entry.nation
        );
    }
    msg
}

/// Lookup table from a 3-letter nation code to its ethnic category.
///
/// Owned by the caller rather than process-global: overrides mutate this
/// instance only, so runs and tests stay isolated from each other.
#[derive(Debug, Clone)]
pub struct NationEthnicTable {
    entries: HashMap<String, EthnicCategory>,
}

impl Default for NationEthnicTable {
    fn default() -> Self {
        let entries = BUILTIN_NATIONS
            .iter()
            .map(|&(nation, category)| (nation.to_string(), category))
            .collect();
        Self { entries }
    }
}

impl NationEthnicTable {
    /// Table with no entries at all; every lookup misses until overridden.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn resolve(&self, nation: &str) -> Option<EthnicCategory> {
        self.entries.get(nation).copied()
    }

    /// Nation codes currently known to the table, in arbitrary order.
    pub fn nations(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn insert(&mut self, nation: impl Into<String>, category: EthnicCategory) {
        self.entries.insert(nation.into(), category);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Applies a batch of nation → category overrides.
    ///
    /// Every entry naming a valid category is applied, even when other
    /// entries in the same batch fail validation. The rejected entries are
    /// returned together in one [`OverrideError`]; the ordered map keeps the
    /// report deterministic, ordered by nation code.
    pub fn apply_overrides(
        &mut self,
        overrides: &BTreeMap<String, String>,
    ) -> Result<(), OverrideError> {
        let mut invalid = Vec::new();

        for (nation, category) in overrides {
            match EthnicCategory::from_str(category) {
                Ok(parsed) => self.insert(nation.clone(), parsed),
                Err(_) => invalid.push(InvalidOverride {
                    nation: nation.clone(),
                    category: category.clone(),
                }),
            }
        }

        if invalid.is_empty() {
            Ok(())
        } else {
            Err(OverrideError { invalid })
        }
    }
}

/// Built-in nation table covering the game's nation codes.
const BUILTIN_NATIONS: &[(&str, EthnicCategory)] = &[
    ("AFG", EthnicCategory::MiddleEastSouthAsian),
    ("AIA", EthnicCategory::African),
    ("ALB", EthnicCategory::YugoslavGreek),
    ("ALG", EthnicCategory::MiddleEastNorthAfrican),
    ("AND", EthnicCategory::SpanishMediterranean),
    ("ANG", EthnicCategory::African),
    ("ARG", EthnicCategory::SouthAmericanMediterranean),
    ("ARM", EthnicCategory::EasternEuropeanCentralAsian),
    ("ARU", EthnicCategory::African),
    ("ASA", EthnicCategory::African),
    ("ATG", EthnicCategory::African),
    ("AUS", EthnicCategory::CentralEuropean),
    ("AUT", EthnicCategory::CentralEuropean),
    ("AXL", EthnicCategory::Scandinavian),
    ("AZE", EthnicCategory::EasternEuropeanCentralAsian),
    ("BAH", EthnicCategory::African),
    ("BAN", EthnicCategory::MiddleEastSouthAsian),
    ("BAS", EthnicCategory::SpanishMediterranean),
    ("BDI", EthnicCategory::African),
    ("BEL", EthnicCategory::CentralEuropean),
    ("BEN", EthnicCategory::African),
    ("BER", EthnicCategory::African),
    ("BFA", EthnicCategory::African),
    ("BHR", EthnicCategory::MiddleEastSouthAsian),
    ("BHU", EthnicCategory::Asian),
    ("BIH", EthnicCategory::YugoslavGreek),
    ("BLM", EthnicCategory::Caucasian),
    ("BLR", EthnicCategory::EasternEuropeanCentralAsian),
    ("BLZ", EthnicCategory::SouthAmerican),
    ("BOE", EthnicCategory::African),
    ("BOL", EthnicCategory::SouthAmerican),
    ("BOT", EthnicCategory::African),
    ("BRA", EthnicCategory::SouthAmerican),
    ("BRB", EthnicCategory::African),
    ("BRU", EthnicCategory::SouthEastAsian),
    ("BUL", EthnicCategory::EasternEuropeanCentralAsian),
    ("CAM", EthnicCategory::SouthEastAsian),
    ("CAN", EthnicCategory::Caucasian),
    ("CAY", EthnicCategory::African),
    ("CGO", EthnicCategory::African),
    ("CHA", EthnicCategory::African),
    ("CHI", EthnicCategory::SouthAmerican),
    ("CHN", EthnicCategory::Asian),
    ("CIV", EthnicCategory::African),
    ("CMR", EthnicCategory::African),
    ("COD", EthnicCategory::African),
    ("COK", EthnicCategory::African),
    ("COL", EthnicCategory::SouthAmerican),
    ("COM", EthnicCategory::African),
    ("CPV", EthnicCategory::African),
    ("CRC", EthnicCategory::SouthAmerican),
    ("CRO", EthnicCategory::YugoslavGreek),
    ("CTA", EthnicCategory::African),
    ("CUB", EthnicCategory::SouthAmerican),
    ("CUW", EthnicCategory::African),
    ("CYP", EthnicCategory::MiddleEastNorthAfrican),
    ("CZE", EthnicCategory::EasternEuropeanCentralAsian),
    ("DEN", EthnicCategory::Scandinavian),
    ("DJI", EthnicCategory::African),
    ("DMA", EthnicCategory::African),
    ("DOM", EthnicCategory::SouthAmerican),
    ("ECU", EthnicCategory::SouthAmerican),
    ("EGY", EthnicCategory::MiddleEastNorthAfrican),
    ("ENG", EthnicCategory::Caucasian),
    ("EQG", EthnicCategory::African),
    ("ERI", EthnicCategory::African),
    ("ESP", EthnicCategory::SpanishMediterranean),
    ("EST", EthnicCategory::EasternEuropeanCentralAsian),
    ("ESW", EthnicCategory::African),
    ("ETH", EthnicCategory::African),
    ("FIJ", EthnicCategory::African),
    ("FIN", EthnicCategory::Scandinavian),
    ("FRA", EthnicCategory::CentralEuropean),
    ("FRO", EthnicCategory::Scandinavian),
    ("FSM", EthnicCategory::African),
    ("GAB", EthnicCategory::African),
    ("GAM", EthnicCategory::African),
    ("GBR", EthnicCategory::Caucasian),
    ("GEO", EthnicCategory::EasternEuropeanCentralAsian),
    ("GER", EthnicCategory::CentralEuropean),
    ("GHA", EthnicCategory::African),
    ("GIB", EthnicCategory::Caucasian),
    ("GLP", EthnicCategory::African),
    ("GNB", EthnicCategory::African),
    ("GRE", EthnicCategory::YugoslavGreek),
    ("GRL", EthnicCategory::Caucasian),
    ("GRN", EthnicCategory::African),
    ("GUA", EthnicCategory::SouthAmerican),
    ("GUF", EthnicCategory::African),
    ("GUI", EthnicCategory::African),
    ("GUM", EthnicCategory::African),
    ("GUY", EthnicCategory::African),
    ("HAI", EthnicCategory::African),
    ("HKG", EthnicCategory::Asian),
    ("HON", EthnicCategory::SouthAmerican),
    ("HUN", EthnicCategory::CentralEuropean),
    ("IDN", EthnicCategory::SouthEastAsian),
    ("IND", EthnicCategory::MiddleEastSouthAsian),
    ("IRL", EthnicCategory::Caucasian),
    ("IRN", EthnicCategory::MiddleEastSouthAsian),
    ("IRQ", EthnicCategory::MiddleEastSouthAsian),
    ("ISL", EthnicCategory::Scandinavian),
    ("ISR", EthnicCategory::MiddleEastNorthAfrican),
    ("ITA", EthnicCategory::ItalianMediterranean),
    ("JAM", EthnicCategory::African),
    ("JOR", EthnicCategory::MiddleEastSouthAsian),
    ("JPN", EthnicCategory::Asian),
    ("KAZ", EthnicCategory::EasternEuropeanCentralAsian),
    ("KEN", EthnicCategory::African),
    ("KGZ", EthnicCategory::EasternEuropeanCentralAsian),
    ("KIR", EthnicCategory::African),
    ("KOR", EthnicCategory::Asian),
    ("KOS", EthnicCategory::YugoslavGreek),
    ("KSA", EthnicCategory::MiddleEastSouthAsian),
    ("KUW", EthnicCategory::MiddleEastSouthAsian),
    ("KVX", EthnicCategory::YugoslavGreek),
    ("LAO", EthnicCategory::SouthEastAsian),
    ("LBN", EthnicCategory::MiddleEastNorthAfrican),
    ("LBR", EthnicCategory::African),
    ("LBY", EthnicCategory::African),
    ("LCA", EthnicCategory::African),
    ("LES", EthnicCategory::African),
    ("LIB", EthnicCategory::MiddleEastNorthAfrican),
    ("LIE", EthnicCategory::CentralEuropean),
    ("LTU", EthnicCategory::EasternEuropeanCentralAsian),
    ("LUX", EthnicCategory::CentralEuropean),
    ("LVA", EthnicCategory::EasternEuropeanCentralAsian),
    ("MAC", EthnicCategory::Asian),
    ("MAD", EthnicCategory::African),
    ("MAR", EthnicCategory::MiddleEastNorthAfrican),
    ("MAS", EthnicCategory::SouthEastAsian),
    ("MAY", EthnicCategory::African),
    ("MDA", EthnicCategory::EasternEuropeanCentralAsian),
    ("MDV", EthnicCategory::African),
    ("MEX", EthnicCategory::SouthAmerican),
    ("MGL", EthnicCategory::Asian),
    ("MKD", EthnicCategory::EasternEuropeanCentralAsian),
    ("MLI", EthnicCategory::African),
    ("MLT", EthnicCategory::ItalianMediterranean),
    ("MNE", EthnicCategory::YugoslavGreek),
    ("MNG", EthnicCategory::Asian),
    ("MON", EthnicCategory::ItalianMediterranean),
    ("MOZ", EthnicCategory::African),
    ("MRI", EthnicCategory::African),
    ("MSR", EthnicCategory::African),
    ("MTN", EthnicCategory::African),
    ("MTQ", EthnicCategory::African),
    ("MWI", EthnicCategory::African),
    ("MYA", EthnicCategory::SouthEastAsian),
    ("NAM", EthnicCategory::African),
    ("NCA", EthnicCategory::SouthAmerican),
    ("NCL", EthnicCategory::African),
    ("NED", EthnicCategory::CentralEuropean),
    ("NEP", EthnicCategory::MiddleEastSouthAsian),
    ("NGA", EthnicCategory::African),
    ("NIG", EthnicCategory::African),
    ("NIR", EthnicCategory::Caucasian),
    ("NIU", EthnicCategory::African),
    ("NMI", EthnicCategory::African),
    ("NOR", EthnicCategory::Scandinavian),
    ("NZL", EthnicCategory::Caucasian),
    ("OMA", EthnicCategory::MiddleEastSouthAsian),
    ("PAK", EthnicCategory::MiddleEastSouthAsian),
    ("PAN", EthnicCategory::SouthAmerican),
    ("PAR", EthnicCategory::SouthAmerican),
    ("PER", EthnicCategory::SouthAmerican),
    ("PHI", EthnicCategory::SouthEastAsian),
    ("PLE", EthnicCategory::MiddleEastSouthAsian),
    ("PLW", EthnicCategory::African),
    ("PNG", EthnicCategory::African),
    ("POL", EthnicCategory::CentralEuropean),
    ("POR", EthnicCategory::SpanishMediterranean),
    ("PRK", EthnicCategory::Asian),
    ("PUR", EthnicCategory::SouthAmerican),
    ("QAT", EthnicCategory::MiddleEastSouthAsian),
    ("REU", EthnicCategory::African),
    ("ROU", EthnicCategory::EasternEuropeanCentralAsian),
    ("RSA", EthnicCategory::African),
    ("RUS", EthnicCategory::EasternEuropeanCentralAsian),
    ("RWA", EthnicCategory::African),
    ("SAM", EthnicCategory::African),
    ("SCO", EthnicCategory::Caucasian),
    ("SDN", EthnicCategory::African),
    ("SEN", EthnicCategory::African),
    ("SEY", EthnicCategory::African),
    ("SGP", EthnicCategory::Asian),
    ("SIN", EthnicCategory::SouthEastAsian),
    ("SKN", EthnicCategory::African),
    ("SLE", EthnicCategory::African),
    ("SLV", EthnicCategory::SouthAmerican),
    ("SMA", EthnicCategory::African),
    ("SMN", EthnicCategory::African),
    ("SMR", EthnicCategory::ItalianMediterranean),
    ("SOL", EthnicCategory::African),
    ("SOM", EthnicCategory::African),
    ("SPM", EthnicCategory::Caucasian),
    ("SRB", EthnicCategory::YugoslavGreek),
    ("SRI", EthnicCategory::African),
    ("SSD", EthnicCategory::African),
    ("STP", EthnicCategory::African),
    ("SUD", EthnicCategory::MiddleEastNorthAfrican),
    ("SUI", EthnicCategory::CentralEuropean),
    ("SUR", EthnicCategory::African),
    ("SVK", EthnicCategory::CentralEuropean),
    ("SVN", EthnicCategory::YugoslavGreek),
    ("SWE", EthnicCategory::Scandinavian),
    ("SWZ", EthnicCategory::African),
    ("SYR", EthnicCategory::MiddleEastSouthAsian),
    ("TAH", EthnicCategory::African),
    ("TAN", EthnicCategory::African),
    ("TCA", EthnicCategory::African),
    ("TGA", EthnicCategory::African),
    ("THA", EthnicCategory::SouthEastAsian),
    ("TJK", EthnicCategory::EasternEuropeanCentralAsian),
    ("TKM", EthnicCategory::EasternEuropeanCentralAsian),
    ("TLS", EthnicCategory::African),
    ("TOG", EthnicCategory::African),
    ("TPE", EthnicCategory::Asian),
    ("TRI", EthnicCategory::African),
    ("TUN", EthnicCategory::MiddleEastNorthAfrican),
    ("TUR", EthnicCategory::MiddleEastNorthAfrican),
    ("TUV", EthnicCategory::African),
    ("UAE", EthnicCategory::MiddleEastSouthAsian),
    ("UGA", EthnicCategory::African),
    ("UKR", EthnicCategory::EasternEuropeanCentralAsian),
    ("URU", EthnicCategory::SouthAmericanMediterranean),
    ("USA", EthnicCategory::Caucasian),
    ("UZB", EthnicCategory::EasternEuropeanCentralAsian),
    ("VAN", EthnicCategory::African),
    ("VAT", EthnicCategory::Caucasian),
    ("VEN", EthnicCategory::SouthAmerican),
    ("VGB", EthnicCategory::African),
    ("VIE", EthnicCategory::SouthEastAsian),
    ("VIN", EthnicCategory::African),
    ("VIR", EthnicCategory::African),
    ("WAL", EthnicCategory::Caucasian),
    ("WFI", EthnicCategory::African),
    ("YEM", EthnicCategory::MiddleEastSouthAsian),
    ("ZAM", EthnicCategory::African),
    ("ZAN", EthnicCategory::African),
    ("ZIM", EthnicCategory::African),
];
