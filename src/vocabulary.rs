//! Closed cause vocabularies per claim type.
//!
//! Each claim type owns a profile: the labels offered to the model when asking
//! for a cause, and the table translating those labels into cause codes. The
//! vocabulary is plain data; the built-in table is `CauseVocabulary::default()`
//! and alternative tables can be deserialized from JSON.

use crate::codes::{CauseCode, ClaimTypeCode, ObjectTypeCode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Cause code returned for property objects (`HR`, `WG`) under claim type `GL`.
pub const PROPERTY_GLASS_CAUSE: &str = "0";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClaimTypeProfile {
    /// Labels the model may choose from, in prompt order.
    pub prompt_labels: Vec<String>,
    /// Label to cause code. May be empty when codes come only from overrides.
    #[serde(default)]
    pub codes: BTreeMap<String, CauseCode>,
}

impl ClaimTypeProfile {
    fn new(prompt_labels: &[&str], codes: &[(&str, u32)]) -> Self {
        Self {
            prompt_labels: prompt_labels.iter().map(|l| l.to_string()).collect(),
            codes: codes
                .iter()
                .map(|(label, code)| (label.to_string(), CauseCode::from(*code)))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialCase {
    pub object: ObjectTypeCode,
    pub claim_type: ClaimTypeCode,
    pub code: CauseCode,
}

/// Why a label could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupMiss {
    NoTable(ClaimTypeCode),
    UnknownLabel {
        claim_type: ClaimTypeCode,
        label: String,
    },
}

impl fmt::Display for LookupMiss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupMiss::NoTable(claim_type) => {
                write!(f, "no cause table for claim type '{}'", claim_type)
            }
            LookupMiss::UnknownLabel { claim_type, label } => {
                write!(f, "label '{}' is not a cause of claim type '{}'", label, claim_type)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CauseVocabulary {
    pub profiles: BTreeMap<ClaimTypeCode, ClaimTypeProfile>,
    #[serde(default)]
    pub special_cases: Vec<SpecialCase>,
}

impl Default for CauseVocabulary {
    fn default() -> Self {
        let mut profiles = BTreeMap::new();

        profiles.insert(
            ClaimTypeCode::LeitungsWasser,
            ClaimTypeProfile::new(
                &["Rohrbruch", "Armaturen", "Fehlverhalten", "Sonstiges"],
                &[
                    ("Sonstiges", 0),
                    ("Rohrbruch", 2),
                    ("Armaturen", 4),
                    ("Fehlverhalten", 9),
                ],
            ),
        );
        profiles.insert(
            ClaimTypeCode::Sturm,
            ClaimTypeProfile::new(
                &[
                    "Sturm Grundstücksbestandteile",
                    "Sturm sonstiges",
                    "Hagel",
                    "Gartenmöbel",
                ],
                &[
                    ("Sturm sonstiges", 10),
                    ("Sturm Grundstücksbestandteile", 19),
                    ("Hagel", 4),
                    ("Gartenmöbel", 7),
                ],
            ),
        );
        profiles.insert(
            ClaimTypeCode::Elementar,
            ClaimTypeProfile::new(
                &["Überflutung durch Starkregen", "Sonstiges"],
                &[("Überflutung durch Starkregen", 2), ("Sonstiges", 0)],
            ),
        );
        profiles.insert(
            ClaimTypeCode::Diebstahl,
            ClaimTypeProfile::new(
                &[
                    "einfacher Diebstahl",
                    "Fahrraddiebstahl",
                    "Vandalismus",
                    "Sonstiges",
                ],
                &[
                    ("Sonstiges", 0),
                    ("einfacher Diebstahl", 70),
                    ("Fahrraddiebstahl", 79),
                    ("Vandalismus", 9),
                ],
            ),
        );
        // Glass causes are asked for but resolved through overrides only.
        profiles.insert(
            ClaimTypeCode::Glas,
            ClaimTypeProfile::new(
                &[
                    "Display Schaden",
                    "Einfachverglasung",
                    "Sonderverglasung",
                    "Sonstiges",
                ],
                &[],
            ),
        );
        profiles.insert(
            ClaimTypeCode::Feuer,
            ClaimTypeProfile::new(
                &["Überspannung", "Fehlverhalten", "Sonstiges"],
                &[("Sonstiges", 0), ("Überspannung", 6), ("Fehlverhalten", 9)],
            ),
        );

        Self {
            profiles,
            special_cases: vec![SpecialCase {
                object: ObjectTypeCode::Glas,
                claim_type: ClaimTypeCode::Glas,
                code: CauseCode::from(4711),
            }],
        }
    }
}

impl CauseVocabulary {
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn profile(&self, claim_type: ClaimTypeCode) -> Option<&ClaimTypeProfile> {
        self.profiles.get(&claim_type)
    }

    /// Labels to offer the model, or `None` when no cause is derived for this type.
    pub fn cause_labels(&self, claim_type: ClaimTypeCode) -> Option<&[String]> {
        self.profile(claim_type)
            .map(|p| p.prompt_labels.as_slice())
            .filter(|labels| !labels.is_empty())
    }

    pub fn special_case(
        &self,
        object: ObjectTypeCode,
        claim_type: ClaimTypeCode,
    ) -> Option<&CauseCode> {
        self.special_cases
            .iter()
            .find(|sc| sc.object == object && sc.claim_type == claim_type)
            .map(|sc| &sc.code)
    }

    pub fn lookup(
        &self,
        claim_type: ClaimTypeCode,
        label: &str,
    ) -> std::result::Result<&CauseCode, LookupMiss> {
        let profile = self
            .profile(claim_type)
            .filter(|p| !p.codes.is_empty())
            .ok_or(LookupMiss::NoTable(claim_type))?;

        profile
            .codes
            .get(label)
            .ok_or_else(|| LookupMiss::UnknownLabel {
                claim_type,
                label: label.to_string(),
            })
    }
}
