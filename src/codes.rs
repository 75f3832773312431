use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Top-level category of loss, carried externally as a two-letter code.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, JsonSchema)]
pub enum ClaimTypeCode {
    #[serde(rename = "LW")]
    #[schemars(description = "Leitungswasser: water escaping from pipes, fittings or appliances")]
    LeitungsWasser,

    #[serde(rename = "ST")]
    #[schemars(description = "Sturm: storm and hail damage")]
    Sturm,

    #[serde(rename = "FE")]
    #[schemars(description = "Feuer: fire, lightning, overvoltage")]
    Feuer,

    #[serde(rename = "EL")]
    #[schemars(description = "Elementar: flooding, heavy rain and other natural hazards")]
    Elementar,

    #[serde(rename = "ED")]
    #[schemars(description = "Diebstahl: burglary, theft, vandalism")]
    Diebstahl,

    #[serde(rename = "GL")]
    #[schemars(description = "Glas: glass breakage")]
    Glas,

    #[serde(rename = "Other")]
    Other,
}

impl ClaimTypeCode {
    pub const ALL: [ClaimTypeCode; 7] = [
        ClaimTypeCode::LeitungsWasser,
        ClaimTypeCode::Sturm,
        ClaimTypeCode::Feuer,
        ClaimTypeCode::Elementar,
        ClaimTypeCode::Diebstahl,
        ClaimTypeCode::Glas,
        ClaimTypeCode::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimTypeCode::LeitungsWasser => "LW",
            ClaimTypeCode::Sturm => "ST",
            ClaimTypeCode::Feuer => "FE",
            ClaimTypeCode::Elementar => "EL",
            ClaimTypeCode::Diebstahl => "ED",
            ClaimTypeCode::Glas => "GL",
            ClaimTypeCode::Other => "Other",
        }
    }

    /// Parses a (trimmed) external code. Unknown codes yield `None`.
    pub fn parse(code: &str) -> Option<Self> {
        let code = code.trim();
        Self::ALL.into_iter().find(|t| t.as_str() == code)
    }
}

impl fmt::Display for ClaimTypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category of the insured asset. Independent of the claim type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, JsonSchema)]
pub enum ObjectTypeCode {
    #[serde(rename = "GL")]
    Glas,

    #[serde(rename = "HR")]
    #[schemars(description = "Hausrat: household contents, including bicycles")]
    Hausrat,

    #[serde(rename = "WG")]
    #[schemars(description = "Wohngebäude: residential building")]
    Wohngebaeude,

    #[serde(rename = "KF")]
    #[schemars(description = "Kasko: vehicle hull insurance")]
    Kasko,

    #[serde(rename = "KH")]
    #[schemars(description = "Kraftfahrthaftpflicht: motor third-party liability")]
    Kraftfahrthaftpflicht,

    #[serde(rename = "Other")]
    Other,
}

impl ObjectTypeCode {
    pub const ALL: [ObjectTypeCode; 6] = [
        ObjectTypeCode::Glas,
        ObjectTypeCode::Hausrat,
        ObjectTypeCode::Wohngebaeude,
        ObjectTypeCode::Kasko,
        ObjectTypeCode::Kraftfahrthaftpflicht,
        ObjectTypeCode::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectTypeCode::Glas => "GL",
            ObjectTypeCode::Hausrat => "HR",
            ObjectTypeCode::Wohngebaeude => "WG",
            ObjectTypeCode::Kasko => "KF",
            ObjectTypeCode::Kraftfahrthaftpflicht => "KH",
            ObjectTypeCode::Other => "Other",
        }
    }

    pub fn parse(code: &str) -> Option<Self> {
        let code = code.trim();
        Self::ALL.into_iter().find(|o| o.as_str() == code)
    }

    /// Household contents and buildings share the glass-breakage shortcut.
    pub fn is_property(&self) -> bool {
        matches!(self, ObjectTypeCode::Hausrat | ObjectTypeCode::Wohngebaeude)
    }
}

impl fmt::Display for ObjectTypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who reported the loss.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema)]
pub enum NotifierCode {
    #[serde(rename = "VN")]
    #[schemars(description = "Versicherungsnehmer: the policyholder")]
    Policyholder,

    #[serde(rename = "AD")]
    #[schemars(description = "Außendienst: a field agent")]
    FieldAgent,

    #[serde(rename = "Other")]
    Other,
}

impl NotifierCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotifierCode::Policyholder => "VN",
            NotifierCode::FieldAgent => "AD",
            NotifierCode::Other => "Other",
        }
    }

    pub fn parse(code: &str) -> Option<Self> {
        match code.trim() {
            "VN" => Some(NotifierCode::Policyholder),
            "AD" => Some(NotifierCode::FieldAgent),
            "Other" => Some(NotifierCode::Other),
            _ => None,
        }
    }
}

impl fmt::Display for NotifierCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical cause code (`sd_urs_art`), a string-encoded integer.
///
/// Codes are only meaningful together with their claim type: "9" is
/// "Fehlverhalten" under `LW` but "Vandalismus" under `ED`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct CauseCode(String);

impl CauseCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<u32> for CauseCode {
    fn from(code: u32) -> Self {
        Self(code.to_string())
    }
}

impl fmt::Display for CauseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
