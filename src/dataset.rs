use crate::error::{ClaimsError, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

/// One labeled claim as exported from the claims system.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClaimRow {
    pub doc_id: String,
    #[serde(default)]
    pub text: String,
    #[serde(rename = "sd_typ_kennung", default)]
    pub claim_type: String,
    #[serde(rename = "schaden_objekt", default)]
    pub object: String,
    #[serde(rename = "sd_urs_art", default)]
    pub cause: String,
    #[serde(rename = "schaden_datum", default)]
    pub date: String,
}

impl ClaimRow {
    fn normalized(mut self) -> Self {
        self.claim_type = self.claim_type.trim().to_string();
        self.object = self.object.trim().to_string();
        self.date = normalize_date_separator(&self.date);
        self
    }
}

/// Claim dates are exported as `DD-MM-YYYY`; records use `DD.MM.YYYY`.
pub fn normalize_date_separator(date: &str) -> String {
    date.trim().replace('-', ".")
}

/// Parallel column vectors, one entry per claim.
#[derive(Debug, Clone, Default)]
pub struct ClaimColumns {
    pub doc_ids: Vec<String>,
    pub objects: Vec<String>,
    pub claim_types: Vec<String>,
    pub causes: Vec<String>,
    pub dates: Vec<String>,
    /// Optional; leave empty when only labels are available.
    pub texts: Vec<String>,
}

/// Ordered collection of labeled claims.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClaimsDataset {
    rows: Vec<ClaimRow>,
}

impl ClaimsDataset {
    pub fn from_rows(rows: Vec<ClaimRow>) -> Self {
        Self {
            rows: rows.into_iter().map(ClaimRow::normalized).collect(),
        }
    }

    /// Zips parallel columns into rows. Every column must have as many
    /// entries as `doc_ids`; otherwise the whole batch is rejected.
    pub fn from_columns(columns: ClaimColumns) -> Result<Self> {
        let expected = columns.doc_ids.len();
        let mut checks = vec![
            ("schaden_objekt", columns.objects.len()),
            ("sd_typ_kennung", columns.claim_types.len()),
            ("sd_urs_art", columns.causes.len()),
            ("schaden_datum", columns.dates.len()),
        ];
        if !columns.texts.is_empty() {
            checks.push(("text", columns.texts.len()));
        }

        if let Some((column, actual)) = checks.into_iter().find(|(_, len)| *len != expected) {
            return Err(ClaimsError::DatasetShapeMismatch {
                expected,
                column: column.to_string(),
                actual,
            });
        }

        let mut texts = columns.texts.into_iter();
        let rows = columns
            .doc_ids
            .into_iter()
            .zip(columns.objects)
            .zip(columns.claim_types)
            .zip(columns.causes)
            .zip(columns.dates)
            .map(|((((doc_id, object), claim_type), cause), date)| ClaimRow {
                doc_id,
                text: texts.next().unwrap_or_default(),
                claim_type,
                object,
                cause,
                date,
            })
            .collect();

        Ok(Self::from_rows(rows))
    }

    /// Reads a CSV with headers `doc_id,text,sd_typ_kennung,schaden_objekt,sd_urs_art,schaden_datum`.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_reader(reader);

        let rows = csv_reader
            .deserialize::<ClaimRow>()
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self::from_rows(rows))
    }

    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let dataset = Self::from_csv_reader(file)?;
        info!("Loaded {} claims from {}", dataset.len(), path.display());
        Ok(dataset)
    }

    pub fn rows(&self) -> &[ClaimRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<ClaimRow> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, doc_id: &str) -> Option<&ClaimRow> {
        self.rows.iter().find(|r| r.doc_id == doc_id)
    }
}
