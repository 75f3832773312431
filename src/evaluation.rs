use crate::dataset::{ClaimRow, ClaimsDataset};
use crate::record::{ClaimRecord, Field};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ClaimField {
    Type,
    Object,
    Cause,
    Date,
}

impl ClaimField {
    pub const ALL: [ClaimField; 4] = [
        ClaimField::Type,
        ClaimField::Object,
        ClaimField::Cause,
        ClaimField::Date,
    ];

    fn predicted(&self, record: &ClaimRecord) -> Field<String> {
        match self {
            ClaimField::Type => record.claim_type.clone().map(|t| t.as_str().to_string()),
            ClaimField::Object => record.object.clone().map(|o| o.as_str().to_string()),
            ClaimField::Cause => record.cause.clone().map(|c| c.as_str().to_string()),
            ClaimField::Date => record.date.clone(),
        }
    }

    fn expected<'a>(&self, row: &'a ClaimRow) -> Option<&'a str> {
        let value = match self {
            ClaimField::Type => &row.claim_type,
            ClaimField::Object => &row.object,
            ClaimField::Cause => &row.cause,
            ClaimField::Date => &row.date,
        };
        Some(value.trim()).filter(|v| !v.is_empty())
    }
}

impl fmt::Display for ClaimField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ClaimField::Type => "type",
            ClaimField::Object => "object",
            ClaimField::Cause => "cause",
            ClaimField::Date => "date",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FieldTally {
    pub matches: usize,
    pub mismatches: usize,
}

impl FieldTally {
    pub fn total(&self) -> usize {
        self.matches + self.mismatches
    }

    pub fn accuracy(&self) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            self.matches as f64 / self.total() as f64
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mismatch {
    pub document_id: String,
    pub field: ClaimField,
    pub predicted: Field<String>,
    pub expected: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MatchReport {
    pub fields: BTreeMap<ClaimField, FieldTally>,
    pub mismatches: Vec<Mismatch>,
    /// Predictions whose document id is missing from the ground truth.
    pub unaligned: Vec<String>,
}

impl MatchReport {
    pub fn tally(&self, field: ClaimField) -> FieldTally {
        self.fields.get(&field).copied().unwrap_or_default()
    }
}

impl fmt::Display for MatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (field, tally) in &self.fields {
            writeln!(
                f,
                "{:<7} {:>5} match  {:>5} mismatch  ({:.1}%)",
                field.to_string(),
                tally.matches,
                tally.mismatches,
                tally.accuracy() * 100.0
            )?;
        }
        if !self.unaligned.is_empty() {
            writeln!(f, "unaligned documents: {}", self.unaligned.join(", "))?;
        }
        Ok(())
    }
}

/// Compares predictions with (already normalized) ground truth, field by field.
///
/// Absent on both sides counts as a match; a failed field never matches.
pub fn compare_records(predictions: &[ClaimRecord], ground_truth: &ClaimsDataset) -> MatchReport {
    let by_id: HashMap<&str, &ClaimRow> = ground_truth
        .rows()
        .iter()
        .map(|row| (row.doc_id.as_str(), row))
        .collect();

    let mut report = MatchReport::default();
    for field in ClaimField::ALL {
        report.fields.insert(field, FieldTally::default());
    }

    for record in predictions {
        let Some(row) = by_id.get(record.document_id.as_str()) else {
            report.unaligned.push(record.document_id.clone());
            continue;
        };

        for field in ClaimField::ALL {
            let predicted = field.predicted(record);
            let expected = field.expected(row);
            let matched = match (&predicted, expected) {
                (Field::Present(p), Some(e)) => p == e,
                (Field::Absent, None) => true,
                _ => false,
            };

            let tally = report.fields.entry(field).or_default();
            if matched {
                tally.matches += 1;
            } else {
                tally.mismatches += 1;
                report.mismatches.push(Mismatch {
                    document_id: record.document_id.clone(),
                    field,
                    predicted,
                    expected: expected.map(String::from),
                });
            }
        }
    }

    report
}
