use crate::codes::{CauseCode, ClaimTypeCode, NotifierCode, ObjectTypeCode};
use serde::{Deserialize, Serialize};

/// Outcome of deriving one field of a claim record.
///
/// `Absent` means the document legitimately yields no value (no date in the
/// text, no cause for claim type `Other`); `Failed` means processing broke.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Field<T> {
    Present(T),
    Absent,
    Failed(String),
}

impl<T> Field<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Field::Present(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Field::Present(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Field::Present(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Field::Failed(_))
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Field<U> {
        match self {
            Field::Present(v) => Field::Present(f(v)),
            Field::Absent => Field::Absent,
            Field::Failed(reason) => Field::Failed(reason),
        }
    }
}

impl<T> From<Option<T>> for Field<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Field::Present(v),
            None => Field::Absent,
        }
    }
}

/// Structured result for one claim document. Built once, never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRecord {
    pub document_id: String,
    pub object: Field<ObjectTypeCode>,
    #[serde(rename = "type")]
    pub claim_type: Field<ClaimTypeCode>,
    pub cause: Field<CauseCode>,
    pub notifier: Field<NotifierCode>,
    /// `DD.MM.YYYY`
    pub date: Field<String>,
}

impl ClaimRecord {
    /// Record for a document whose processing aborted; every field carries the reason.
    pub fn failed(document_id: impl Into<String>, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self {
            document_id: document_id.into(),
            object: Field::Failed(reason.clone()),
            claim_type: Field::Failed(reason.clone()),
            cause: Field::Failed(reason.clone()),
            notifier: Field::Failed(reason.clone()),
            date: Field::Failed(reason),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.object.is_failed()
            && self.claim_type.is_failed()
            && self.cause.is_failed()
            && self.notifier.is_failed()
            && self.date.is_failed()
    }
}
