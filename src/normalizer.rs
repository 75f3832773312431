//! Bulk bucketing of legacy cause codes (`sd_urs_art`).
//!
//! Rows are grouped by (claim type, object); each group gets exactly one
//! `BucketRule`, chosen from `RULE_TABLE`. Rows keep their original order.

use crate::dataset::{ClaimRow, ClaimsDataset};
use log::{debug, info};
use std::collections::BTreeMap;

/// Written when a vehicle code has no bucket.
pub const NO_MATCH: &str = "nan";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketRule {
    LeitungsWasser,
    Sturm,
    Elementar,
    Diebstahl,
    GlasObject,
    GlasProperty,
    Feuer,
    Vollkasko,
    Teilkasko,
    PassThrough,
}

#[derive(Debug, Clone, Copy)]
enum ObjectFilter {
    Any,
    OneOf(&'static [&'static str]),
}

impl ObjectFilter {
    fn accepts(&self, object: &str) -> bool {
        match self {
            ObjectFilter::Any => true,
            ObjectFilter::OneOf(objects) => objects.contains(&object),
        }
    }
}

/// First matching entry wins; no match means `PassThrough`.
const RULE_TABLE: &[(&str, ObjectFilter, BucketRule)] = &[
    ("LW", ObjectFilter::Any, BucketRule::LeitungsWasser),
    ("ST", ObjectFilter::Any, BucketRule::Sturm),
    ("EL", ObjectFilter::Any, BucketRule::Elementar),
    ("ED", ObjectFilter::Any, BucketRule::Diebstahl),
    ("GL", ObjectFilter::OneOf(&["GL"]), BucketRule::GlasObject),
    ("GL", ObjectFilter::OneOf(&["HR", "WG"]), BucketRule::GlasProperty),
    ("FE", ObjectFilter::Any, BucketRule::Feuer),
    ("VK", ObjectFilter::Any, BucketRule::Vollkasko),
    ("TK", ObjectFilter::Any, BucketRule::Teilkasko),
];

const VOLLKASKO_BUCKETS: &[(i64, &[i64])] = &[(1, &[51]), (2, &[562]), (3, &[561, 563, 564, 565, 57])];

const TEILKASKO_BUCKETS: &[(i64, &[i64])] = &[
    (77, &[77]),
    (741, &[741, 742, 743, 744]),
    (782, &[782]),
    (751, &[751]),
    (
        733,
        &[
            71, 78, 781, 72, 79, 791, 76, 753, 731, 732, 752, 733, 734, 771, 783, 792, 793,
        ],
    ),
];

impl BucketRule {
    pub fn select(claim_type: &str, object: &str) -> Self {
        RULE_TABLE
            .iter()
            .find(|(t, filter, _)| *t == claim_type && filter.accepts(object))
            .map(|(_, _, rule)| *rule)
            .unwrap_or(BucketRule::PassThrough)
    }

    pub fn apply(&self, raw: &str) -> String {
        let code = canonical_code(raw);

        match self {
            BucketRule::LeitungsWasser => keep_or(first_char(&code), &["0", "2", "4", "9"], "0"),
            BucketRule::Sturm => {
                let reduced = keep_two_digit(&code, &["10", "19"]);
                let bucket = keep_or(reduced, &["0", "1", "10", "19", "4", "7"], "1");
                if bucket == "1" {
                    "10".to_string()
                } else {
                    bucket
                }
            }
            BucketRule::Elementar => keep_or(first_char(&code), &["2"], "0"),
            BucketRule::Diebstahl => {
                let reduced = keep_two_digit(&code, &["70", "79"]);
                let bucket = keep_or(reduced, &["0", "7", "70", "79"], "0");
                if bucket == "7" {
                    "70".to_string()
                } else {
                    bucket
                }
            }
            BucketRule::GlasObject => {
                let padded = if code == "9" { "09".to_string() } else { code };
                keep_or(padded, &["09", "11", "12"], "00")
            }
            BucketRule::GlasProperty => "00".to_string(),
            BucketRule::Feuer => keep_or(first_char(&code), &["6", "9"], "0"),
            BucketRule::Vollkasko => numeric_bucket(&code, VOLLKASKO_BUCKETS),
            BucketRule::Teilkasko => numeric_bucket(&code, TEILKASKO_BUCKETS),
            BucketRule::PassThrough => raw.to_string(),
        }
    }
}

/// Stringified codes may arrive as `"51.0"` from float columns.
fn canonical_code(raw: &str) -> String {
    let code = raw.trim();
    match code.strip_suffix(".0") {
        Some(int) if !int.is_empty() && int.chars().all(|c| c.is_ascii_digit()) => int.to_string(),
        _ => code.to_string(),
    }
}

fn first_char(code: &str) -> String {
    code.chars().next().map(String::from).unwrap_or_default()
}

fn keep_two_digit(code: &str, two_digit: &[&str]) -> String {
    if two_digit.contains(&code) {
        code.to_string()
    } else {
        first_char(code)
    }
}

fn keep_or(code: String, allowed: &[&str], fallback: &str) -> String {
    if allowed.contains(&code.as_str()) {
        code
    } else {
        fallback.to_string()
    }
}

fn numeric_bucket(code: &str, buckets: &[(i64, &[i64])]) -> String {
    code.parse::<i64>()
        .ok()
        .and_then(|n| {
            buckets
                .iter()
                .find(|(_, members)| members.contains(&n))
                .map(|(bucket, _)| bucket.to_string())
        })
        .unwrap_or_else(|| NO_MATCH.to_string())
}

/// Rewrites every row's cause code into its canonical bucket.
pub fn normalize_dataset(dataset: &ClaimsDataset) -> ClaimsDataset {
    let mut rows: Vec<ClaimRow> = dataset.rows().to_vec();
    normalize_rows(&mut rows);
    ClaimsDataset::from_rows(rows)
}

pub fn normalize_rows(rows: &mut [ClaimRow]) {
    info!("Grouping sd_urs_art by sd_typ_kennung and schaden_objekt");

    let mut groups: BTreeMap<(String, String), Vec<usize>> = BTreeMap::new();
    for (idx, row) in rows.iter().enumerate() {
        groups
            .entry((row.claim_type.clone(), row.object.clone()))
            .or_default()
            .push(idx);
    }

    for ((claim_type, object), indices) in groups {
        let rule = BucketRule::select(&claim_type, &object);
        debug!(
            "Group ({}, {}): {} rows, rule {:?}",
            claim_type,
            object,
            indices.len(),
            rule
        );
        for idx in indices {
            rows[idx].cause = rule.apply(&rows[idx].cause);
        }
    }
}
