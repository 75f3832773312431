use crate::codes::{CauseCode, ClaimTypeCode, ObjectTypeCode};
use crate::vocabulary::{CauseVocabulary, PROPERTY_GLASS_CAUSE};
use log::{info, warn};
use std::sync::Arc;

/// Resolves (object, claim type, cause label) into a cause code.
///
/// Order of precedence:
/// 1. registered special case for (object, claim type)
/// 2. property object (`HR`/`WG`) under claim type `GL` → `"0"`
/// 3. the claim type's label table
///
/// Anything that falls through yields `None` with a warning.
#[derive(Debug, Clone, Default)]
pub struct CauseMapper {
    vocabulary: Arc<CauseVocabulary>,
}

impl CauseMapper {
    pub fn new(vocabulary: Arc<CauseVocabulary>) -> Self {
        Self { vocabulary }
    }

    pub fn vocabulary(&self) -> &CauseVocabulary {
        &self.vocabulary
    }

    pub fn map_cause(
        &self,
        object: ObjectTypeCode,
        claim_type: Option<ClaimTypeCode>,
        cause_label: Option<&str>,
    ) -> Option<CauseCode> {
        info!("Schaden Objekt: {}", object);

        let Some(claim_type) = claim_type else {
            warn!("No claim type determined, cause code left empty");
            return None;
        };
        info!("Schaden Typ: {}", claim_type);

        if let Some(code) = self.vocabulary.special_case(object, claim_type) {
            info!("Special case ({}, {}) → {}", object, claim_type, code);
            return Some(code.clone());
        }

        if object.is_property() && claim_type == ClaimTypeCode::Glas {
            info!("Schaden-Ursachen-Art: {}", PROPERTY_GLASS_CAUSE);
            return Some(CauseCode::new(PROPERTY_GLASS_CAUSE));
        }

        let Some(label) = cause_label else {
            warn!("No cause label for claim type '{}', object '{}'", claim_type, object);
            return None;
        };

        match self.vocabulary.lookup(claim_type, label.trim()) {
            Ok(code) => {
                info!("Schaden-Ursachen-Art: {}", code);
                Some(code.clone())
            }
            Err(miss) => {
                warn!("Unmapped cause for object '{}': {}", object, miss);
                None
            }
        }
    }
}
