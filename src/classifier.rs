//! Facade over the completion service for the five classification tasks.
//!
//! Every task sends the same three messages (system prompt, document, task
//! instructions) and reads its result from a named key of the JSON answer.

use crate::codes::{ClaimTypeCode, NotifierCode, ObjectTypeCode};
use crate::config::ClassifierConfig;
use crate::error::{ClaimsError, Result};
use crate::llm::{
    ChatMessage, CompletionRequest, CompletionService, DateAnswer, LabelAnswer, ResponseSchema,
};
use crate::prompts;
use crate::vocabulary::CauseVocabulary;
use chrono::NaiveDate;
use log::{debug, info, warn};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::{Arc, LazyLock};
use tokio::time::{sleep, timeout};

const ANSWER_KEY: &str = "answer";
const DATE_KEY: &str = "Date";
const NO_DATE_MARKERS: [&str; 3] = ["none", "null", "-"];

static DATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2})\.(\d{1,2})\.(\d{4})\b").expect("date pattern is a valid regex")
});

#[derive(Clone)]
pub struct ClaimClassifier {
    service: Arc<dyn CompletionService>,
    vocabulary: Arc<CauseVocabulary>,
    config: ClassifierConfig,
}

impl ClaimClassifier {
    pub fn new(service: Arc<dyn CompletionService>, config: ClassifierConfig) -> Self {
        Self {
            service,
            vocabulary: Arc::new(CauseVocabulary::default()),
            config,
        }
    }

    pub fn with_vocabulary(mut self, vocabulary: Arc<CauseVocabulary>) -> Self {
        self.vocabulary = vocabulary;
        self
    }

    pub fn vocabulary(&self) -> Arc<CauseVocabulary> {
        Arc::clone(&self.vocabulary)
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Claim type of the document. A non-string or unknown answer means
    /// no type could be determined and yields `None`.
    pub async fn classify_type(&self, document: &str) -> Result<Option<ClaimTypeCode>> {
        let answer = self
            .ask::<LabelAnswer>("claim_type", document, prompts::CLAIM_TYPE_INSTRUCTIONS)
            .await?;

        let raw = match required_key("claim_type", &answer, ANSWER_KEY)? {
            Value::String(s) => s.trim().to_string(),
            other => {
                warn!("Claim type answer is not a string: {}", other);
                return Ok(None);
            }
        };

        let claim_type = ClaimTypeCode::parse(&raw);
        if claim_type.is_none() {
            warn!("Unknown claim type '{}', no type determined", raw);
        }
        Ok(claim_type)
    }

    /// Cause label out of the claim type's closed vocabulary. Types without
    /// a vocabulary (including an undetermined type) skip the call.
    pub async fn classify_cause(
        &self,
        document: &str,
        claim_type: Option<ClaimTypeCode>,
    ) -> Result<Option<String>> {
        let Some((claim_type, labels)) =
            claim_type.and_then(|t| self.vocabulary.cause_labels(t).map(|labels| (t, labels)))
        else {
            info!(
                "Schaden-Typ: {}, daher wird keine SD-URS-ART ermittelt",
                claim_type.map(|t| t.as_str()).unwrap_or("None")
            );
            return Ok(None);
        };

        let instructions = prompts::cause_instructions(claim_type, labels);
        let answer = self.ask::<LabelAnswer>("cause", document, &instructions).await?;
        let label = required_string("cause", &answer, ANSWER_KEY)?;

        Ok(Some(label).filter(|l| !l.is_empty()))
    }

    pub async fn classify_notifier(&self, document: &str) -> Result<NotifierCode> {
        let answer = self
            .ask::<LabelAnswer>("notifier", document, prompts::NOTIFIER_INSTRUCTIONS)
            .await?;
        let raw = required_string("notifier", &answer, ANSWER_KEY)?;

        Ok(NotifierCode::parse(&raw).unwrap_or_else(|| {
            warn!("Unknown notifier '{}', using Other", raw);
            NotifierCode::Other
        }))
    }

    /// Date of loss as `DD.MM.YYYY`, or `None` when the text names none.
    /// If the answer carries several dates the earliest one wins.
    pub async fn extract_date(&self, document: &str) -> Result<Option<String>> {
        let answer = self
            .ask::<DateAnswer>("date", document, prompts::DATE_INSTRUCTIONS)
            .await?;
        let raw = required_string("date", &answer, DATE_KEY)?;

        if raw.is_empty() || NO_DATE_MARKERS.contains(&raw.to_lowercase().as_str()) {
            return Ok(None);
        }

        let date = earliest_date(&raw);
        if date.is_none() {
            warn!("Date answer '{}' contains no valid DD.MM.YYYY date", raw);
        }
        Ok(date.map(|d| d.format("%d.%m.%Y").to_string()))
    }

    /// Category of the insured object. Unknown answers fall back to `Other`.
    pub async fn classify_object(&self, document: &str) -> Result<ObjectTypeCode> {
        let answer = self
            .ask::<LabelAnswer>("object", document, prompts::OBJECT_INSTRUCTIONS)
            .await?;
        let raw = required_string("object", &answer, ANSWER_KEY)?;

        Ok(ObjectTypeCode::parse(&raw).unwrap_or_else(|| {
            warn!("Unknown object category '{}', using Other", raw);
            ObjectTypeCode::Other
        }))
    }

    async fn ask<T: schemars::JsonSchema>(
        &self,
        task: &str,
        document: &str,
        instructions: &str,
    ) -> Result<Map<String, Value>> {
        let request = CompletionRequest {
            task: task.to_string(),
            model: self.config.model.clone(),
            temperature: self.config.temperature,
            messages: vec![
                ChatMessage::system(prompts::SYSTEM_PROMPT),
                ChatMessage::user(document),
                ChatMessage::user(instructions),
            ],
            response_schema: ResponseSchema::of::<T>(&format!("{}_answer", task)),
            answer_format: self.config.answer_format,
        };

        let raw = self.complete_with_retries(&request).await?;
        debug!("Answer for '{}': {}", task, raw);

        match serde_json::from_str::<Value>(raw.trim()) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(ClaimsError::malformed(
                task,
                format!("expected a JSON object, got {}", other),
            )),
            Err(e) => Err(ClaimsError::malformed(task, e.to_string())),
        }
    }

    async fn complete_with_retries(&self, request: &CompletionRequest) -> Result<String> {
        let mut last_err = None;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                sleep(self.config.backoff(attempt)).await;
            }

            match timeout(self.config.timeout(), self.service.complete(request)).await {
                Ok(Ok(text)) => return Ok(text),
                Ok(Err(e)) if e.is_transient() => {
                    warn!("'{}' attempt {} failed: {}", request.task, attempt + 1, e);
                    last_err = Some(e);
                }
                Ok(Err(e)) => return Err(e),
                Err(_) => {
                    warn!("'{}' attempt {} timed out", request.task, attempt + 1);
                    last_err = Some(ClaimsError::Timeout {
                        task: request.task.clone(),
                        seconds: self.config.timeout_secs,
                    });
                }
            }
        }

        Err(last_err.unwrap_or_else(|| {
            ClaimsError::CompletionFailed(format!("'{}' was never attempted", request.task))
        }))
    }
}

/// Looks a key up by name, falling back to a case-insensitive match.
fn required_key<'a>(task: &str, answer: &'a Map<String, Value>, key: &str) -> Result<&'a Value> {
    answer
        .get(key)
        .or_else(|| {
            answer
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v)
        })
        .ok_or_else(|| ClaimsError::malformed(task, format!("answer has no '{}' key", key)))
}

fn required_string(task: &str, answer: &Map<String, Value>, key: &str) -> Result<String> {
    match required_key(task, answer, key)? {
        Value::String(s) => Ok(s.trim().to_string()),
        Value::Null => Ok(String::new()),
        other => Err(ClaimsError::malformed(
            task,
            format!("'{}' is not a string: {}", key, other),
        )),
    }
}

/// Earliest valid calendar date written as `D.M.YYYY` / `DD.MM.YYYY` in `text`.
pub fn earliest_date(text: &str) -> Option<NaiveDate> {
    DATE_PATTERN
        .captures_iter(text)
        .filter_map(|caps| {
            let day = caps[1].parse().ok()?;
            let month = caps[2].parse().ok()?;
            let year = caps[3].parse().ok()?;
            NaiveDate::from_ymd_opt(year, month, day)
        })
        .min()
}
