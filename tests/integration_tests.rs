use async_trait::async_trait;
use fnol_classifier::*;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Script = dyn Fn(&str, &str) -> Result<String> + Send + Sync;

/// Completion service answering from a closure over (document, task).
struct ScriptedService {
    script: Box<Script>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedService {
    fn new(script: impl Fn(&str, &str) -> Result<String> + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            script: Box::new(script),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Same answers for every document.
    fn fixed(answers: &[(&str, &str)]) -> Arc<Self> {
        let answers: HashMap<String, String> = answers
            .iter()
            .map(|(task, json)| (task.to_string(), json.to_string()))
            .collect();
        Self::new(move |_, task| {
            answers
                .get(task)
                .cloned()
                .ok_or_else(|| ClaimsError::CompletionFailed(format!("no answer for {task}")))
        })
    }

    fn tasks_called(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, task)| task.clone())
            .collect()
    }
}

#[async_trait]
impl CompletionService for ScriptedService {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let document = request.messages[1].content.clone();
        self.calls
            .lock()
            .unwrap()
            .push((document.clone(), request.task.clone()));
        (self.script)(&document, &request.task)
    }
}

fn test_config() -> ClassifierConfig {
    ClassifierConfig {
        timeout_secs: 5,
        max_retries: 0,
        retry_backoff_ms: 0,
        concurrency: 3,
        ..Default::default()
    }
}

fn pipeline_with(service: Arc<dyn CompletionService>, config: ClassifierConfig) -> ClaimPipeline {
    ClaimPipeline::new(ClaimClassifier::new(service, config))
}

const STORM_GLASS_DOC: &str = "Schadentag: 25.01.2024. Vorgestern gab es einen Sturm und heute \
habe ich gemerkt, dass eine Scheibe im Glaszaun gesprungen ist.";

#[tokio::test]
async fn test_storm_document_end_to_end() {
    let service = ScriptedService::fixed(&[
        ("claim_type", r#"{"answer": " ST "}"#),
        ("cause", r#"{"answer": "Sturm sonstiges"}"#),
        ("object", r#"{"answer": "WG"}"#),
        ("notifier", r#"{"answer": "VN"}"#),
        ("date", r#"{"Thinking": "Der Sturm war am 25.01.2024.", "Date": "25.01.2024"}"#),
    ]);
    let pipeline = pipeline_with(service.clone(), test_config());

    let record = pipeline
        .build_claim_record("doc-1", STORM_GLASS_DOC)
        .await
        .unwrap();

    assert_eq!(record.document_id, "doc-1");
    assert_eq!(record.claim_type, Field::Present(ClaimTypeCode::Sturm));
    assert_eq!(record.object, Field::Present(ObjectTypeCode::Wohngebaeude));
    assert_eq!(record.cause, Field::Present(CauseCode::new("10")));
    assert_eq!(record.notifier, Field::Present(NotifierCode::Policyholder));
    assert_eq!(record.date, Field::Present("25.01.2024".to_string()));

    assert_eq!(
        service.tasks_called(),
        vec!["claim_type", "cause", "object", "notifier", "date"]
    );
}

#[tokio::test]
async fn test_glass_on_glass_object_uses_override() {
    let service = ScriptedService::fixed(&[
        ("claim_type", r#"{"answer": "GL"}"#),
        ("cause", r#"{"answer": "Einfachverglasung"}"#),
        ("object", r#"{"answer": "GL"}"#),
        ("notifier", r#"{"answer": "AD"}"#),
        ("date", r#"{"Thinking": "-", "Date": "None"}"#),
    ]);
    let record = pipeline_with(service, test_config())
        .build_claim_record("doc-gl", STORM_GLASS_DOC)
        .await
        .unwrap();

    assert_eq!(record.cause, Field::Present(CauseCode::new("4711")));
    assert_eq!(record.notifier, Field::Present(NotifierCode::FieldAgent));
    assert_eq!(record.date, Field::Absent);
}

#[tokio::test]
async fn test_glass_on_property_object_is_zero() {
    let service = ScriptedService::fixed(&[
        ("claim_type", r#"{"answer": "GL"}"#),
        ("cause", r#"{"answer": "Sonderverglasung"}"#),
        ("object", r#"{"answer": "HR"}"#),
        ("notifier", r#"{"answer": "VN"}"#),
        ("date", r#"{"Thinking": "", "Date": "None"}"#),
    ]);
    let record = pipeline_with(service, test_config())
        .build_claim_record("doc-hr", "Scheibe der Vitrine zerbrochen")
        .await
        .unwrap();

    assert_eq!(record.cause, Field::Present(CauseCode::new("0")));
}

#[tokio::test]
async fn test_bicycle_theft_maps_to_household_code() {
    let service = ScriptedService::fixed(&[
        ("claim_type", r#"{"answer": "ED"}"#),
        ("cause", r#"{"answer": "Fahrraddiebstahl"}"#),
        ("object", r#"{"answer": "HR"}"#),
        ("notifier", r#"{"answer": "AD"}"#),
        ("date", r#"{"Thinking": "Kein Datum genannt.", "Date": "None"}"#),
    ]);
    let record = pipeline_with(service, test_config())
        .build_claim_record("doc-bike", "Fahrraddiebstahl, Unterlagen anbei.")
        .await
        .unwrap();

    assert_eq!(record.object, Field::Present(ObjectTypeCode::Hausrat));
    assert_eq!(record.cause, Field::Present(CauseCode::new("79")));
}

#[tokio::test]
async fn test_other_type_skips_cause_call() {
    let service = ScriptedService::fixed(&[
        ("claim_type", r#"{"answer": "Other"}"#),
        ("object", r#"{"answer": "KH"}"#),
        ("notifier", r#"{"answer": "Other"}"#),
        ("date", r#"{"Thinking": "", "Date": "03.03.2024"}"#),
    ]);
    let record = pipeline_with(service.clone(), test_config())
        .build_claim_record("doc-other", "Auffahrunfall")
        .await
        .unwrap();

    assert_eq!(record.claim_type, Field::Present(ClaimTypeCode::Other));
    assert_eq!(record.cause, Field::Absent);
    assert!(!service.tasks_called().contains(&"cause".to_string()));
}

#[tokio::test]
async fn test_non_string_type_means_no_type() {
    let service = ScriptedService::fixed(&[
        ("claim_type", r#"{"answer": ["LW", "ST"]}"#),
        ("object", r#"{"answer": "WG"}"#),
        ("notifier", r#"{"answer": "VN"}"#),
        ("date", r#"{"Thinking": "", "Date": "None"}"#),
    ]);
    let record = pipeline_with(service.clone(), test_config())
        .build_claim_record("doc-x", "unklar")
        .await
        .unwrap();

    assert_eq!(record.claim_type, Field::Absent);
    assert_eq!(record.cause, Field::Absent);
    assert!(!service.tasks_called().contains(&"cause".to_string()));
}

#[tokio::test]
async fn test_malformed_type_answer_is_recorded_and_skips_cause() {
    let service = ScriptedService::fixed(&[
        ("claim_type", "Leitungswasser, ganz sicher"),
        ("object", r#"{"answer": "WG"}"#),
        ("notifier", r#"{"answer": "VN"}"#),
        ("date", r#"{"Thinking": "", "Date": "None"}"#),
    ]);
    let record = pipeline_with(service.clone(), test_config())
        .build_claim_record("doc-bad-type", "Rohrbruch im Keller")
        .await
        .unwrap();

    assert!(record.claim_type.is_failed());
    assert!(record.cause.is_failed());
    assert_eq!(record.object, Field::Present(ObjectTypeCode::Wohngebaeude));
    assert!(!service.tasks_called().contains(&"cause".to_string()));
}

#[tokio::test]
async fn test_unmapped_cause_label_yields_absent_cause() {
    let service = ScriptedService::fixed(&[
        ("claim_type", r#"{"answer": "LW"}"#),
        ("cause", r#"{"answer": "Frostschaden"}"#),
        ("object", r#"{"answer": "WG"}"#),
        ("notifier", r#"{"answer": "VN"}"#),
        ("date", r#"{"Thinking": "", "Date": "None"}"#),
    ]);
    let record = pipeline_with(service, test_config())
        .build_claim_record("doc-frost", "Leitung eingefroren")
        .await
        .unwrap();

    assert_eq!(record.claim_type, Field::Present(ClaimTypeCode::LeitungsWasser));
    assert_eq!(record.cause, Field::Absent);
}

#[tokio::test]
async fn test_malformed_object_answer_aborts_record() {
    let service = ScriptedService::fixed(&[
        ("claim_type", r#"{"answer": "LW"}"#),
        ("cause", r#"{"answer": "Rohrbruch"}"#),
        ("object", r#"{"category": "WG"}"#),
    ]);
    let err = pipeline_with(service, test_config())
        .build_claim_record("doc-obj", "Rohrbruch")
        .await
        .unwrap_err();

    assert!(matches!(err, ClaimsError::MalformedResponse { ref task, .. } if task == "object"));
}

#[tokio::test]
async fn test_extract_date_prefers_earliest_candidate() {
    let service = ScriptedService::fixed(&[(
        "date",
        r#"{"Thinking": "21. oder 22. März", "Date": "22.03.2024 oder 21.03.2024"}"#,
    )]);
    let classifier = ClaimClassifier::new(service, test_config());

    let date = classifier.extract_date("Sturm kurz vor Ostern").await.unwrap();
    assert_eq!(date.as_deref(), Some("21.03.2024"));
}

#[tokio::test]
async fn test_extract_date_none_marker_and_padding() {
    let none = ScriptedService::fixed(&[("date", r#"{"Thinking": "kein Datum", "Date": "None"}"#)]);
    let classifier = ClaimClassifier::new(none, test_config());
    assert_eq!(classifier.extract_date("Fahrrad weg").await.unwrap(), None);

    let short = ScriptedService::fixed(&[("date", r#"{"Thinking": "", "Date": "5.1.2024"}"#)]);
    let classifier = ClaimClassifier::new(short, test_config());
    assert_eq!(
        classifier.extract_date("...").await.unwrap().as_deref(),
        Some("05.01.2024")
    );
}

#[tokio::test]
async fn test_unknown_object_and_notifier_fall_back_to_other() {
    let service = ScriptedService::fixed(&[
        ("object", r#"{"answer": "Fahrrad"}"#),
        ("notifier", r#"{"answer": "Makler"}"#),
    ]);
    let classifier = ClaimClassifier::new(service, test_config());
    assert_eq!(classifier.classify_object("x").await.unwrap(), ObjectTypeCode::Other);
    assert_eq!(classifier.classify_notifier("x").await.unwrap(), NotifierCode::Other);
}

#[tokio::test]
async fn test_transient_failures_are_retried() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&attempts);
    let service = ScriptedService::new(move |_, _| {
        if counter.fetch_add(1, Ordering::SeqCst) < 2 {
            Err(ClaimsError::CompletionFailed("503".to_string()))
        } else {
            Ok(r#"{"answer": "VN"}"#.to_string())
        }
    });

    let config = ClassifierConfig {
        max_retries: 2,
        ..test_config()
    };
    let classifier = ClaimClassifier::new(service, config);
    assert_eq!(
        classifier.classify_notifier("x").await.unwrap(),
        NotifierCode::Policyholder
    );
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_retries_exhausted_returns_last_error() {
    let service = ScriptedService::new(|_, _| Err(ClaimsError::CompletionFailed("503".to_string())));
    let config = ClassifierConfig {
        max_retries: 1,
        ..test_config()
    };
    let classifier = ClaimClassifier::new(service.clone(), config);

    let err = classifier.classify_object("x").await.unwrap_err();
    assert!(matches!(err, ClaimsError::CompletionFailed(_)));
    assert_eq!(service.tasks_called().len(), 2);
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let service = ScriptedService::new(|_, task| {
        Err(ClaimsError::ApiStatus {
            task: task.to_string(),
            status: 400,
            body: "response_format json_schema is not supported".to_string(),
        })
    });
    let config = ClassifierConfig {
        max_retries: 3,
        ..test_config()
    };
    let classifier = ClaimClassifier::new(service.clone(), config);

    let err = classifier.classify_notifier("x").await.unwrap_err();
    assert!(matches!(err, ClaimsError::ApiStatus { status: 400, .. }));
    assert_eq!(service.tasks_called().len(), 1);
}

#[tokio::test]
async fn test_rate_limited_calls_are_retried() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&attempts);
    let service = ScriptedService::new(move |_, task| {
        if counter.fetch_add(1, Ordering::SeqCst) == 0 {
            Err(ClaimsError::ApiStatus {
                task: task.to_string(),
                status: 429,
                body: String::new(),
            })
        } else {
            Ok(r#"{"answer": "AD"}"#.to_string())
        }
    });
    let config = ClassifierConfig {
        max_retries: 1,
        ..test_config()
    };
    let classifier = ClaimClassifier::new(service, config);

    assert_eq!(
        classifier.classify_notifier("x").await.unwrap(),
        NotifierCode::FieldAgent
    );
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

/// Keeps every request it receives and answers the date task.
#[derive(Default)]
struct RecordingService {
    requests: Mutex<Vec<CompletionRequest>>,
}

#[async_trait]
impl CompletionService for RecordingService {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(r#"{"Thinking": "Nur ein Datum genannt.", "Date": "03.04.2024"}"#.to_string())
    }
}

#[tokio::test]
async fn test_date_request_asks_for_reasoning_before_date() {
    let service = Arc::new(RecordingService::default());
    let classifier = ClaimClassifier::new(service.clone(), ClassifierConfig::default());

    let date = classifier.extract_date("Wasserschaden am 03.04.2024").await.unwrap();
    assert_eq!(date.as_deref(), Some("03.04.2024"));

    let requests = service.requests.lock().unwrap();
    let wire = serde_json::to_value(llm::ChatCompletionRequest::from(&requests[0])).unwrap();
    assert_eq!(wire["response_format"]["type"], "json_schema");

    let format = wire["response_format"].to_string();
    let thinking = format.find(r#""Thinking""#).unwrap();
    let date = format.find(r#""Date""#).unwrap();
    assert!(thinking < date, "Date is listed before Thinking: {}", format);
}

#[tokio::test]
async fn test_answer_format_follows_config() {
    let service = Arc::new(RecordingService::default());

    let default_classifier = ClaimClassifier::new(service.clone(), ClassifierConfig::default());
    default_classifier.extract_date("x").await.unwrap();

    let legacy = ClassifierConfig {
        model: "gpt-3.5-turbo-0125".to_string(),
        answer_format: AnswerFormat::JsonObject,
        ..Default::default()
    };
    ClaimClassifier::new(service.clone(), legacy)
        .extract_date("x")
        .await
        .unwrap();

    let requests = service.requests.lock().unwrap();
    let wire: Vec<serde_json::Value> = requests
        .iter()
        .map(|r| serde_json::to_value(llm::ChatCompletionRequest::from(r)).unwrap())
        .collect();

    assert_eq!(wire[0]["model"], "gpt-4o-mini");
    assert_eq!(wire[0]["response_format"]["type"], "json_schema");
    assert_eq!(wire[0]["response_format"]["json_schema"]["strict"], true);
    assert_eq!(wire[1]["model"], "gpt-3.5-turbo-0125");
    assert_eq!(wire[1]["response_format"], serde_json::json!({"type": "json_object"}));
}

struct SlowService;

#[async_trait]
impl CompletionService for SlowService {
    async fn complete(&self, _request: &CompletionRequest) -> Result<String> {
        tokio::time::sleep(Duration::from_secs(10)).await;
        Ok(r#"{"answer": "VN"}"#.to_string())
    }
}

#[tokio::test]
async fn test_slow_calls_time_out() {
    let config = ClassifierConfig {
        timeout_secs: 1,
        ..test_config()
    };
    let classifier = ClaimClassifier::new(Arc::new(SlowService), config);

    let err = classifier.classify_notifier("x").await.unwrap_err();
    assert!(matches!(err, ClaimsError::Timeout { seconds: 1, .. }));
}

fn per_document_service() -> Arc<ScriptedService> {
    ScriptedService::new(|document, task| {
        if document.contains("kaputt") && task == "object" {
            return Ok("<html>502</html>".to_string());
        }
        let answer = match task {
            "claim_type" if document.contains("Rohr") => r#"{"answer": "LW"}"#,
            "claim_type" => r#"{"answer": "ST"}"#,
            "cause" if document.contains("Rohr") => r#"{"answer": "Rohrbruch"}"#,
            "cause" => r#"{"answer": "Hagel"}"#,
            "object" => r#"{"answer": "WG"}"#,
            "notifier" => r#"{"answer": "VN"}"#,
            _ => r#"{"Thinking": "", "Date": "None"}"#,
        };
        Ok(answer.to_string())
    })
}

#[tokio::test]
async fn test_batch_preserves_order_and_isolates_failures() {
    let pipeline = pipeline_with(per_document_service(), test_config());
    let documents = vec![
        ("1".to_string(), "Rohr geplatzt".to_string()),
        ("2".to_string(), "Hagel auf dem Dach".to_string()),
        ("3".to_string(), "alles kaputt".to_string()),
        ("4".to_string(), "Rohr undicht".to_string()),
        ("5".to_string(), "Hagelkörner".to_string()),
    ];

    let records = pipeline.classify_batch(documents).await;

    let ids: Vec<_> = records.iter().map(|r| r.document_id.as_str()).collect();
    assert_eq!(ids, ["1", "2", "3", "4", "5"]);

    assert_eq!(records[0].cause, Field::Present(CauseCode::new("2")));
    assert_eq!(records[1].cause, Field::Present(CauseCode::new("4")));
    assert!(records[2].is_failed());
    assert_eq!(records[3].cause, Field::Present(CauseCode::new("2")));
    assert_eq!(records[4].cause, Field::Present(CauseCode::new("4")));
}

#[tokio::test]
async fn test_evaluate_dataset_against_bucketed_ground_truth() {
    let csv = "doc_id,text,sd_typ_kennung,schaden_objekt,sd_urs_art,schaden_datum\n\
               a,Rohr geplatzt,LW,WG,21,\n\
               b,Hagel auf dem Dach,ST,WG,42,\n\
               c,Sturm hat Zaun umgeweht,ST,WG,19,\n";
    let dataset = ClaimsDataset::from_csv_reader(csv.as_bytes()).unwrap();
    let pipeline = pipeline_with(per_document_service(), test_config());

    let (records, report) = evaluate_dataset(&pipeline, &dataset).await;

    assert_eq!(records.len(), 3);
    assert_eq!(report.tally(ClaimField::Type).matches, 3);
    assert_eq!(report.tally(ClaimField::Object).matches, 3);
    assert_eq!(report.tally(ClaimField::Date).matches, 3);
    // c is predicted as hail (4) but labeled 19.
    assert_eq!(report.tally(ClaimField::Cause), FieldTally { matches: 2, mismatches: 1 });
    assert!(report.unaligned.is_empty());
}

#[test]
fn test_custom_vocabulary_is_injected_into_mapper() {
    let json = r#"{
        "profiles": {
            "FE": { "prompt_labels": ["Blitz"], "codes": { "Blitz": "3" } }
        },
        "special_cases": [
            { "object": "KF", "claim_type": "FE", "code": "999" }
        ]
    }"#;
    let vocabulary = Arc::new(CauseVocabulary::from_json(json).unwrap());
    let mapper = CauseMapper::new(vocabulary);

    assert_eq!(
        mapper.map_cause(ObjectTypeCode::Hausrat, Some(ClaimTypeCode::Feuer), Some("Blitz")),
        Some(CauseCode::new("3"))
    );
    assert_eq!(
        mapper.map_cause(ObjectTypeCode::Kasko, Some(ClaimTypeCode::Feuer), Some("Blitz")),
        Some(CauseCode::new("999"))
    );
    assert_eq!(
        mapper.map_cause(ObjectTypeCode::Hausrat, Some(ClaimTypeCode::Feuer), Some("Überspannung")),
        None
    );
}

#[test]
fn test_mapper_never_panics_over_all_inputs() {
    let mapper = CauseMapper::default();
    let labels = [
        None,
        Some(""),
        Some("Sonstiges"),
        Some("Hagel"),
        Some("Display Schaden"),
        Some("völlig unbekannt"),
    ];
    for object in ObjectTypeCode::ALL {
        for claim_type in ClaimTypeCode::ALL.into_iter().map(Some).chain([None]) {
            for label in labels {
                let _ = mapper.map_cause(object, claim_type, label);
            }
        }
    }
}
