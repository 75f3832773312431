use crate::classifier::ClaimClassifier;
use crate::dataset::ClaimsDataset;
use crate::error::Result;
use crate::mapper::CauseMapper;
use crate::record::{ClaimRecord, Field};
use futures::stream::{self, StreamExt};
use log::{info, warn};

/// Turns claim documents into `ClaimRecord`s.
#[derive(Clone)]
pub struct ClaimPipeline {
    classifier: ClaimClassifier,
    mapper: CauseMapper,
}

impl ClaimPipeline {
    pub fn new(classifier: ClaimClassifier) -> Self {
        let mapper = CauseMapper::new(classifier.vocabulary());
        Self { classifier, mapper }
    }

    pub fn classifier(&self) -> &ClaimClassifier {
        &self.classifier
    }

    /// Runs the five classification steps in order for one document.
    ///
    /// A failing claim-type call is recorded on the `type` field and treated
    /// as "no type" downstream. Any other failing call aborts the record.
    pub async fn build_claim_record(
        &self,
        document_id: &str,
        document: &str,
    ) -> Result<ClaimRecord> {
        info!("Classifying document {}", document_id);

        let (claim_type, type_field) = match self.classifier.classify_type(document).await {
            Ok(t) => (t, Field::from(t)),
            Err(e) => {
                warn!("Claim type for {} failed, continuing without: {}", document_id, e);
                (None, Field::Failed(e.to_string()))
            }
        };

        let cause_label = self.classifier.classify_cause(document, claim_type).await?;
        let object = self.classifier.classify_object(document).await?;

        let cause = match &type_field {
            Field::Failed(reason) => Field::Failed(reason.clone()),
            _ => Field::from(self.mapper.map_cause(object, claim_type, cause_label.as_deref())),
        };

        let notifier = self.classifier.classify_notifier(document).await?;
        let date = self.classifier.extract_date(document).await?;

        Ok(ClaimRecord {
            document_id: document_id.to_string(),
            object: Field::Present(object),
            claim_type: type_field,
            cause,
            notifier: Field::Present(notifier),
            date: Field::from(date),
        })
    }

    /// Classifies many documents with bounded concurrency. Output order
    /// matches input order; a failing document becomes a failed record.
    pub async fn classify_batch<I>(&self, documents: I) -> Vec<ClaimRecord>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let concurrency = self.classifier.config().concurrency.max(1);

        let records: Vec<ClaimRecord> = stream::iter(documents.into_iter().map(
            |(document_id, text)| async move {
                match self.build_claim_record(&document_id, &text).await {
                    Ok(record) => record,
                    Err(e) => {
                        warn!("Document {} failed: {}", document_id, e);
                        ClaimRecord::failed(document_id, e.to_string())
                    }
                }
            },
        ))
        .buffered(concurrency)
        .collect()
        .await;

        let failed = records.iter().filter(|r| r.is_failed()).count();
        info!(
            "Classified {} documents ({} failed)",
            records.len(),
            failed
        );
        records
    }

    pub async fn classify_dataset(&self, dataset: &ClaimsDataset) -> Vec<ClaimRecord> {
        self.classify_batch(
            dataset
                .rows()
                .iter()
                .map(|row| (row.doc_id.clone(), row.text.clone())),
        )
        .await
    }
}
