//! Batch inference: classify tickets, forward them to a sink, persist the batch.
//!
//! Tickets are handled one at a time in input order. A sink failure is
//! logged and counted; it never changes the record or stops the batch.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::info;
use triage_store::ModelStore;

use crate::artifacts::TrainedModel;
use crate::dataset::TicketTable;
use crate::domain::{PredictionRecord, Result, Ticket};
use crate::metrics::METRICS;
use crate::obs;
use crate::reporting::write_predictions_json;
use crate::rules::assign_priority;
use crate::sink::{SinkPayload, TicketSink};
use crate::text::normalize_field;

/// Records of a finished batch plus delivery tallies.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchSummary {
    pub records: Vec<PredictionRecord>,
    pub delivered: usize,
    pub failed: usize,
}

/// Trained model plus the sink its predictions are forwarded to.
pub struct InferencePipeline {
    model: TrainedModel,
    sink: Arc<dyn TicketSink>,
}

impl InferencePipeline {
    pub fn new(model: TrainedModel, sink: Arc<dyn TicketSink>) -> Self {
        Self { model, sink }
    }

    /// Load the trained artifacts from `store`. Fails with
    /// `ModelNotTrained` when either one is absent.
    pub fn load(store: &dyn ModelStore, sink: Arc<dyn TicketSink>) -> Result<Self> {
        Ok(Self::new(TrainedModel::load(store)?, sink))
    }

    pub fn model(&self) -> &TrainedModel {
        &self.model
    }

    /// Classify one ticket, stamping it with `processed_at`.
    ///
    /// The category comes from the model on normalized text; the priority
    /// from the rules on the raw description.
    pub fn classify_at(&self, ticket: &Ticket, processed_at: DateTime<Utc>) -> PredictionRecord {
        let normalized = normalize_field(ticket.description.as_deref());
        let category = self.model.predict(&normalized);
        let priority = assign_priority(ticket.text(), category);
        obs::emit_ticket_classified(&ticket.id, category, priority);
        PredictionRecord {
            ticket_id: ticket.id.clone(),
            category,
            priority,
            processed_at,
        }
    }

    pub fn classify(&self, ticket: &Ticket) -> PredictionRecord {
        self.classify_at(ticket, Utc::now())
    }

    pub async fn run(&self, tickets: &[Ticket]) -> BatchSummary {
        self.run_with(tickets, |_, _| {}).await
    }

    /// Classify and deliver every ticket. `on_delivery` sees each record
    /// and whether the sink accepted it.
    pub async fn run_with<F>(&self, tickets: &[Ticket], mut on_delivery: F) -> BatchSummary
    where
        F: FnMut(&PredictionRecord, bool),
    {
        let started = Instant::now();
        obs::emit_batch_started(tickets.len());

        let mut records = Vec::with_capacity(tickets.len());
        let mut delivered = 0;
        let mut failed = 0;
        for ticket in tickets {
            let record = self.classify(ticket);
            METRICS.inc_tickets_processed();

            let ok = match self.sink.deliver(&SinkPayload::from(&record)).await {
                Ok(()) => {
                    METRICS.inc_sink_delivered();
                    delivered += 1;
                    true
                }
                Err(err) => {
                    METRICS.inc_sink_failed();
                    obs::emit_sink_delivery_failed(&record.ticket_id, &err);
                    failed += 1;
                    false
                }
            };
            on_delivery(&record, ok);
            records.push(record);
        }

        obs::emit_batch_finished(
            records.len(),
            delivered,
            failed,
            started.elapsed().as_millis() as u64,
        );
        METRICS.flush();

        BatchSummary {
            records,
            delivered,
            failed,
        }
    }

    /// [`run_with`](Self::run_with), then write the records to `output`.
    pub async fn run_to_file<F>(
        &self,
        tickets: &[Ticket],
        output: &Path,
        on_delivery: F,
    ) -> Result<BatchSummary>
    where
        F: FnMut(&PredictionRecord, bool),
    {
        let summary = self.run_with(tickets, on_delivery).await;
        write_predictions_json(output, &summary.records)?;
        info!(
            output = %output.display(),
            records = summary.records.len(),
            "prediction batch written"
        );
        Ok(summary)
    }
}

/// Full inference run over a CSV file.
///
/// Artifacts are loaded before the dataset is touched, so an untrained store
/// aborts without reading input or writing output.
pub async fn process_dataset<F>(
    store: &dyn ModelStore,
    sink: Arc<dyn TicketSink>,
    input: &Path,
    output: &Path,
    on_delivery: F,
) -> Result<BatchSummary>
where
    F: FnMut(&PredictionRecord, bool),
{
    let pipeline = InferencePipeline::load(store, sink)?;
    let _span = obs::BatchSpan::enter(&input.display().to_string());
    let table = TicketTable::read(input)?;
    pipeline
        .run_to_file(&table.tickets(), output, on_delivery)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, Priority};
    use crate::fakes::{FailingSink, RecordingSink};
    use crate::features::VectorSpace;
    use crate::model::{EnsembleModel, EnsembleParams};

    fn model() -> TrainedModel {
        let docs = [
            "puedo acceder vpn error contraseña",
            "laptop teclado funciona",
            "reembolso viáticos viaje",
            "factura proveedor",
            "vacaciones diciembre",
            "nómina quincena",
        ];
        let labels = [
            Category::Ti,
            Category::Ti,
            Category::Finanzas,
            Category::Finanzas,
            Category::Rrhh,
            Category::Rrhh,
        ];
        let space = VectorSpace::fit(&docs).unwrap();
        let xs = space.transform_all(&docs);
        let ensemble = EnsembleModel::fit(&xs, &labels, &EnsembleParams::default()).unwrap();
        TrainedModel::new(space, ensemble)
    }

    fn tickets() -> Vec<Ticket> {
        vec![
            Ticket::new(Some("1".into()), 1, Some("No puedo acceder a mi VPN, error de contraseña".into())),
            Ticket::new(Some("2".into()), 2, Some("Reembolso de viáticos del viaje".into())),
            Ticket::new(Some("3".into()), 3, None),
        ]
    }

    #[test]
    fn priority_comes_from_raw_text() {
        let pipeline = InferencePipeline::new(model(), Arc::new(RecordingSink::new()));
        let record = pipeline.classify(&tickets()[0]);
        assert_eq!(record.category, Category::Ti);
        assert_eq!(record.priority, Priority::Alta);
        assert_eq!(record.ticket_id, "1");
    }

    #[test]
    fn missing_description_still_classifies() {
        let pipeline = InferencePipeline::new(model(), Arc::new(RecordingSink::new()));
        let record = pipeline.classify(&tickets()[2]);
        assert_eq!(record.priority, Priority::Baja);
    }

    #[tokio::test]
    async fn every_ticket_is_delivered_in_order() {
        let sink = Arc::new(RecordingSink::new());
        let pipeline = InferencePipeline::new(model(), sink.clone());
        let summary = pipeline.run(&tickets()).await;

        assert_eq!(summary.delivered, 3);
        assert_eq!(summary.failed, 0);
        let ids: Vec<String> = sink.delivered().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert_eq!(summary.records[1].category, Category::Finanzas);
    }

    #[tokio::test]
    async fn sink_failures_do_not_stop_the_batch() {
        let sink = Arc::new(FailingSink::for_ids(["2"]));
        let pipeline = InferencePipeline::new(model(), sink.clone());
        let mut marks = Vec::new();
        let summary = pipeline
            .run_with(&tickets(), |record, ok| marks.push((record.ticket_id.clone(), ok)))
            .await;

        assert_eq!(summary.records.len(), 3);
        assert_eq!(summary.delivered, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(
            marks,
            vec![
                ("1".to_string(), true),
                ("2".to_string(), false),
                ("3".to_string(), true)
            ]
        );
        assert_eq!(sink.accepted().len(), 2);
    }
}
