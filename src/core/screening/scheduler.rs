//! Concurrent screening scheduler
//!
//! Runs one independent unit per candidate (assemble, then assess) with at
//! most `width` units in flight. Each unit runs on its own tokio task so a
//! panic inside assembly or evaluation only loses that patient.

use crate::core::assembler::RecordAssembler;
use crate::core::evaluator::CriteriaEvaluator;
use crate::domain::criteria::Assessment;
use crate::domain::errors::ScreenerError;
use crate::domain::ids::PatientId;
use crate::domain::record::PatientRecord;
use crate::domain::result::Result;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::any::Any;
use std::sync::Arc;

/// Produces the record for one candidate
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn assemble(&self, patient_id: &PatientId) -> Result<PatientRecord>;
}

/// Turns a record into a finished assessment
pub trait RecordEvaluator: Send + Sync {
    fn assess(&self, record: &PatientRecord) -> Assessment;
}

#[async_trait]
impl RecordSource for RecordAssembler {
    async fn assemble(&self, patient_id: &PatientId) -> Result<PatientRecord> {
        RecordAssembler::assemble(self, patient_id).await
    }
}

impl RecordEvaluator for CriteriaEvaluator {
    fn assess(&self, record: &PatientRecord) -> Assessment {
        CriteriaEvaluator::assess(self, record)
    }
}

/// A candidate whose unit failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedUnit {
    pub patient_id: PatientId,
    pub reason: String,
}

/// Everything one scheduling pass produced
#[derive(Debug, Default)]
pub struct ScheduleOutcome {
    /// Finished assessments in completion order
    pub assessments: Vec<Assessment>,
    pub dropped: Vec<DroppedUnit>,
}

/// Bounded fan-out over candidate ids
#[derive(Debug, Clone, Copy)]
pub struct ScreeningScheduler {
    width: usize,
}

impl ScreeningScheduler {
    /// A width of zero is treated as one
    pub fn new(width: usize) -> Self {
        Self {
            width: width.max(1),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Screens every id and waits for all units to finish
    ///
    /// Never fails as a whole. A unit that returns an error or panics is
    /// logged and reported in [`ScheduleOutcome::dropped`].
    pub async fn screen<S, E>(
        &self,
        patient_ids: impl IntoIterator<Item = PatientId>,
        source: Arc<S>,
        evaluator: Arc<E>,
    ) -> ScheduleOutcome
    where
        S: RecordSource + ?Sized + 'static,
        E: RecordEvaluator + ?Sized + 'static,
    {
        let patient_ids: Vec<PatientId> = patient_ids.into_iter().collect();
        let total = patient_ids.len();

        let mut units = stream::iter(patient_ids)
            .map(|patient_id| {
                let source = Arc::clone(&source);
                let evaluator = Arc::clone(&evaluator);
                let unit_id = patient_id.clone();
                async move {
                    let handle = tokio::spawn(async move {
                        let record = source.assemble(&unit_id).await?;
                        Ok::<_, ScreenerError>(evaluator.assess(&record))
                    });
                    (patient_id, handle.await)
                }
            })
            .buffer_unordered(self.width);

        let mut outcome = ScheduleOutcome::default();
        let mut finished = 0usize;
        while let Some((patient_id, joined)) = units.next().await {
            finished += 1;
            let reason = match joined {
                Ok(Ok(assessment)) => {
                    tracing::info!(
                        patient_id = %patient_id,
                        status = assessment.status().label(),
                        "Screened patient {finished}/{total}"
                    );
                    outcome.assessments.push(assessment);
                    continue;
                }
                Ok(Err(e)) => e.to_string(),
                Err(e) if e.is_panic() => {
                    format!("task panicked: {}", panic_message(e.into_panic()))
                }
                Err(e) => format!("task did not complete: {e}"),
            };

            crate::log_unit_dropped!(patient_id, reason);
            outcome.dropped.push(DroppedUnit { patient_id, reason });
        }

        outcome
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::criteria::{Criterion, CriterionKind, EligibilityStatus, PendingAssessment};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Source that fails for "bad", panics for "boom" and tracks concurrency
    #[derive(Default)]
    struct FakeSource {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl RecordSource for FakeSource {
        async fn assemble(&self, patient_id: &PatientId) -> Result<PatientRecord> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            match patient_id.as_str() {
                "bad" => Err(ScreenerError::InvalidInput("bad record".to_string())),
                "boom" => panic!("evaluator exploded"),
                _ => PatientRecord::builder()
                    .patient_id(patient_id.clone())
                    .build(),
            }
        }
    }

    struct AllMet;

    impl RecordEvaluator for AllMet {
        fn assess(&self, record: &PatientRecord) -> Assessment {
            let mut pending = PendingAssessment::new(record.patient_id().clone());
            pending.push(Criterion::met("Check", CriterionKind::Inclusion, "ok"));
            pending.finalize()
        }
    }

    fn ids(values: &[&str]) -> Vec<PatientId> {
        values.iter().map(|v| PatientId::new(*v).unwrap()).collect()
    }

    #[tokio::test]
    async fn test_failed_units_are_dropped() {
        let scheduler = ScreeningScheduler::new(4);
        let outcome = scheduler
            .screen(
                ids(&["1", "bad", "2", "boom", "3"]),
                Arc::new(FakeSource::default()),
                Arc::new(AllMet),
            )
            .await;

        let mut assessed: Vec<_> = outcome
            .assessments
            .iter()
            .map(|a| a.patient_id().as_str().to_string())
            .collect();
        assessed.sort();
        assert_eq!(assessed, vec!["1", "2", "3"]);
        assert!(outcome
            .assessments
            .iter()
            .all(|a| a.status() == EligibilityStatus::Eligible));

        let mut dropped: Vec<_> = outcome.dropped.iter().map(|d| d.patient_id.as_str()).collect();
        dropped.sort();
        assert_eq!(dropped, vec!["bad", "boom"]);
        let boom = outcome
            .dropped
            .iter()
            .find(|d| d.patient_id.as_str() == "boom")
            .unwrap();
        assert!(boom.reason.contains("evaluator exploded"));
    }

    #[tokio::test]
    async fn test_width_bounds_concurrency() {
        let source = Arc::new(FakeSource::default());
        let patient_ids: Vec<PatientId> = (0..12)
            .map(|i| PatientId::new(i.to_string()).unwrap())
            .collect();

        let outcome = ScreeningScheduler::new(3)
            .screen(patient_ids, source.clone(), Arc::new(AllMet))
            .await;

        assert_eq!(outcome.assessments.len(), 12);
        assert!(source.peak.load(Ordering::SeqCst) <= 3);
    }

    #[test]
    fn test_zero_width_is_one() {
        assert_eq!(ScreeningScheduler::new(0).width(), 1);
    }
}
