// ============================================================
// GEOCODE BATCH USE CASE
// ============================================================
// Drive every table row through the resolution policy, strictly
// sequentially, degrading per row and stopping at the monthly quota

use tokio::sync::mpsc;

use crate::domain::error::Result;
use crate::domain::run::{ProgressEvent, RunSummary};
use crate::domain::table::AddressTable;
use crate::infrastructure::request_counter::RequestCounter;

use super::resolve_address::AddressResolver;

pub struct GeocodeBatchUseCase {
    resolver: AddressResolver,
    counter: RequestCounter,
}

impl GeocodeBatchUseCase {
    pub fn new(resolver: AddressResolver, counter: RequestCounter) -> Self {
        Self { resolver, counter }
    }

    /// Annotate the table in place. Rows are processed one at a time, each
    /// service call awaited before the next row starts. Service failures
    /// degrade to unresolved rows; only I/O and counter persistence
    /// failures abort the run.
    pub async fn execute(
        &mut self,
        table: &mut AddressTable,
        events: &mpsc::Sender<ProgressEvent>,
    ) -> Result<RunSummary> {
        let total = table.len();
        let _ = events
            .send(ProgressEvent::Started { total_rows: total })
            .await;

        let mut summary = RunSummary {
            total,
            ..Default::default()
        };

        for index in 0..total {
            if self.counter.is_exhausted() {
                tracing::warn!(
                    limit = self.counter.limit(),
                    "monthly geocoding request limit reached, stopping early"
                );
                let _ = events
                    .send(ProgressEvent::QuotaExhausted { completed: index })
                    .await;
                summary.unresolved += total - index;
                break;
            }

            let address = table.address(index).to_string();
            if address.trim().is_empty() {
                tracing::warn!(row = index, "empty address cell, row left unresolved");
                summary.unresolved += 1;
                let _ = events
                    .send(ProgressEvent::RowProcessed {
                        index,
                        resolved: false,
                    })
                    .await;
                continue;
            }

            let resolved = match self.resolver.resolve(&address).await {
                Ok(resolution) => {
                    // The call reached the service; count it against the
                    // monthly quota whether or not anything matched.
                    self.counter.record()?;
                    match resolution.coordinate {
                        Some(coordinate) => {
                            table.set_coordinate(index, coordinate);
                            true
                        }
                        None => {
                            tracing::warn!(
                                row = index,
                                address = %resolution.effective_address,
                                "no geocoding results"
                            );
                            false
                        }
                    }
                }
                Err(err) => {
                    tracing::warn!(row = index, error = %err, "geocoding failed, row left unresolved");
                    false
                }
            };

            if resolved {
                summary.resolved += 1;
            } else {
                summary.unresolved += 1;
            }
            let _ = events
                .send(ProgressEvent::RowProcessed { index, resolved })
                .await;
        }

        summary.requests_used = self.counter.used();
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::geocode::{Coordinate, GeocodeCandidate, GeocodeError, LocationPrecision};
    use crate::infrastructure::geocoding::GeocodingGateway;
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct StubGateway {
        calls: AtomicUsize,
        fail_on: Option<usize>,
    }

    impl StubGateway {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail_on: None,
            })
        }

        fn failing_on(call: usize) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail_on: Some(call),
            })
        }
    }

    #[async_trait]
    impl GeocodingGateway for StubGateway {
        async fn geocode(
            &self,
            address: &str,
            _country: &str,
        ) -> std::result::Result<Vec<GeocodeCandidate>, GeocodeError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_on == Some(call) {
                return Err(GeocodeError::Timeout);
            }
            if address.contains("invalid") {
                return Ok(Vec::new());
            }
            Ok(vec![GeocodeCandidate {
                precision: LocationPrecision::Rooftop,
                coordinate: Coordinate {
                    latitude: 35.0 + call as f64,
                    longitude: 139.0,
                },
            }])
        }
    }

    fn counter(name: &str, limit: u32) -> RequestCounter {
        let dir = std::env::temp_dir().join(format!("geopin-batch-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path: PathBuf = dir.join(name);
        let _ = std::fs::remove_file(&path);
        RequestCounter::load(&path, limit)
    }

    fn table(addresses: &[&str]) -> AddressTable {
        AddressTable::new(
            vec!["address".to_string()],
            addresses.iter().map(|a| vec![a.to_string()]).collect(),
        )
        .unwrap()
    }

    async fn run(
        gateway: Arc<StubGateway>,
        table: &mut AddressTable,
        counter: RequestCounter,
    ) -> (RunSummary, Vec<ProgressEvent>) {
        let resolver = AddressResolver::new(gateway, "JP".to_string());
        let mut use_case = GeocodeBatchUseCase::new(resolver, counter);
        let (tx, mut rx) = mpsc::channel(64);
        let summary = use_case.execute(table, &tx).await.unwrap();
        drop(tx);
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        (summary, events)
    }

    #[tokio::test]
    async fn test_annotates_rows_in_order() {
        let mut table = table(&["Tokyo Tower", "Tokyo Station"]);
        let (summary, events) = run(StubGateway::new(), &mut table, counter("order.json", 100)).await;

        assert_eq!(summary.total, 2);
        assert_eq!(summary.resolved, 2);
        assert_eq!(summary.requests_used, 2);
        assert_eq!(table.rows()[0].coordinate.unwrap().latitude, 35.0);
        assert_eq!(table.rows()[1].coordinate.unwrap().latitude, 36.0);

        assert!(matches!(events[0], ProgressEvent::Started { total_rows: 2 }));
        assert!(matches!(
            events[1],
            ProgressEvent::RowProcessed {
                index: 0,
                resolved: true
            }
        ));
        assert!(matches!(
            events[2],
            ProgressEvent::RowProcessed {
                index: 1,
                resolved: true
            }
        ));
    }

    #[tokio::test]
    async fn test_unresolved_row_does_not_affect_others() {
        let mut table = table(&["Tokyo Tower", "???invalid???", "Tokyo Station"]);
        let (summary, _) = run(StubGateway::new(), &mut table, counter("mixed.json", 100)).await;

        assert_eq!(summary.resolved, 2);
        assert_eq!(summary.unresolved, 1);
        assert!(table.rows()[0].coordinate.is_some());
        assert!(table.rows()[1].coordinate.is_none());
        assert!(table.rows()[2].coordinate.is_some());
    }

    #[tokio::test]
    async fn test_service_error_degrades_to_unresolved() {
        let mut table = table(&["Tokyo Tower", "Tokyo Station"]);
        let (summary, _) = run(
            StubGateway::failing_on(0),
            &mut table,
            counter("failing.json", 100),
        )
        .await;

        assert_eq!(summary.resolved, 1);
        assert_eq!(summary.unresolved, 1);
        assert!(table.rows()[0].coordinate.is_none());
        assert!(table.rows()[1].coordinate.is_some());
        // The failed call never reached the service, so it is not counted.
        assert_eq!(summary.requests_used, 1);
    }

    #[tokio::test]
    async fn test_empty_address_skips_service_calls() {
        let mut table = table(&["  ", "Tokyo Tower"]);
        let gateway = StubGateway::new();
        let (summary, _) = run(gateway.clone(), &mut table, counter("empty.json", 100)).await;

        assert_eq!(summary.unresolved, 1);
        assert_eq!(summary.resolved, 1);
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_quota_stops_batch_early() {
        let mut table = table(&["Tokyo Tower", "Tokyo Station", "Shibuya"]);
        let (summary, events) = run(StubGateway::new(), &mut table, counter("quota.json", 1)).await;

        assert_eq!(summary.resolved, 1);
        assert_eq!(summary.unresolved, 2);
        assert!(table.rows()[0].coordinate.is_some());
        assert!(table.rows()[1].coordinate.is_none());
        assert!(events
            .iter()
            .any(|event| matches!(event, ProgressEvent::QuotaExhausted { completed: 1 })));
    }
}
