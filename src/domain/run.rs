use serde::{Deserialize, Serialize};

/// Observational events emitted while a batch is running. They carry no
/// control-flow meaning; dropping the receiver does not stop the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase", tag = "kind")]
pub enum ProgressEvent {
    Started { total_rows: usize },
    RowProcessed { index: usize, resolved: bool },
    QuotaExhausted { completed: usize },
}

/// Final tally of one batch run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub total: usize,
    pub resolved: usize,
    pub unresolved: usize,
    pub requests_used: u32,
}
