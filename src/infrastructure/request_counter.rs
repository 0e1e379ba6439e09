use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::domain::error::{AppError, Result};

#[derive(Debug, Serialize, Deserialize)]
struct CounterState {
    month: String,
    count: u32,
}

/// Counts geocoding requests issued during the current calendar month,
/// persisted across runs in a small JSON state file. A missing, corrupt or
/// stale (previous month) file resets the count to zero.
pub struct RequestCounter {
    path: PathBuf,
    limit: u32,
    state: CounterState,
}

impl RequestCounter {
    pub fn load(path: &Path, limit: u32) -> Self {
        let month = current_month();
        let state = fs::read_to_string(path)
            .ok()
            .and_then(|content| serde_json::from_str::<CounterState>(&content).ok())
            .filter(|state| state.month == month)
            .unwrap_or(CounterState { month, count: 0 });

        Self {
            path: path.to_path_buf(),
            limit,
            state,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.state.count >= self.limit
    }

    pub fn used(&self) -> u32 {
        self.state.count
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Count one issued request and persist immediately, so an aborted run
    /// never forgets requests that already reached the service.
    pub fn record(&mut self) -> Result<()> {
        self.state.count += 1;
        let content = serde_json::to_string(&self.state)
            .map_err(|e| AppError::Internal(format!("failed to serialize request counter: {}", e)))?;
        fs::write(&self.path, content).map_err(|e| {
            AppError::IoError(format!(
                "failed to persist request counter {}: {}",
                self.path.display(),
                e
            ))
        })
    }
}

fn current_month() -> String {
    Local::now().format("%Y-%m").to_string()
}
