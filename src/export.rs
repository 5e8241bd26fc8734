//! Export status tracking for datasheet downloads
//!
//! The status is a transient flag for display: it moves to `InProgress`
//! when an export starts and to `Completed` or `Failed` when it ends, then
//! falls back to `Idle` after the configured delay.

use crate::client::{ClientError, DatasheetFormat};
use crate::config::ExportConfig;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub enum ExportStatus {
    Idle,
    InProgress {
        format: DatasheetFormat,
    },
    Completed {
        filename: String,
    },
    Failed {
        message: String,
        remediation: Option<String>,
    },
}

impl ExportStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ExportStatus::Completed { .. } | ExportStatus::Failed { .. })
    }
}

impl std::fmt::Display for ExportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportStatus::Idle => write!(f, "idle"),
            ExportStatus::InProgress { format } => write!(f, "exporting {}", format),
            ExportStatus::Completed { filename } => write!(f, "saved {}", filename),
            ExportStatus::Failed {
                message,
                remediation,
            } => {
                write!(f, "export failed: {}", message)?;
                if let Some(r) = remediation {
                    write!(f, "\n  {}", r)?;
                }
                Ok(())
            }
        }
    }
}

/// Publishes export status on a watch channel.
///
/// Must be used inside a tokio runtime; terminal states schedule their own
/// reset to `Idle`.
#[derive(Clone)]
pub struct ExportTracker {
    tx: Arc<watch::Sender<ExportStatus>>,
    clear_after: Duration,
    /// Bumped on every transition so a stale reset never clobbers a newer status
    epoch: Arc<AtomicU64>,
}

impl ExportTracker {
    pub fn new(config: &ExportConfig) -> Self {
        let (tx, _rx) = watch::channel(ExportStatus::Idle);
        Self {
            tx: Arc::new(tx),
            clear_after: Duration::from_secs(config.status_clear_secs),
            epoch: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ExportStatus> {
        self.tx.subscribe()
    }

    pub fn status(&self) -> ExportStatus {
        self.tx.borrow().clone()
    }

    pub fn start(&self, format: DatasheetFormat) {
        self.transition(ExportStatus::InProgress { format });
    }

    pub fn complete(&self, filename: impl Into<String>) {
        self.transition(ExportStatus::Completed {
            filename: filename.into(),
        });
    }

    pub fn fail(&self, error: &ClientError) {
        self.transition(ExportStatus::Failed {
            message: error.to_string(),
            remediation: error.remediation().map(str::to_string),
        });
    }

    fn transition(&self, status: ExportStatus) {
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        let terminal = status.is_terminal();
        debug!(status = %status, "Export status");
        self.tx.send_replace(status);

        if terminal {
            let tx = Arc::clone(&self.tx);
            let current = Arc::clone(&self.epoch);
            let delay = self.clear_after;
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                if current.load(Ordering::SeqCst) == epoch {
                    tx.send_replace(ExportStatus::Idle);
                }
            });
        }
    }
}
