use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

pub mod email;
pub mod message;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("invalid mail address '{input}': {source}")]
    Address {
        input: String,
        #[source]
        source: lettre::address::AddressError,
    },
    #[error("failed to build mail: {0}")]
    Build(#[from] lettre::error::Error),
    #[error("smtp delivery failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// Outcome of a run worth telling the operator about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success { date: NaiveDate, summary_count: usize },
    Empty { date: NaiveDate, reason: String },
    Failure { date: NaiveDate, error: String },
}

impl Notice {
    pub fn date(&self) -> NaiveDate {
        match self {
            Notice::Success { date, .. } | Notice::Empty { date, .. } | Notice::Failure { date, .. } => *date,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Notice::Success { .. } => "success",
            Notice::Empty { .. } => "empty",
            Notice::Failure { .. } => "failure",
        }
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notice: &Notice) -> Result<(), NotifyError>;
}

/// Best-effort delivery: errors are logged, never returned. `true` when a notice went out.
pub async fn deliver(notifier: Option<&dyn Notifier>, notice: &Notice) -> bool {
    let Some(n) = notifier else {
        tracing::debug!(kind = notice.kind(), "no notifier configured, skipping");
        return false;
    };
    match n.send(notice).await {
        Ok(()) => {
            tracing::info!(kind = notice.kind(), date = %notice.date(), "notification sent");
            true
        }
        Err(err) => {
            tracing::warn!(kind = notice.kind(), error = %err, "notification failed");
            false
        }
    }
}
