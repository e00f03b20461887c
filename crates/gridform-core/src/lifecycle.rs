//! Commit outcomes and the error banners they leave behind.
//!
//! ## Learning: Failures as Values
//!
//! A save can fail in two ways the form cares about: the backend rejected
//! the record with a message meant for the user, or something else broke.
//! [`UpdateFailure`] makes that split a type, so the session matches on it
//! instead of guessing from an error string.

use async_trait::async_trait;
use indexmap::IndexMap;

/// A rejection the backend wants shown to the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainFailure {
    /// Machine-readable code, if any
    pub code: Option<String>,
    /// Human-readable message
    pub message: String,
    /// Messages for individual columns, by column name
    pub column_errors: IndexMap<String, String>,
}

impl DomainFailure {
    /// Creates a failure with only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    /// Sets the failure code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Adds a column message.
    pub fn with_column_error(mut self, column: impl Into<String>, message: impl Into<String>) -> Self {
        self.column_errors.insert(column.into(), message.into());
        self
    }

    /// Returns the banner text: `code - message`, or the message alone when
    /// there is no code.
    pub fn display_message(&self) -> String {
        match self.code.as_deref().map(str::trim) {
            Some(code) if !code.is_empty() => format!("{} - {}", code, self.message),
            _ => self.message.clone(),
        }
    }
}

/// Why saving a record failed.
#[derive(Debug, thiserror::Error)]
pub enum UpdateFailure {
    #[error("{}", .0.display_message())]
    Domain(DomainFailure),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<DomainFailure> for UpdateFailure {
    fn from(failure: DomainFailure) -> Self {
        UpdateFailure::Domain(failure)
    }
}

/// Saves records of type `R`.
#[async_trait]
pub trait Persistence<R: ?Sized + Sync>: Send + Sync {
    /// Persists the record.
    async fn update(&self, record: &R) -> Result<(), UpdateFailure>;
}

/// Error banners of the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorState {
    /// Record-level message; empty when there is none
    pub record: String,
    /// Column-level messages by column name
    pub columns: IndexMap<String, String>,
}

impl ErrorState {
    /// Builds the banners for a domain failure.
    pub fn from_domain(failure: &DomainFailure) -> Self {
        Self {
            record: failure.display_message(),
            columns: failure.column_errors.clone(),
        }
    }

    /// Builds a record-level banner with a fixed message.
    pub fn generic(message: impl Into<String>) -> Self {
        Self {
            record: message.into(),
            columns: IndexMap::new(),
        }
    }

    /// Removes every message.
    pub fn clear(&mut self) {
        self.record.clear();
        self.columns.clear();
    }

    /// Returns true if there is nothing to show.
    pub fn is_empty(&self) -> bool {
        self.record.is_empty() && self.columns.is_empty()
    }

    /// Returns the message for a column.
    pub fn column(&self, name: &str) -> Option<&str> {
        self.columns.get(name).map(String::as_str)
    }
}

/// Whether a commit is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommitState {
    #[default]
    Idle,
    Committing,
}

/// Identifies one commit attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommitTicket(pub(crate) u64);

impl CommitTicket {
    /// Returns the attempt number, starting at 1.
    pub fn number(&self) -> u64 {
        self.0
    }
}

/// How a commit ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The record was saved
    Saved,
    /// Saving failed; carries the record-level banner
    Rejected(String),
}

impl CommitOutcome {
    /// Returns true if the record was saved.
    pub fn is_saved(&self) -> bool {
        matches!(self, CommitOutcome::Saved)
    }
}
