//! Error types for rollcall.
//!
//! This module defines all error types used throughout the rollcall crate.
//! Every failure is non-fatal: an operation that returns an error has not
//! mutated the roster.

use std::path::PathBuf;
use thiserror::Error;

use crate::registration::FieldErrors;

/// The main error type for rollcall operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Validation Errors ===
    /// A registration submission failed validation.
    #[error("registration rejected: {0}")]
    Validation(FieldErrors),

    /// A team name was empty after trimming.
    #[error("Team name cannot be empty")]
    InvalidTeamName,

    /// A team name collides with an existing team.
    #[error("Team name already exists: {name}")]
    DuplicateTeamName {
        /// The rejected name.
        name: String,
    },

    /// The registration form already holds the maximum number of members.
    #[error("Maximum {max} additional members allowed")]
    TooManyMembers {
        /// The member limit.
        max: usize,
    },

    /// Manual identification input was empty.
    #[error("Please enter an email address")]
    EmptyInput,

    // === Lookup Errors ===
    /// No participant matches the given id or email.
    #[error("Participant not found: {key}")]
    ParticipantNotFound {
        /// The id or email that failed to resolve.
        key: String,
    },

    /// No team matches the given id or name.
    #[error("Team not found: {key}")]
    TeamNotFound {
        /// The id or name that failed to resolve.
        key: String,
    },

    // === Precondition Errors ===
    /// The participant must be checked in for this operation.
    #[error("{name} must be checked in before assignment")]
    NotCheckedIn {
        /// Participant name.
        name: String,
    },

    /// The participant already belongs to a team.
    #[error("{name} is already assigned to a team")]
    AlreadyAssigned {
        /// Participant name.
        name: String,
    },

    /// There is nothing to export.
    #[error("No {what} to export")]
    NothingToExport {
        /// Which collection was empty.
        what: &'static str,
    },

    // === External Component Errors ===
    /// The scan input device could not be started.
    #[error("Unable to access camera. Please use manual entry. ({message})")]
    ScannerUnavailable {
        /// Description of what went wrong.
        message: String,
    },

    /// The scanner ended without producing a decoded value.
    #[error("scan session ended without a decoded value")]
    ScanAborted,

    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to bring the slot table schema up to date.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV serialization failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// A specialized Result type for rollcall operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a participant lookup error.
    #[must_use]
    pub fn participant_not_found(key: impl Into<String>) -> Self {
        Self::ParticipantNotFound { key: key.into() }
    }

    /// Create a team lookup error.
    #[must_use]
    pub fn team_not_found(key: impl Into<String>) -> Self {
        Self::TeamNotFound { key: key.into() }
    }

    /// Create a scanner start error.
    #[must_use]
    pub fn scanner_unavailable(message: impl Into<String>) -> Self {
        Self::ScannerUnavailable {
            message: message.into(),
        }
    }

    /// Check if this error is a user input validation failure.
    #[must_use]
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::InvalidTeamName
                | Self::DuplicateTeamName { .. }
                | Self::TooManyMembers { .. }
                | Self::EmptyInput
        )
    }

    /// Check if this error is a failed id, email, or name lookup.
    #[must_use]
    pub fn is_lookup_error(&self) -> bool {
        matches!(
            self,
            Self::ParticipantNotFound { .. } | Self::TeamNotFound { .. }
        )
    }

    /// Check if this error is a state precondition failure.
    #[must_use]
    pub fn is_precondition_error(&self) -> bool {
        matches!(
            self,
            Self::NotCheckedIn { .. } | Self::AlreadyAssigned { .. } | Self::NothingToExport { .. }
        )
    }

    /// Per-field errors, when this is a registration validation failure.
    #[must_use]
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}
