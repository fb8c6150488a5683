//! `rollcall` - Event registration and check-in tracker
//!
//! This library provides team registration, participant check-in and
//! check-out, team assignment, and roster export, with all state persisted
//! to a key-value store.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod identify;
pub mod ids;
pub mod logging;
pub mod model;
pub mod persist;
pub mod registration;
pub mod roster;
pub mod storage;
pub mod validation;
pub mod workflow;

pub use config::Config;
pub use error::{Error, Result};
pub use identify::{Identification, ScanMode};
pub use logging::init_logging;
pub use model::{Participant, ParticipantId, Skill, Team, TeamId};
pub use registration::{MemberEntry, RegistrationForm};
pub use roster::{Roster, Stats};
pub use storage::{KeyValueStore, MemoryStore, SqliteStore};
pub use workflow::Tracker;
