//! Identifier and clock capabilities.
//!
//! The tracker never reads the wall clock or invents identifiers itself; it
//! asks an injected [`IdGenerator`] and [`Clock`], so tests can supply
//! deterministic values.

use std::fmt::Debug;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::model::{ParticipantId, TeamId};

/// Source of fresh participant and team identifiers.
pub trait IdGenerator: Debug {
    /// Produce a team id that has never been returned before.
    fn team_id(&mut self) -> TeamId;

    /// Produce a participant id that has never been returned before.
    fn participant_id(&mut self) -> ParticipantId;
}

/// Random identifiers backed by UUID v4.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn team_id(&mut self) -> TeamId {
        TeamId::new(format!("team_{}", Uuid::new_v4().simple()))
    }

    fn participant_id(&mut self) -> ParticipantId {
        ParticipantId::new(format!("participant_{}", Uuid::new_v4().simple()))
    }
}

/// Monotonic counter identifiers (`team_1`, `participant_2`, ...).
///
/// Teams and participants share one counter.
#[derive(Debug, Clone, Default)]
pub struct SequentialIds {
    next: u64,
}

impl SequentialIds {
    /// Start counting from 1.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn bump(&mut self) -> u64 {
        self.next += 1;
        self.next
    }
}

impl IdGenerator for SequentialIds {
    fn team_id(&mut self) -> TeamId {
        TeamId::new(format!("team_{}", self.bump()))
    }

    fn participant_id(&mut self) -> ParticipantId {
        ParticipantId::new(format!("participant_{}", self.bump()))
    }
}

/// Source of the current time.
pub trait Clock: Debug {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
