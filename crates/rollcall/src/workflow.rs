//! Check-in and team assignment workflow.
//!
//! [`Tracker`] owns the roster and the store it persists to. Every operation
//! checks its preconditions, applies its changes to a staged copy of the
//! roster, and rewrites the affected slots from that copy. The staged copy
//! replaces the live roster only once the writes succeed, so an operation
//! that returns an error leaves the roster as it was.
//!
//! Presence and affiliation are coupled: a participant must be checked in to
//! be assigned, and checking out always drops the team link.

use tracing::{debug, info, warn};

use crate::config::EventConfig;
use crate::error::{Error, Result};
use crate::ids::{Clock, IdGenerator, SystemClock, UuidIds};
use crate::model::{Participant, ParticipantId, Team, TeamId};
use crate::persist;
use crate::registration::RegistrationForm;
use crate::roster::Roster;
use crate::storage::KeyValueStore;
use crate::validation::EmailPolicy;

/// Roster plus the capabilities needed to change it.
#[derive(Debug)]
pub struct Tracker<S: KeyValueStore> {
    roster: Roster,
    store: S,
    policy: EmailPolicy,
    event: EventConfig,
    ids: Box<dyn IdGenerator>,
    clock: Box<dyn Clock>,
}

impl<S: KeyValueStore> Tracker<S> {
    /// Load the roster from `store`, using random ids and the system clock.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or the event
    /// configuration holds an invalid domain.
    pub fn open(store: S, event: EventConfig) -> Result<Self> {
        Self::with_capabilities(store, event, Box::new(UuidIds), Box::new(SystemClock))
    }

    /// Load the roster from `store` with explicit id and time sources.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or the event
    /// configuration holds an invalid domain.
    pub fn with_capabilities(
        store: S,
        event: EventConfig,
        ids: Box<dyn IdGenerator>,
        clock: Box<dyn Clock>,
    ) -> Result<Self> {
        let policy = EmailPolicy::new(&event.institution_domain)?;
        let roster = persist::load_roster(&store)?;
        Ok(Self {
            roster,
            store,
            policy,
            event,
            ids,
            clock,
        })
    }

    /// Current roster snapshot.
    #[must_use]
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// The backing store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The institutional email rule in force.
    #[must_use]
    pub fn policy(&self) -> &EmailPolicy {
        &self.policy
    }

    /// Start a registration form with this event's member limit.
    #[must_use]
    pub fn new_form(&self, team_name: impl Into<String>) -> RegistrationForm {
        RegistrationForm::new(team_name).with_member_limit(self.event.max_members)
    }

    /// Mark a participant present.
    ///
    /// Checking in someone already present changes nothing but still
    /// rewrites the participant slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the participant does not exist or the store
    /// write fails.
    pub fn check_in(&mut self, id: &ParticipantId) -> Result<&Participant> {
        let mut next = self.roster.clone();
        next.set_checked_in(id, true)?;
        self.commit(next, Slots::Participants)?;

        let participant = self.participant(id)?;
        info!("{} checked in", participant.name);
        Ok(participant)
    }

    /// Mark a participant absent and drop any team affiliation.
    ///
    /// # Errors
    ///
    /// Returns an error if the participant does not exist or a store write
    /// fails.
    pub fn check_out(&mut self, id: &ParticipantId) -> Result<&Participant> {
        let team_id = self.participant(id)?.team_id.clone();

        let mut next = self.roster.clone();
        next.set_checked_in(id, false)?;
        if let Some(team_id) = team_id {
            detach(&mut next, id, &team_id)?;
        }
        self.commit(next, Slots::Both)?;

        let participant = self.participant(id)?;
        info!("{} checked out", participant.name);
        Ok(participant)
    }

    /// Add a checked-in, unaffiliated participant to a team.
    ///
    /// # Errors
    ///
    /// Returns an error, without changing anything, if either id does not
    /// resolve, the participant is not checked in, or it already belongs to
    /// a team. Also returns an error if a store write fails.
    pub fn assign_to_team(&mut self, participant_id: &ParticipantId, team_id: &TeamId) -> Result<()> {
        let participant = self.participant(participant_id)?;
        let team = self
            .roster
            .team(team_id)
            .ok_or_else(|| Error::team_not_found(team_id.as_str()))?;

        if !participant.checked_in {
            return Err(Error::NotCheckedIn {
                name: participant.name.clone(),
            });
        }
        if participant.is_assigned() {
            return Err(Error::AlreadyAssigned {
                name: participant.name.clone(),
            });
        }
        info!("Assigning {} to team {}", participant.name, team.name);

        let mut next = self.roster.clone();
        next.push_member(team_id, participant_id.clone())?;
        next.set_team(participant_id, Some(team_id.clone()))?;
        self.commit(next, Slots::Both)
    }

    /// Detach a participant from its team.
    ///
    /// Returns `false`, without writing anything, when the participant has
    /// no team.
    ///
    /// # Errors
    ///
    /// Returns an error if the participant does not exist or a store write
    /// fails.
    pub fn remove_from_team(&mut self, participant_id: &ParticipantId) -> Result<bool> {
        let Some(team_id) = self.participant(participant_id)?.team_id.clone() else {
            debug!("{} has no team, nothing to remove", participant_id);
            return Ok(false);
        };

        let mut next = self.roster.clone();
        detach(&mut next, participant_id, &team_id)?;
        self.commit(next, Slots::Both)?;
        info!("Removed {} from team {}", participant_id, team_id);
        Ok(true)
    }

    /// Create an empty team.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed name is empty, collides with an
    /// existing team name (ignoring case), or the store write fails.
    pub fn create_team(&mut self, name: &str) -> Result<TeamId> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidTeamName);
        }
        if self.roster.team_by_name(name).is_some() {
            return Err(Error::DuplicateTeamName {
                name: name.to_string(),
            });
        }

        let id = self.ids.team_id();
        let mut next = self.roster.clone();
        next.insert_team(Team::new(id.clone(), name, self.clock.now()));
        self.commit(next, Slots::Teams)?;

        info!("Created team {} ({})", name, id);
        Ok(id)
    }

    /// Register a team and all its participants in one step.
    ///
    /// The new participants start checked out, already affiliated with the
    /// new team.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] with every failing field, and creates
    /// nothing, if the form is invalid. Also returns an error if a store
    /// write fails.
    pub fn register(&mut self, form: &RegistrationForm) -> Result<TeamId> {
        let registration = form.validate(&self.policy, &self.roster).map_err(|errors| {
            warn!("Registration rejected: {}", errors);
            Error::Validation(errors)
        })?;

        let team_id = self.ids.team_id();
        let mut team = Team::new(
            team_id.clone(),
            registration.team_name.clone(),
            self.clock.now(),
        );

        let mut participants = Vec::with_capacity(registration.entrants.len());
        for entrant in registration.entrants {
            let id = self.ids.participant_id();
            team.members.push(id.clone());
            participants.push(Participant {
                id,
                name: entrant.name,
                email: entrant.email,
                college: self.event.college.clone(),
                skill: entrant.skill,
                track: self.event.track.clone(),
                checked_in: false,
                team_id: Some(team_id.clone()),
                is_leader: entrant.is_leader,
            });
        }

        let count = participants.len();
        let mut next = self.roster.clone();
        next.insert_participants(participants);
        next.insert_team(team);
        self.commit(next, Slots::Both)?;

        info!(
            "Registered team {} with {} participants",
            registration.team_name, count
        );
        Ok(team_id)
    }

    fn participant(&self, id: &ParticipantId) -> Result<&Participant> {
        self.roster
            .participant(id)
            .ok_or_else(|| Error::participant_not_found(id.as_str()))
    }

    /// Write the staged roster, then make it the live one.
    fn commit(&mut self, next: Roster, slots: Slots) -> Result<()> {
        match slots {
            Slots::Participants => persist::save_participants(&mut self.store, &next)?,
            Slots::Teams => persist::save_teams(&mut self.store, &next)?,
            Slots::Both => persist::save_roster(&mut self.store, &next)?,
        }
        self.roster = next;
        Ok(())
    }
}

/// Which slots an operation rewrites.
#[derive(Debug, Clone, Copy)]
enum Slots {
    Participants,
    Teams,
    Both,
}

/// Clear both sides of a team link. A team that no longer exists still lets
/// the participant side be cleared.
fn detach(roster: &mut Roster, participant_id: &ParticipantId, team_id: &TeamId) -> Result<()> {
    if roster.team(team_id).is_some() {
        roster.pull_member(team_id, participant_id)?;
    } else {
        warn!(
            "{} referenced missing team {}, clearing link",
            participant_id, team_id
        );
    }
    roster.set_team(participant_id, None)
}
