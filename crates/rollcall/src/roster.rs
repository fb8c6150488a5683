//! In-memory roster of participants and teams.
//!
//! The roster owns both collections in insertion order. Lookups are linear
//! scans; event rosters hold at most a few hundred entries.
//!
//! The mutators here change one side of a relationship at a time. Keeping
//! `Participant::team_id` and `Team::members` consistent is the job of
//! [`Tracker`](crate::workflow::Tracker).

use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::{Participant, ParticipantId, Skill, Team, TeamId};

/// Ordered participant and team collections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    participants: Vec<Participant>,
    teams: Vec<Team>,
}

/// Headline counts for the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    /// Registered participants.
    pub total: usize,
    /// Participants currently checked in.
    pub checked_in: usize,
    /// Participants affiliated with a team.
    pub assigned: usize,
    /// Teams.
    pub teams: usize,
}

impl Roster {
    /// Create an empty roster.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a roster from previously stored collections.
    #[must_use]
    pub fn from_parts(participants: Vec<Participant>, teams: Vec<Team>) -> Self {
        Self {
            participants,
            teams,
        }
    }

    /// All participants, in registration order.
    #[must_use]
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// All teams, in creation order.
    #[must_use]
    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    /// Find a participant by id.
    #[must_use]
    pub fn participant(&self, id: &ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| &p.id == id)
    }

    /// Find a participant by email, ignoring case.
    #[must_use]
    pub fn participant_by_email(&self, email: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.email_matches(email))
    }

    /// Find a team by id.
    #[must_use]
    pub fn team(&self, id: &TeamId) -> Option<&Team> {
        self.teams.iter().find(|t| &t.id == id)
    }

    /// Find a team by name, ignoring case.
    #[must_use]
    pub fn team_by_name(&self, name: &str) -> Option<&Team> {
        self.teams.iter().find(|t| t.name_matches(name))
    }

    /// Append a participant.
    pub fn insert_participant(&mut self, participant: Participant) {
        self.participants.push(participant);
    }

    /// Append several participants, preserving their order.
    pub fn insert_participants(&mut self, participants: impl IntoIterator<Item = Participant>) {
        self.participants.extend(participants);
    }

    /// Append a team.
    pub fn insert_team(&mut self, team: Team) {
        self.teams.push(team);
    }

    /// Set a participant's presence flag.
    ///
    /// # Errors
    ///
    /// Returns an error if the participant does not exist.
    pub fn set_checked_in(&mut self, id: &ParticipantId, checked_in: bool) -> Result<()> {
        self.participant_mut(id)?.checked_in = checked_in;
        Ok(())
    }

    /// Set or clear a participant's team reference.
    ///
    /// # Errors
    ///
    /// Returns an error if the participant does not exist.
    pub fn set_team(&mut self, id: &ParticipantId, team_id: Option<TeamId>) -> Result<()> {
        self.participant_mut(id)?.team_id = team_id;
        Ok(())
    }

    /// Append a participant id to a team's member list.
    ///
    /// # Errors
    ///
    /// Returns an error if the team does not exist.
    pub fn push_member(&mut self, team_id: &TeamId, member: ParticipantId) -> Result<()> {
        self.team_mut(team_id)?.members.push(member);
        Ok(())
    }

    /// Drop a participant id from a team's member list.
    ///
    /// Returns `true` if the id was listed.
    ///
    /// # Errors
    ///
    /// Returns an error if the team does not exist.
    pub fn pull_member(&mut self, team_id: &TeamId, member: &ParticipantId) -> Result<bool> {
        let team = self.team_mut(team_id)?;
        let before = team.members.len();
        team.members.retain(|id| id != member);
        Ok(team.members.len() != before)
    }

    /// Resolve a team's members in member order, skipping dangling ids.
    pub fn team_members<'a>(&'a self, team: &'a Team) -> impl Iterator<Item = &'a Participant> {
        team.members.iter().filter_map(|id| self.participant(id))
    }

    /// Headline counts.
    #[must_use]
    pub fn stats(&self) -> Stats {
        Stats {
            total: self.participants.len(),
            checked_in: self.participants.iter().filter(|p| p.checked_in).count(),
            assigned: self.participants.iter().filter(|p| p.is_assigned()).count(),
            teams: self.teams.len(),
        }
    }

    /// Participants whose name or email contains `query` (ignoring case),
    /// optionally restricted to one skill, sorted by name.
    #[must_use]
    pub fn search(&self, query: &str, skill: Option<Skill>) -> Vec<&Participant> {
        let query = query.to_lowercase();
        let mut found: Vec<&Participant> = self
            .participants
            .iter()
            .filter(|p| {
                p.name.to_lowercase().contains(&query) || p.email.to_lowercase().contains(&query)
            })
            .filter(|p| skill.map_or(true, |s| p.skill == s))
            .collect();
        found.sort_by_cached_key(|p| (p.name.to_lowercase(), p.name.clone()));
        found
    }

    /// Participants that can be assigned to a team right now.
    pub fn available_for_assignment(&self) -> impl Iterator<Item = &Participant> {
        self.participants
            .iter()
            .filter(|p| p.checked_in && !p.is_assigned())
    }

    /// Distinct skills, in the order they first appear.
    #[must_use]
    pub fn skills_present(&self) -> Vec<Skill> {
        let mut skills = Vec::new();
        for participant in &self.participants {
            if !skills.contains(&participant.skill) {
                skills.push(participant.skill);
            }
        }
        skills
    }

    fn participant_mut(&mut self, id: &ParticipantId) -> Result<&mut Participant> {
        self.participants
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| Error::participant_not_found(id.as_str()))
    }

    fn team_mut(&mut self, id: &TeamId) -> Result<&mut Team> {
        self.teams
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| Error::team_not_found(id.as_str()))
    }
}
