//! Core roster types for rollcall.
//!
//! This module defines the participant and team records that the roster
//! stores, and the identifiers that link them.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque identifier of a participant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

/// Opaque identifier of a team.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(String);

impl ParticipantId {
    /// Wrap an identifier string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TeamId {
    /// Wrap an identifier string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A participant's primary skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Skill {
    /// Frontend development.
    Frontend,
    /// Backend development.
    Backend,
    /// Full stack development.
    #[serde(rename = "Full Stack")]
    FullStack,
    /// Mobile development.
    #[serde(rename = "Mobile Development")]
    MobileDevelopment,
    /// Anything else.
    Other,
}

impl Skill {
    /// All skills, in the order they are offered on the registration form.
    pub const ALL: [Skill; 5] = [
        Skill::Frontend,
        Skill::Backend,
        Skill::FullStack,
        Skill::MobileDevelopment,
        Skill::Other,
    ];

    /// Human-readable label, as shown on forms and in exports.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Frontend => "Frontend",
            Self::Backend => "Backend",
            Self::FullStack => "Full Stack",
            Self::MobileDevelopment => "Mobile Development",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when a skill label is not recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSkill(pub String);

impl fmt::Display for UnknownSkill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown skill: {}", self.0)
    }
}

impl std::error::Error for UnknownSkill {}

impl FromStr for Skill {
    type Err = UnknownSkill;

    /// Parses a label case-insensitively; spaces, dashes, and underscores
    /// are interchangeable.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize_label(s);
        Self::ALL
            .into_iter()
            .find(|skill| normalize_label(skill.label()) == wanted)
            .ok_or_else(|| UnknownSkill(s.to_string()))
    }
}

fn normalize_label(s: &str) -> String {
    s.trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Case-insensitive string equality used for emails and team names.
#[must_use]
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

/// An individual registrant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    /// Unique identifier.
    pub id: ParticipantId,
    /// Full name.
    pub name: String,
    /// Institutional email, unique across participants (case-insensitive).
    pub email: String,
    /// College, fixed per event.
    pub college: String,
    /// Primary skill.
    pub skill: Skill,
    /// Track, fixed per event.
    pub track: String,
    /// Whether the participant is currently present.
    pub checked_in: bool,
    /// Team the participant belongs to, if any.
    pub team_id: Option<TeamId>,
    /// Whether this participant registered the team.
    pub is_leader: bool,
}

impl Participant {
    /// Check whether this participant is affiliated with a team.
    #[must_use]
    pub fn is_assigned(&self) -> bool {
        self.team_id.is_some()
    }

    /// Check whether this participant's email matches, ignoring case.
    #[must_use]
    pub fn email_matches(&self, email: &str) -> bool {
        eq_ignore_case(&self.email, email)
    }

    /// Role label used in exports.
    #[must_use]
    pub fn role_label(&self) -> &'static str {
        if self.is_leader {
            "Team Leader"
        } else {
            "Member"
        }
    }
}

/// A named group of participants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    /// Unique identifier.
    pub id: TeamId,
    /// Team name, unique across teams (case-insensitive).
    pub name: String,
    /// Member ids in the order they joined.
    pub members: Vec<ParticipantId>,
    /// When the team was created.
    pub registered_at: DateTime<Utc>,
}

impl Team {
    /// Create an empty team.
    #[must_use]
    pub fn new(id: TeamId, name: impl Into<String>, registered_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: name.into(),
            members: Vec::new(),
            registered_at,
        }
    }

    /// Check whether the team lists the given participant.
    #[must_use]
    pub fn has_member(&self, id: &ParticipantId) -> bool {
        self.members.contains(id)
    }

    /// Check whether this team's name matches, ignoring case.
    #[must_use]
    pub fn name_matches(&self, name: &str) -> bool {
        eq_ignore_case(&self.name, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_participant() -> Participant {
        Participant {
            id: ParticipantId::new("participant_1"),
            name: "Asha Rao".to_string(),
            email: "asha@nmit.ac.in".to_string(),
            college: "NMIT".to_string(),
            skill: Skill::FullStack,
            track: "General".to_string(),
            checked_in: false,
            team_id: Some(TeamId::new("team_1")),
            is_leader: true,
        }
    }

    #[test]
    fn test_skill_labels() {
        assert_eq!(Skill::FullStack.to_string(), "Full Stack");
        assert_eq!(Skill::MobileDevelopment.label(), "Mobile Development");
    }

    #[test]
    fn test_skill_from_str() {
        assert_eq!("backend".parse::<Skill>(), Ok(Skill::Backend));
        assert_eq!("Full Stack".parse::<Skill>(), Ok(Skill::FullStack));
        assert_eq!("full-stack".parse::<Skill>(), Ok(Skill::FullStack));
        assert_eq!(
            "mobile_development".parse::<Skill>(),
            Ok(Skill::MobileDevelopment)
        );
        assert!("Design".parse::<Skill>().is_err());
    }

    #[test]
    fn test_skill_serializes_as_label() {
        let json = serde_json::to_string(&Skill::FullStack).unwrap();
        assert_eq!(json, "\"Full Stack\"");
    }

    #[test]
    fn test_participant_serializes_camel_case() {
        let json = serde_json::to_string(&sample_participant()).unwrap();
        assert!(json.contains("\"checkedIn\":false"));
        assert!(json.contains("\"teamId\":\"team_1\""));
        assert!(json.contains("\"isLeader\":true"));
    }

    #[test]
    fn test_unassigned_participant_serializes_null_team() {
        let mut participant = sample_participant();
        participant.team_id = None;
        let json = serde_json::to_string(&participant).unwrap();
        assert!(json.contains("\"teamId\":null"));
    }

    #[test]
    fn test_participant_email_matches_ignores_case() {
        let participant = sample_participant();
        assert!(participant.email_matches("ASHA@NMIT.AC.IN"));
        assert!(!participant.email_matches("asha@nmit.ac"));
    }

    #[test]
    fn test_role_label() {
        let mut participant = sample_participant();
        assert_eq!(participant.role_label(), "Team Leader");
        participant.is_leader = false;
        assert_eq!(participant.role_label(), "Member");
    }

    #[test]
    fn test_team_membership() {
        let mut team = Team::new(TeamId::new("team_1"), "Alpha", Utc::now());
        let id = ParticipantId::new("participant_1");
        assert!(!team.has_member(&id));

        team.members.push(id.clone());
        assert!(team.has_member(&id));
        assert!(team.name_matches("ALPHA"));
    }

    #[test]
    fn test_team_serializes_registered_at() {
        let team = Team::new(TeamId::new("team_1"), "Alpha", Utc::now());
        let json = serde_json::to_string(&team).unwrap();
        assert!(json.contains("registeredAt"));

        let back: Team = serde_json::from_str(&json).unwrap();
        assert_eq!(back, team);
    }
}
