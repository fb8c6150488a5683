//! Team registration form.
//!
//! A registration names a team, a leader, and up to three additional
//! members. The form is validated as a whole; any failure rejects the entire
//! submission and reports every failing field.

use std::fmt;

use crate::error::{Error, Result};
use crate::model::Skill;
use crate::roster::Roster;
use crate::validation::{is_duplicate_email, EmailPolicy};

/// Upper bound on additional members per registration.
pub const MAX_ADDITIONAL_MEMBERS: usize = 3;

/// One slot of the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormSlot {
    /// The team leader.
    Leader,
    /// An additional member, by zero-based position.
    Member(usize),
}

/// A field that can carry a validation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    /// The team name.
    TeamName,
    /// The leader's name.
    LeaderName,
    /// The leader's email.
    LeaderEmail,
    /// The leader's skill.
    LeaderSkill,
    /// A member's name.
    MemberName(usize),
    /// A member's email.
    MemberEmail(usize),
    /// A member's skill.
    MemberSkill(usize),
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TeamName => write!(f, "teamName"),
            Self::LeaderName => write!(f, "leaderName"),
            Self::LeaderEmail => write!(f, "leaderEmail"),
            Self::LeaderSkill => write!(f, "leaderSkill"),
            Self::MemberName(i) => write!(f, "member{i}Name"),
            Self::MemberEmail(i) => write!(f, "member{i}Email"),
            Self::MemberSkill(i) => write!(f, "member{i}Skill"),
        }
    }
}

/// Validation messages keyed by field, in the order they were found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    entries: Vec<(FormField, String)>,
}

impl FieldErrors {
    /// Record a message for a field, replacing any earlier one.
    pub fn insert(&mut self, field: FormField, message: impl Into<String>) {
        let message = message.into();
        match self.entries.iter_mut().find(|(f, _)| *f == field) {
            Some(entry) => entry.1 = message,
            None => self.entries.push((field, message)),
        }
    }

    /// The message for a field, if any.
    #[must_use]
    pub fn get(&self, field: FormField) -> Option<&str> {
        self.entries
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, m)| m.as_str())
    }

    /// Check whether no field failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of failing fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterate over failing fields and their messages.
    pub fn iter(&self) -> impl Iterator<Item = (FormField, &str)> {
        self.entries.iter().map(|(f, m)| (*f, m.as_str()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, message)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
        }
        Ok(())
    }
}

/// Name, email, and skill as typed into one slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberEntry {
    /// Full name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Selected skill, if any.
    pub skill: Option<Skill>,
}

impl MemberEntry {
    /// Create an entry.
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>, skill: Option<Skill>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            skill,
        }
    }
}

/// An in-progress registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationForm {
    /// Requested team name.
    pub team_name: String,
    /// The team leader.
    pub leader: MemberEntry,
    members: Vec<MemberEntry>,
    max_members: usize,
}

/// A participant-to-be from a validated form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entrant {
    /// Trimmed name.
    pub name: String,
    /// Trimmed email.
    pub email: String,
    /// Selected skill.
    pub skill: Skill,
    /// Whether this entrant is the leader.
    pub is_leader: bool,
}

/// A form that passed validation, ready to be written to the roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRegistration {
    /// Trimmed team name.
    pub team_name: String,
    /// Leader first, then members in slot order.
    pub entrants: Vec<Entrant>,
}

impl RegistrationForm {
    /// Start a form for the given team name, allowing the default number of
    /// additional members.
    #[must_use]
    pub fn new(team_name: impl Into<String>) -> Self {
        Self {
            team_name: team_name.into(),
            leader: MemberEntry::default(),
            members: Vec::new(),
            max_members: MAX_ADDITIONAL_MEMBERS,
        }
    }

    /// Restrict the number of additional members (capped at
    /// [`MAX_ADDITIONAL_MEMBERS`]).
    #[must_use]
    pub fn with_member_limit(mut self, limit: usize) -> Self {
        self.max_members = limit.min(MAX_ADDITIONAL_MEMBERS);
        self
    }

    /// Maximum number of additional members.
    #[must_use]
    pub fn member_limit(&self) -> usize {
        self.max_members
    }

    /// Additional members, in slot order.
    #[must_use]
    pub fn members(&self) -> &[MemberEntry] {
        &self.members
    }

    /// Mutable access to one member slot.
    pub fn member_mut(&mut self, index: usize) -> Option<&mut MemberEntry> {
        self.members.get_mut(index)
    }

    /// Check whether another member slot can be added.
    #[must_use]
    pub fn can_add_member(&self) -> bool {
        self.members.len() < self.max_members
    }

    /// Append a member slot, returning its index.
    ///
    /// # Errors
    ///
    /// Returns an error if the form already holds the maximum number of
    /// additional members.
    pub fn add_member(&mut self, entry: MemberEntry) -> Result<usize> {
        if !self.can_add_member() {
            return Err(Error::TooManyMembers {
                max: self.max_members,
            });
        }
        self.members.push(entry);
        Ok(self.members.len() - 1)
    }

    /// Remove a member slot. Later slots shift down by one.
    pub fn remove_member(&mut self, index: usize) -> Option<MemberEntry> {
        (index < self.members.len()).then(|| self.members.remove(index))
    }

    /// Every slot, leader first.
    pub fn slots(&self) -> impl Iterator<Item = (FormSlot, &MemberEntry)> {
        std::iter::once((FormSlot::Leader, &self.leader)).chain(
            self.members
                .iter()
                .enumerate()
                .map(|(i, entry)| (FormSlot::Member(i), entry)),
        )
    }

    /// Validate the whole form against the policy and the stored roster.
    ///
    /// # Errors
    ///
    /// Returns every failing field if any check fails.
    pub fn validate(
        &self,
        policy: &EmailPolicy,
        roster: &Roster,
    ) -> std::result::Result<ValidatedRegistration, FieldErrors> {
        let mut errors = FieldErrors::default();

        let team_name = self.team_name.trim();
        if team_name.is_empty() {
            errors.insert(FormField::TeamName, "Team name is required");
        } else if roster.team_by_name(team_name).is_some() {
            errors.insert(FormField::TeamName, "Team name already exists");
        }

        let mut entrants = Vec::with_capacity(self.members.len() + 1);
        for (slot, entry) in self.slots() {
            if let Some(entrant) = self.validate_slot(slot, entry, policy, roster, &mut errors) {
                entrants.push(entrant);
            }
        }

        if errors.is_empty() {
            Ok(ValidatedRegistration {
                team_name: team_name.to_string(),
                entrants,
            })
        } else {
            Err(errors)
        }
    }

    fn validate_slot(
        &self,
        slot: FormSlot,
        entry: &MemberEntry,
        policy: &EmailPolicy,
        roster: &Roster,
        errors: &mut FieldErrors,
    ) -> Option<Entrant> {
        let (name_field, email_field, skill_field) = match slot {
            FormSlot::Leader => (
                FormField::LeaderName,
                FormField::LeaderEmail,
                FormField::LeaderSkill,
            ),
            FormSlot::Member(i) => (
                FormField::MemberName(i),
                FormField::MemberEmail(i),
                FormField::MemberSkill(i),
            ),
        };
        let is_leader = slot == FormSlot::Leader;

        let name = entry.name.trim();
        if name.is_empty() {
            let message = if is_leader {
                "Group leader name is required"
            } else {
                "Member name is required"
            };
            errors.insert(name_field, message);
        }

        let email = entry.email.trim();
        if email.is_empty() {
            let message = if is_leader {
                "Group leader email is required"
            } else {
                "Member email is required"
            };
            errors.insert(email_field, message);
        } else if !policy.is_institutional_email(email) {
            errors.insert(email_field, policy.domain_message());
        } else if is_duplicate_email(email, self, slot, roster) {
            let message = if is_leader {
                "This email is already registered"
            } else {
                "This email is already registered or duplicated"
            };
            errors.insert(email_field, message);
        }

        if entry.skill.is_none() {
            errors.insert(skill_field, "Please select a primary skill");
        }

        let skill = entry.skill?;
        (!name.is_empty() && !email.is_empty()).then(|| Entrant {
            name: name.to_string(),
            email: email.to_string(),
            skill,
            is_leader,
        })
    }
}
