//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::identify::ScanMode;
use crate::model::Skill;
use crate::registration::MemberEntry;

/// Register command arguments.
#[derive(Debug, Args)]
pub struct RegisterCommand {
    /// Name of the new team
    pub team_name: String,

    /// Group leader as "NAME,EMAIL,SKILL"
    #[arg(short, long, value_parser = parse_member, value_name = "NAME,EMAIL,SKILL")]
    pub leader: MemberEntry,

    /// Additional member as "NAME,EMAIL,SKILL" (repeatable, up to 3)
    #[arg(short, long = "member", value_parser = parse_member, value_name = "NAME,EMAIL,SKILL")]
    pub members: Vec<MemberEntry>,
}

/// Team commands.
#[derive(Debug, Subcommand)]
pub enum TeamCommand {
    /// Create an empty team
    Create {
        /// Team name
        name: String,
    },

    /// List teams with their members
    List {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Assign a checked-in participant to a team
    Assign {
        /// Participant email
        email: String,
        /// Team name or id
        team: String,
    },

    /// Remove a participant from their team
    Remove {
        /// Participant email
        email: String,
    },
}

/// Scan command arguments.
#[derive(Debug, Args)]
pub struct ScanCommand {
    /// What a scanned participant should be marked as
    #[arg(short, long, value_enum, default_value = "checkin")]
    pub mode: ModeArg,
}

/// Participant listing arguments.
#[derive(Debug, Args)]
pub struct ParticipantsCommand {
    /// Only show participants whose name or email contains this text
    #[arg(short, long)]
    pub search: Option<String>,

    /// Only show participants with this skill
    #[arg(short = 'k', long, value_enum)]
    pub skill: Option<SkillArg>,

    /// Only show checked-in participants without a team
    #[arg(short, long)]
    pub available: bool,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Stats command arguments.
#[derive(Debug, Args)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Export commands.
#[derive(Debug, Subcommand)]
pub enum ExportCommand {
    /// Export all participants as CSV
    Participants {
        /// Directory to write into (defaults to the configured export dir)
        #[arg(short, long, value_name = "DIR")]
        out: Option<PathBuf>,
    },

    /// Export all teams as CSV
    Teams {
        /// Directory to write into (defaults to the configured export dir)
        #[arg(short, long, value_name = "DIR")]
        out: Option<PathBuf>,
    },
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        file: Option<PathBuf>,
    },
}

/// Skill filter for CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SkillArg {
    /// Frontend development
    Frontend,
    /// Backend development
    Backend,
    /// Full stack development
    FullStack,
    /// Mobile development
    Mobile,
    /// Anything else
    Other,
}

impl From<SkillArg> for Skill {
    fn from(arg: SkillArg) -> Self {
        match arg {
            SkillArg::Frontend => Skill::Frontend,
            SkillArg::Backend => Skill::Backend,
            SkillArg::FullStack => Skill::FullStack,
            SkillArg::Mobile => Skill::MobileDevelopment,
            SkillArg::Other => Skill::Other,
        }
    }
}

/// Scan mode for CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Mark scanned participants present
    Checkin,
    /// Mark scanned participants absent
    Checkout,
}

impl From<ModeArg> for ScanMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Checkin => ScanMode::CheckIn,
            ModeArg::Checkout => ScanMode::CheckOut,
        }
    }
}

/// Parse "NAME,EMAIL,SKILL" into a form entry.
///
/// Name and email are kept as typed so the registration validator reports
/// blanks. A missing or empty skill is left unselected.
fn parse_member(value: &str) -> Result<MemberEntry, String> {
    let mut parts = value.splitn(3, ',');
    let name = parts.next().unwrap_or_default();
    let email = parts.next().unwrap_or_default();
    let skill = match parts.next().map(str::trim) {
        None | Some("") => None,
        Some(label) => Some(label.parse::<Skill>().map_err(|e| e.to_string())?),
    };
    Ok(MemberEntry::new(name, email, skill))
}
