//! Command-line interface for rollcall.
//!
//! This module provides the CLI structure for the `rollcall` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ConfigCommand, ExportCommand, ModeArg, ParticipantsCommand, RegisterCommand, ScanCommand,
    SkillArg, StatsCommand, TeamCommand,
};

/// rollcall - Event registration and check-in tracker
///
/// Registers teams, checks participants in and out by email or scanned code,
/// assigns checked-in participants to teams, and exports rosters as CSV.
#[derive(Debug, Parser)]
#[command(name = "rollcall")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Register a team with its leader and members
    Register(RegisterCommand),

    /// Create, list, and staff teams
    #[command(subcommand)]
    Team(TeamCommand),

    /// Check a participant in by email
    Checkin {
        /// Participant email
        email: String,
    },

    /// Check a participant out by email
    Checkout {
        /// Participant email
        email: String,
    },

    /// Read one scanned code from standard input
    Scan(ScanCommand),

    /// List participants
    Participants(ParticipantsCommand),

    /// Show registration and attendance counts
    Stats(StatsCommand),

    /// Export rosters as CSV
    #[command(subcommand)]
    Export(ExportCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}
