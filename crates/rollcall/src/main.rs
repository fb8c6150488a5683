//! `rollcall` - CLI for the event registration and check-in tracker
//!
//! This binary provides the command-line interface for registering teams,
//! checking participants in and out, and exporting rosters.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;

use rollcall::cli::{
    Cli, Command, ConfigCommand, ExportCommand, ParticipantsCommand, RegisterCommand, TeamCommand,
};
use rollcall::export::{self, DirectorySink};
use rollcall::identify::{self, Identification, LineScanner, ScanMode};
use rollcall::model::{ParticipantId, Skill, TeamId};
use rollcall::{init_logging, Config, Error, Participant, SqliteStore, Tracker};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;

    // Config commands do not need the database
    let command = match cli.command {
        Command::Config(config_cmd) => return handle_config(&config, config_cmd),
        other => other,
    };

    let store = SqliteStore::open(config.database_path())?;
    let mut tracker = Tracker::open(store, config.event.clone())?;

    match command {
        Command::Register(cmd) => handle_register(&mut tracker, cmd),
        Command::Team(cmd) => handle_team(&mut tracker, cmd),
        Command::Checkin { email } => handle_identify(&mut tracker, ScanMode::CheckIn, &email),
        Command::Checkout { email } => handle_identify(&mut tracker, ScanMode::CheckOut, &email),
        Command::Scan(cmd) => handle_scan(&mut tracker, &config, cmd.mode.into()),
        Command::Participants(cmd) => handle_participants(&tracker, &cmd),
        Command::Stats(cmd) => handle_stats(&tracker, cmd.json),
        Command::Export(cmd) => handle_export(&tracker, &config, cmd),
        Command::Config(_) => Ok(()),
    }
}

type CliTracker = Tracker<SqliteStore>;

fn handle_register(tracker: &mut CliTracker, cmd: RegisterCommand) -> Result<()> {
    let mut form = tracker.new_form(cmd.team_name);
    form.leader = cmd.leader;
    for member in cmd.members {
        form.add_member(member)?;
    }

    match tracker.register(&form) {
        Ok(team_id) => {
            let team = tracker
                .roster()
                .team(&team_id)
                .ok_or_else(|| Error::team_not_found(team_id.as_str()))?;
            println!(
                "Team \"{}\" registered with {} participant(s).",
                team.name,
                team.members.len()
            );
            Ok(())
        }
        Err(err) => {
            if let Some(fields) = err.field_errors() {
                for (field, message) in fields.iter() {
                    eprintln!("  {field}: {message}");
                }
            }
            Err(err.into())
        }
    }
}

fn handle_team(tracker: &mut CliTracker, cmd: TeamCommand) -> Result<()> {
    match cmd {
        TeamCommand::Create { name } => {
            let id = tracker.create_team(&name)?;
            println!("Team \"{}\" created ({id}).", name.trim());
        }
        TeamCommand::List { json } => {
            let roster = tracker.roster();
            if json {
                println!("{}", serde_json::to_string_pretty(roster.teams())?);
            } else if roster.teams().is_empty() {
                println!("No teams registered yet.");
            } else {
                for team in roster.teams() {
                    println!("{} ({} members)", team.name, team.members.len());
                    for member in roster.team_members(team) {
                        println!(
                            "  - {} <{}> {}{}",
                            member.name,
                            member.email,
                            member.skill,
                            if member.is_leader { " [leader]" } else { "" }
                        );
                    }
                }
            }
        }
        TeamCommand::Assign { email, team } => {
            let participant_id = participant_id(tracker, &email)?;
            let team_id = team_id(tracker, &team)?;
            tracker.assign_to_team(&participant_id, &team_id)?;
            println!("Assigned {} to {}.", email.trim(), team.trim());
        }
        TeamCommand::Remove { email } => {
            let participant_id = participant_id(tracker, &email)?;
            if tracker.remove_from_team(&participant_id)? {
                println!("Removed {} from their team.", email.trim());
            } else {
                println!("{} is not on a team.", email.trim());
            }
        }
    }
    Ok(())
}

fn handle_identify(tracker: &mut CliTracker, mode: ScanMode, email: &str) -> Result<()> {
    let outcome = identify::manual_entry(tracker, mode, email)?;
    print_identification(&outcome);
    Ok(())
}

fn handle_scan(tracker: &mut CliTracker, config: &Config, mode: ScanMode) -> Result<()> {
    eprintln!("Waiting for a scanned code ({mode})...");
    let mut scanner = LineScanner::new(io::stdin().lock());
    let outcome = identify::scan_and_identify(tracker, &mut scanner, config.scan_settings(), mode)?;
    print_identification(&outcome);
    Ok(())
}

fn print_identification(outcome: &Identification) {
    if outcome.is_warning() {
        println!("Warning: {outcome}");
    } else {
        println!("{outcome}");
    }
}

fn handle_participants(tracker: &CliTracker, cmd: &ParticipantsCommand) -> Result<()> {
    let roster = tracker.roster();
    let query = cmd.search.as_deref().unwrap_or_default();
    let available: Vec<&ParticipantId> = roster.available_for_assignment().map(|p| &p.id).collect();
    let found: Vec<&Participant> = roster
        .search(query, cmd.skill.map(Into::into))
        .into_iter()
        .filter(|p| !cmd.available || available.contains(&&p.id))
        .collect();

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&found)?);
        return Ok(());
    }

    if found.is_empty() {
        println!("No participants found.");
        return Ok(());
    }

    println!(
        "{:<24} {:<32} {:<20} {:<8} Team",
        "Name", "Email", "Skill", "Status"
    );
    for participant in found {
        let team = participant
            .team_id
            .as_ref()
            .and_then(|id| roster.team(id))
            .map_or("Not Assigned", |t| t.name.as_str());
        println!(
            "{:<24} {:<32} {:<20} {:<8} {}",
            participant.name,
            participant.email,
            participant.skill.label(),
            if participant.checked_in { "In" } else { "Out" },
            team
        );
    }

    let skills: Vec<&str> = roster.skills_present().into_iter().map(Skill::label).collect();
    println!();
    println!("Skills registered: {}", skills.join(", "));
    Ok(())
}

fn handle_stats(tracker: &CliTracker, json: bool) -> Result<()> {
    let stats = tracker.roster().stats();
    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("rollcall stats");
        println!("--------------");
        println!("Participants:  {}", stats.total);
        println!("Checked in:    {}", stats.checked_in);
        println!("Assigned:      {}", stats.assigned);
        println!("Teams:         {}", stats.teams);
        println!("Database:      {}", tracker.store().path().display());
    }
    Ok(())
}

fn handle_export(tracker: &CliTracker, config: &Config, cmd: ExportCommand) -> Result<()> {
    let today = Local::now().date_naive();
    let filename = match cmd {
        ExportCommand::Participants { out } => {
            let mut sink = DirectorySink::new(out.unwrap_or_else(|| config.export_dir()));
            export::export_participants(tracker.roster(), &mut sink, today)?
        }
        ExportCommand::Teams { out } => {
            let mut sink = DirectorySink::new(out.unwrap_or_else(|| config.export_dir()));
            export::export_teams(tracker.roster(), &mut sink, today)?
        }
    };
    println!("Exported {filename}");
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Event]");
                println!("  Email domain:       @{}", config.event.institution_domain);
                println!("  College:            {}", config.event.college);
                println!("  Track:              {}", config.event.track);
                println!("  Max members:        {}", config.event.max_members);
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!();
                println!("[Scanner]");
                println!("  FPS:                {}", config.scanner.fps);
                println!("  Box size:           {}", config.scanner.box_size);
                println!();
                println!("[Export]");
                println!("  Output dir:         {}", config.export_dir().display());
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}

fn participant_id(tracker: &CliTracker, email: &str) -> Result<ParticipantId> {
    let email = email.trim();
    let participant = tracker
        .roster()
        .participant_by_email(email)
        .ok_or_else(|| Error::participant_not_found(email))?;
    Ok(participant.id.clone())
}

fn team_id(tracker: &CliTracker, key: &str) -> Result<TeamId> {
    let key = key.trim();
    let roster = tracker.roster();
    let team = roster
        .team_by_name(key)
        .or_else(|| roster.team(&TeamId::new(key)))
        .ok_or_else(|| Error::team_not_found(key))?;
    Ok(team.id.clone())
}
