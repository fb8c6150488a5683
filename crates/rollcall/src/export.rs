//! Tabular export of the roster.
//!
//! Rows are flat projections of the roster, serialized as CSV with every field
//! quoted. Files are handed to an [`ExportSink`] under a dated filename.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate, TimeZone};
use serde::Serialize;
use tracing::info;

use crate::error::{Error, Result};
use crate::roster::Roster;

/// Timestamp layout for the team export.
const REGISTERED_AT_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

/// One line of the participant export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParticipantRow {
    /// Participant name.
    #[serde(rename = "Name")]
    pub name: String,
    /// Participant email.
    #[serde(rename = "Email")]
    pub email: String,
    /// College.
    #[serde(rename = "College")]
    pub college: String,
    /// Skill label.
    #[serde(rename = "Skill")]
    pub skill: String,
    /// Track.
    #[serde(rename = "Track")]
    pub track: String,
    /// `Yes` or `No`.
    #[serde(rename = "Checked In")]
    pub checked_in: String,
    /// Team name, or `Not Assigned`.
    #[serde(rename = "Team")]
    pub team: String,
    /// `Team Leader` or `Member`.
    #[serde(rename = "Role")]
    pub role: String,
}

/// One line of the team export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamRow {
    /// Team name.
    #[serde(rename = "Team Name")]
    pub name: String,
    /// Number of members that resolve to a participant.
    #[serde(rename = "Members Count")]
    pub members_count: usize,
    /// Member names joined with `; `.
    #[serde(rename = "Member Names")]
    pub member_names: String,
    /// Member emails joined with `; `.
    #[serde(rename = "Member Emails")]
    pub member_emails: String,
    /// Human-readable registration time.
    #[serde(rename = "Registered At")]
    pub registered_at: String,
}

/// Project every participant, in roster order.
#[must_use]
pub fn participant_rows(roster: &Roster) -> Vec<ParticipantRow> {
    roster
        .participants()
        .iter()
        .map(|p| ParticipantRow {
            name: p.name.clone(),
            email: p.email.clone(),
            college: p.college.clone(),
            skill: p.skill.to_string(),
            track: p.track.clone(),
            checked_in: if p.checked_in { "Yes" } else { "No" }.to_string(),
            team: p
                .team_id
                .as_ref()
                .and_then(|id| roster.team(id))
                .map_or_else(|| "Not Assigned".to_string(), |t| t.name.clone()),
            role: p.role_label().to_string(),
        })
        .collect()
}

/// Project every team, rendering timestamps in the local time zone.
#[must_use]
pub fn team_rows(roster: &Roster) -> Vec<TeamRow> {
    team_rows_in(roster, &Local)
}

/// Project every team, rendering timestamps in `tz`.
#[must_use]
pub fn team_rows_in<Tz>(roster: &Roster, tz: &Tz) -> Vec<TeamRow>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    roster
        .teams()
        .iter()
        .map(|team| {
            let members: Vec<_> = roster.team_members(team).collect();
            TeamRow {
                name: team.name.clone(),
                members_count: members.len(),
                member_names: members
                    .iter()
                    .map(|p| p.name.as_str())
                    .collect::<Vec<_>>()
                    .join("; "),
                member_emails: members
                    .iter()
                    .map(|p| p.email.as_str())
                    .collect::<Vec<_>>()
                    .join("; "),
                registered_at: team
                    .registered_at
                    .with_timezone(tz)
                    .format(REGISTERED_AT_FORMAT)
                    .to_string(),
            }
        })
        .collect()
}

/// Serialize participant rows as CSV.
///
/// # Errors
///
/// Returns [`Error::NothingToExport`] if the roster has no participants.
pub fn participants_csv(roster: &Roster) -> Result<Vec<u8>> {
    let rows = participant_rows(roster);
    if rows.is_empty() {
        return Err(Error::NothingToExport {
            what: "participants",
        });
    }
    write_csv(&rows)
}

/// Serialize team rows as CSV, with local timestamps.
///
/// # Errors
///
/// Returns [`Error::NothingToExport`] if the roster has no teams.
pub fn teams_csv(roster: &Roster) -> Result<Vec<u8>> {
    teams_csv_in(roster, &Local)
}

/// Serialize team rows as CSV, with timestamps in `tz`.
///
/// # Errors
///
/// Returns [`Error::NothingToExport`] if the roster has no teams.
pub fn teams_csv_in<Tz>(roster: &Roster, tz: &Tz) -> Result<Vec<u8>>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let rows = team_rows_in(roster, tz);
    if rows.is_empty() {
        return Err(Error::NothingToExport { what: "teams" });
    }
    write_csv(&rows)
}

fn write_csv<T: Serialize>(rows: &[T]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    writer.into_inner().map_err(|e| Error::Io(e.into_error()))
}

/// Participant export filename for `date`.
#[must_use]
pub fn participants_filename(date: NaiveDate) -> String {
    format!("participants_{}.csv", date.format("%Y-%m-%d"))
}

/// Team export filename for `date`.
#[must_use]
pub fn teams_filename(date: NaiveDate) -> String {
    format!("teams_{}.csv", date.format("%Y-%m-%d"))
}

/// Destination for exported files.
pub trait ExportSink: fmt::Debug {
    /// Store `bytes` under `filename`.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes cannot be written.
    fn save(&mut self, filename: &str, bytes: &[u8]) -> Result<()>;
}

/// Writes exports into a directory, creating it if needed.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    /// Sink writing into `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The target directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ExportSink for DirectorySink {
    fn save(&mut self, filename: &str, bytes: &[u8]) -> Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir).map_err(|e| Error::DirectoryCreate {
                path: self.dir.clone(),
                source: e,
            })?;
        }
        let path = self.dir.join(filename);
        fs::write(&path, bytes)?;
        info!("Exported {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }
}

/// Export participants to `sink`, returning the filename used.
///
/// # Errors
///
/// Returns an error if there are no participants or the sink fails.
pub fn export_participants(
    roster: &Roster,
    sink: &mut impl ExportSink,
    date: NaiveDate,
) -> Result<String> {
    let bytes = participants_csv(roster)?;
    let filename = participants_filename(date);
    sink.save(&filename, &bytes)?;
    Ok(filename)
}

/// Export teams to `sink`, returning the filename used.
///
/// # Errors
///
/// Returns an error if there are no teams or the sink fails.
pub fn export_teams(roster: &Roster, sink: &mut impl ExportSink, date: NaiveDate) -> Result<String> {
    let bytes = teams_csv(roster)?;
    let filename = teams_filename(date);
    sink.save(&filename, &bytes)?;
    Ok(filename)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Participant, ParticipantId, Skill, Team, TeamId};
    use chrono::Utc;

    fn participant(id: &str, name: &str, team: Option<&str>, leader: bool) -> Participant {
        Participant {
            id: ParticipantId::new(id),
            name: name.to_string(),
            email: format!("{}@nmit.ac.in", name.to_lowercase()),
            college: "NMIT".to_string(),
            skill: Skill::FullStack,
            track: "General".to_string(),
            checked_in: leader,
            team_id: team.map(TeamId::new),
            is_leader: leader,
        }
    }

    fn roster() -> Roster {
        let mut team = Team::new(
            TeamId::new("t1"),
            "Alpha, Inc.",
            Utc.with_ymd_and_hms(2025, 3, 4, 14, 5, 9).unwrap(),
        );
        team.members = vec![
            ParticipantId::new("p1"),
            ParticipantId::new("ghost"),
            ParticipantId::new("p2"),
        ];
        Roster::from_parts(
            vec![
                participant("p1", "Asha", Some("t1"), true),
                participant("p2", "Ravi", Some("t1"), false),
                participant("p3", "Meera", None, false),
            ],
            vec![team],
        )
    }

    /// Sink that keeps files in memory.
    #[derive(Debug, Default)]
    struct MemorySink {
        files: Vec<(String, Vec<u8>)>,
    }

    impl ExportSink for MemorySink {
        fn save(&mut self, filename: &str, bytes: &[u8]) -> Result<()> {
            self.files.push((filename.to_string(), bytes.to_vec()));
            Ok(())
        }
    }

    #[test]
    fn test_participant_rows() {
        let rows = participant_rows(&roster());

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].checked_in, "Yes");
        assert_eq!(rows[0].team, "Alpha, Inc.");
        assert_eq!(rows[0].role, "Team Leader");
        assert_eq!(rows[0].skill, "Full Stack");
        assert_eq!(rows[2].checked_in, "No");
        assert_eq!(rows[2].team, "Not Assigned");
        assert_eq!(rows[2].role, "Member");
    }

    #[test]
    fn test_team_rows_skip_dangling_members() {
        let rows = team_rows_in(&roster(), &Utc);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].members_count, 2);
        assert_eq!(rows[0].member_names, "Asha; Ravi");
        assert_eq!(rows[0].member_emails, "asha@nmit.ac.in; ravi@nmit.ac.in");
        assert_eq!(rows[0].registered_at, "3/4/2025, 2:05:09 PM");
    }

    #[test]
    fn test_participants_csv_quotes_every_field() {
        let csv = String::from_utf8(participants_csv(&roster()).unwrap()).unwrap();
        let mut lines = csv.lines();

        assert_eq!(
            lines.next(),
            Some(
                "\"Name\",\"Email\",\"College\",\"Skill\",\"Track\",\"Checked In\",\"Team\",\"Role\""
            )
        );
        assert_eq!(
            lines.next(),
            Some(
                "\"Asha\",\"asha@nmit.ac.in\",\"NMIT\",\"Full Stack\",\"General\",\"Yes\",\"Alpha, Inc.\",\"Team Leader\""
            )
        );
        assert_eq!(csv.lines().count(), 4);
        assert!(csv.ends_with('\n'));
    }

    #[test]
    fn test_teams_csv() {
        let csv = String::from_utf8(teams_csv_in(&roster(), &Utc).unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(
            lines[0],
            "\"Team Name\",\"Members Count\",\"Member Names\",\"Member Emails\",\"Registered At\""
        );
        assert!(lines[1].starts_with("\"Alpha, Inc.\",\"2\",\"Asha; Ravi\""));
    }

    #[test]
    fn test_empty_exports_are_errors() {
        let empty = Roster::new();

        let err = participants_csv(&empty).unwrap_err();
        assert_eq!(err.to_string(), "No participants to export");
        assert!(err.is_precondition_error());

        let err = teams_csv(&empty).unwrap_err();
        assert_eq!(err.to_string(), "No teams to export");
    }

    #[test]
    fn test_filenames() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 9).unwrap();
        assert_eq!(participants_filename(date), "participants_2025-01-09.csv");
        assert_eq!(teams_filename(date), "teams_2025-01-09.csv");
    }

    #[test]
    fn test_export_to_sink() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 9).unwrap();
        let mut sink = MemorySink::default();

        let name = export_participants(&roster(), &mut sink, date).unwrap();
        assert_eq!(name, "participants_2025-01-09.csv");
        let name = export_teams(&roster(), &mut sink, date).unwrap();
        assert_eq!(name, "teams_2025-01-09.csv");
        assert_eq!(sink.files.len(), 2);
    }

    #[test]
    fn test_failed_export_saves_nothing() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 9).unwrap();
        let mut sink = MemorySink::default();

        assert!(export_teams(&Roster::new(), &mut sink, date).is_err());
        assert!(sink.files.is_empty());
    }

    #[test]
    fn test_directory_sink_writes_file() {
        let dir = std::env::temp_dir().join(format!("rollcall_export_test_{}", std::process::id()));
        let mut sink = DirectorySink::new(&dir);
        assert_eq!(sink.dir(), dir.as_path());

        sink.save("out.csv", b"\"a\"\n").unwrap();
        assert_eq!(std::fs::read(dir.join("out.csv")).unwrap(), b"\"a\"\n");

        let _ = std::fs::remove_dir_all(&dir);
    }
}
