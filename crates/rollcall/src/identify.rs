//! Identification input: check-in and check-out by email.
//!
//! An email arrives either from a scan session or from manual entry and is
//! routed to the tracker according to the selected [`ScanMode`].
//!
//! A scan session is single-shot. The scanner is stopped as soon as it yields
//! one decoded value, before that value is acted on, so the same code is
//! never processed twice.

use std::fmt;
use std::io::BufRead;

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::storage::KeyValueStore;
use crate::workflow::Tracker;

/// What an identified participant should be marked as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanMode {
    /// Mark present.
    #[default]
    CheckIn,
    /// Mark absent.
    CheckOut,
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CheckIn => write!(f, "check-in"),
            Self::CheckOut => write!(f, "check-out"),
        }
    }
}

/// Result of routing one email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identification {
    /// The participant was checked in.
    CheckedIn {
        /// Participant name.
        name: String,
    },
    /// The participant was checked out.
    CheckedOut {
        /// Participant name.
        name: String,
    },
    /// Check-in requested but the participant is already present.
    AlreadyCheckedIn {
        /// Participant name.
        name: String,
    },
    /// Check-out requested but the participant is not present.
    NotCheckedIn {
        /// Participant name.
        name: String,
    },
}

impl Identification {
    /// Check whether nothing changed and the operator should be warned.
    #[must_use]
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            Self::AlreadyCheckedIn { .. } | Self::NotCheckedIn { .. }
        )
    }
}

impl fmt::Display for Identification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CheckedIn { name } => write!(f, "{name} checked in successfully"),
            Self::CheckedOut { name } => write!(f, "{name} checked out successfully"),
            Self::AlreadyCheckedIn { name } => write!(f, "{name} is already checked in"),
            Self::NotCheckedIn { name } => write!(f, "{name} is not checked in"),
        }
    }
}

/// Route an email to check-in or check-out.
///
/// # Errors
///
/// Returns [`Error::ParticipantNotFound`] if no participant has the email
/// (ignoring case), or an error if the store write fails.
pub fn identify<S: KeyValueStore>(
    tracker: &mut Tracker<S>,
    mode: ScanMode,
    email: &str,
) -> Result<Identification> {
    let email = email.trim();
    let participant = tracker
        .roster()
        .participant_by_email(email)
        .ok_or_else(|| Error::participant_not_found(email))?;
    let id = participant.id.clone();
    let name = participant.name.clone();

    let outcome = match (mode, participant.checked_in) {
        (ScanMode::CheckIn, true) => Identification::AlreadyCheckedIn { name },
        (ScanMode::CheckOut, false) => Identification::NotCheckedIn { name },
        (ScanMode::CheckIn, false) => {
            tracker.check_in(&id)?;
            Identification::CheckedIn { name }
        }
        (ScanMode::CheckOut, true) => {
            tracker.check_out(&id)?;
            Identification::CheckedOut { name }
        }
    };

    if outcome.is_warning() {
        warn!("{}", outcome);
    } else {
        info!("{}", outcome);
    }
    Ok(outcome)
}

/// Route a typed-in email.
///
/// # Errors
///
/// Returns [`Error::EmptyInput`] for blank input, otherwise as [`identify`].
pub fn manual_entry<S: KeyValueStore>(
    tracker: &mut Tracker<S>,
    mode: ScanMode,
    input: &str,
) -> Result<Identification> {
    if input.trim().is_empty() {
        return Err(Error::EmptyInput);
    }
    identify(tracker, mode, input)
}

/// Decoder settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanSettings {
    /// Frames per second to sample.
    pub fps: u32,
    /// Side length of the square detection box, in pixels.
    pub box_size: u32,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            fps: 10,
            box_size: 250,
        }
    }
}

/// A device that decodes codes into text.
pub trait Scanner: fmt::Debug {
    /// The name of this scanner (for logging/debugging).
    fn name(&self) -> &'static str;

    /// Begin decoding.
    ///
    /// # Errors
    ///
    /// Returns an error if the device is unavailable.
    fn start(&mut self, settings: &ScanSettings) -> Result<()>;

    /// Block until the next decoded value. `None` means the source is
    /// exhausted.
    ///
    /// # Errors
    ///
    /// Returns an error if reading from the device fails.
    fn next_decoded(&mut self) -> Result<Option<String>>;

    /// Stop decoding and release the device.
    ///
    /// # Errors
    ///
    /// Returns an error if the device fails to stop cleanly.
    fn stop(&mut self) -> Result<()>;

    /// Check if the scanner is currently running.
    fn is_running(&self) -> bool;
}

/// One scan: start, take a single decoded value, stop.
#[derive(Debug)]
pub struct ScanSession<'a, C: Scanner> {
    scanner: &'a mut C,
    settings: ScanSettings,
}

impl<'a, C: Scanner> ScanSession<'a, C> {
    /// Prepare a session on the given scanner.
    pub fn new(scanner: &'a mut C, settings: ScanSettings) -> Self {
        Self { scanner, settings }
    }

    /// Run the session to its single decoded value.
    ///
    /// A scanner that started is stopped before this returns, whether or not
    /// it produced a value. A scanner that failed to start is left alone.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ScannerUnavailable`] if the scanner cannot start,
    /// [`Error::ScanAborted`] if it runs dry, or the read error it reported.
    pub fn run(self) -> Result<String> {
        if let Err(e) = self.scanner.start(&self.settings) {
            warn!("Scanner {} failed to start: {}", self.scanner.name(), e);
            return Err(match e {
                Error::ScannerUnavailable { .. } => e,
                other => Error::scanner_unavailable(other.to_string()),
            });
        }
        debug!(
            "Scanner {} started at {} fps, {}px box",
            self.scanner.name(),
            self.settings.fps,
            self.settings.box_size
        );

        let decoded = self.scanner.next_decoded();
        self.scanner.stop()?;

        match decoded? {
            Some(text) => Ok(text),
            None => Err(Error::ScanAborted),
        }
    }
}

/// Scan once and route the decoded email.
///
/// # Errors
///
/// Returns scanner errors from [`ScanSession::run`] without touching the
/// roster, otherwise as [`identify`].
pub fn scan_and_identify<S: KeyValueStore, C: Scanner>(
    tracker: &mut Tracker<S>,
    scanner: &mut C,
    settings: ScanSettings,
    mode: ScanMode,
) -> Result<Identification> {
    let decoded = ScanSession::new(scanner, settings).run()?;
    identify(tracker, mode, &decoded)
}

/// Scanner reading one decoded value per line, as keyboard-wedge barcode
/// readers produce. Blank lines are skipped.
#[derive(Debug)]
pub struct LineScanner<R> {
    reader: R,
    running: bool,
}

impl<R: BufRead> LineScanner<R> {
    /// Wrap a line source.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            running: false,
        }
    }
}

impl<R: BufRead + fmt::Debug> Scanner for LineScanner<R> {
    fn name(&self) -> &'static str {
        "line"
    }

    fn start(&mut self, _settings: &ScanSettings) -> Result<()> {
        self.running = true;
        Ok(())
    }

    fn next_decoded(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.reader.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            let text = line.trim();
            if !text.is_empty() {
                return Ok(Some(text.to_string()));
            }
        }
    }

    fn stop(&mut self) -> Result<()> {
        self.running = false;
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EventConfig;
    use crate::ids::{FixedClock, SequentialIds};
    use crate::model::Skill;
    use crate::registration::MemberEntry;
    use crate::storage::MemoryStore;
    use chrono::Utc;
    use std::io::Cursor;

    fn tracker() -> Tracker<MemoryStore> {
        let mut tracker = Tracker::with_capabilities(
            MemoryStore::new(),
            EventConfig::default(),
            Box::new(SequentialIds::new()),
            Box::new(FixedClock(Utc::now())),
        )
        .unwrap();
        let mut form = tracker.new_form("Alpha");
        form.leader = MemberEntry::new("Asha", "a@nmit.ac.in", Some(Skill::Backend));
        form.add_member(MemberEntry::new("Ravi", "b@nmit.ac.in", Some(Skill::Frontend)))
            .unwrap();
        tracker.register(&form).unwrap();
        tracker
    }

    /// Scanner that records its lifecycle and can be told to fail.
    #[derive(Debug, Default)]
    struct FakeScanner {
        values: Vec<String>,
        fail_start: bool,
        running: bool,
        starts: usize,
        stops: usize,
        running_when_read: Option<bool>,
    }

    impl Scanner for FakeScanner {
        fn name(&self) -> &'static str {
            "fake"
        }

        fn start(&mut self, _settings: &ScanSettings) -> Result<()> {
            self.starts += 1;
            if self.fail_start {
                return Err(Error::Io(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "camera busy",
                )));
            }
            self.running = true;
            Ok(())
        }

        fn next_decoded(&mut self) -> Result<Option<String>> {
            self.running_when_read = Some(self.running);
            Ok(if self.values.is_empty() {
                None
            } else {
                Some(self.values.remove(0))
            })
        }

        fn stop(&mut self) -> Result<()> {
            self.stops += 1;
            self.running = false;
            Ok(())
        }

        fn is_running(&self) -> bool {
            self.running
        }
    }

    #[test]
    fn test_identify_check_in() {
        let mut tracker = tracker();
        let outcome = identify(&mut tracker, ScanMode::CheckIn, "A@NMIT.AC.IN").unwrap();

        assert_eq!(
            outcome,
            Identification::CheckedIn {
                name: "Asha".to_string()
            }
        );
        assert_eq!(outcome.to_string(), "Asha checked in successfully");
        assert!(tracker
            .roster()
            .participant_by_email("a@nmit.ac.in")
            .unwrap()
            .checked_in);
    }

    #[test]
    fn test_identify_already_checked_in_is_warning() {
        let mut tracker = tracker();
        identify(&mut tracker, ScanMode::CheckIn, "a@nmit.ac.in").unwrap();
        let writes = tracker.store().writes();

        let outcome = identify(&mut tracker, ScanMode::CheckIn, "a@nmit.ac.in").unwrap();
        assert!(outcome.is_warning());
        assert_eq!(outcome.to_string(), "Asha is already checked in");
        assert_eq!(tracker.store().writes(), writes);
    }

    #[test]
    fn test_identify_check_out_not_checked_in() {
        let mut tracker = tracker();
        let outcome = identify(&mut tracker, ScanMode::CheckOut, "b@nmit.ac.in").unwrap();

        assert_eq!(
            outcome,
            Identification::NotCheckedIn {
                name: "Ravi".to_string()
            }
        );
        // No mutation: Ravi keeps the registration team link.
        assert!(tracker
            .roster()
            .participant_by_email("b@nmit.ac.in")
            .unwrap()
            .is_assigned());
    }

    #[test]
    fn test_identify_check_out() {
        let mut tracker = tracker();
        identify(&mut tracker, ScanMode::CheckIn, "b@nmit.ac.in").unwrap();
        let outcome = identify(&mut tracker, ScanMode::CheckOut, " b@nmit.ac.in ").unwrap();

        assert_eq!(outcome.to_string(), "Ravi checked out successfully");
        let ravi = tracker
            .roster()
            .participant_by_email("b@nmit.ac.in")
            .unwrap();
        assert!(!ravi.checked_in);
        assert!(ravi.team_id.is_none());
    }

    #[test]
    fn test_identify_not_found() {
        let mut tracker = tracker();
        let err = identify(&mut tracker, ScanMode::CheckIn, "nobody@nmit.ac.in").unwrap_err();
        assert!(err.is_lookup_error());
    }

    #[test]
    fn test_manual_entry_rejects_blank() {
        let mut tracker = tracker();
        let err = manual_entry(&mut tracker, ScanMode::CheckIn, "   ").unwrap_err();
        assert!(matches!(err, Error::EmptyInput));
        assert_eq!(err.to_string(), "Please enter an email address");
    }

    #[test]
    fn test_scan_session_stops_before_processing() {
        let mut scanner = FakeScanner {
            values: vec!["a@nmit.ac.in".to_string(), "b@nmit.ac.in".to_string()],
            ..FakeScanner::default()
        };

        let decoded = ScanSession::new(&mut scanner, ScanSettings::default())
            .run()
            .unwrap();
        assert_eq!(decoded, "a@nmit.ac.in");
        assert_eq!(scanner.running_when_read, Some(true));
        assert!(!scanner.is_running());
        assert_eq!(scanner.stops, 1);
        // Only one value was consumed.
        assert_eq!(scanner.values.len(), 1);
    }

    #[test]
    fn test_scan_session_start_failure() {
        let mut scanner = FakeScanner {
            fail_start: true,
            ..FakeScanner::default()
        };

        let err = ScanSession::new(&mut scanner, ScanSettings::default())
            .run()
            .unwrap_err();
        assert!(matches!(err, Error::ScannerUnavailable { .. }));
        assert!(err.to_string().contains("Please use manual entry"));
        assert_eq!(scanner.starts, 1);
        assert_eq!(scanner.stops, 0);
        assert!(!scanner.is_running());
    }

    #[test]
    fn test_scan_session_stops_after_read_error() {
        #[derive(Debug)]
        struct BrokenReader;

        impl std::io::Read for BrokenReader {
            fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "unplugged"))
            }
        }

        let mut scanner = LineScanner::new(std::io::BufReader::new(BrokenReader));
        let err = ScanSession::new(&mut scanner, ScanSettings::default())
            .run()
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert!(!scanner.is_running());
    }

    #[test]
    fn test_scan_session_exhausted() {
        let mut scanner = FakeScanner::default();
        let err = ScanSession::new(&mut scanner, ScanSettings::default())
            .run()
            .unwrap_err();
        assert!(matches!(err, Error::ScanAborted));
        assert!(!scanner.is_running());
    }

    #[test]
    fn test_scan_and_identify() {
        let mut tracker = tracker();
        let mut scanner = LineScanner::new(Cursor::new("\n  \na@nmit.ac.in\nb@nmit.ac.in\n"));

        let outcome = scan_and_identify(
            &mut tracker,
            &mut scanner,
            ScanSettings::default(),
            ScanMode::CheckIn,
        )
        .unwrap();
        assert_eq!(
            outcome,
            Identification::CheckedIn {
                name: "Asha".to_string()
            }
        );
        assert!(!scanner.is_running());
        assert!(!tracker
            .roster()
            .participant_by_email("b@nmit.ac.in")
            .unwrap()
            .checked_in);
    }

    #[test]
    fn test_scan_failure_leaves_roster_untouched() {
        let mut tracker = tracker();
        let before = tracker.roster().clone();
        let mut scanner = FakeScanner {
            fail_start: true,
            ..FakeScanner::default()
        };

        let result = scan_and_identify(
            &mut tracker,
            &mut scanner,
            ScanSettings::default(),
            ScanMode::CheckIn,
        );
        assert!(result.is_err());
        assert_eq!(tracker.roster(), &before);
    }

    #[test]
    fn test_line_scanner_yields_lines() {
        let mut scanner = LineScanner::new(Cursor::new("x@nmit.ac.in\r\n\ny@nmit.ac.in"));
        scanner.start(&ScanSettings::default()).unwrap();
        assert!(scanner.is_running());
        assert_eq!(
            scanner.next_decoded().unwrap().as_deref(),
            Some("x@nmit.ac.in")
        );
        assert_eq!(
            scanner.next_decoded().unwrap().as_deref(),
            Some("y@nmit.ac.in")
        );
        assert_eq!(scanner.next_decoded().unwrap(), None);
        scanner.stop().unwrap();
        assert!(!scanner.is_running());
    }

    #[test]
    fn test_scan_mode_display() {
        assert_eq!(ScanMode::CheckIn.to_string(), "check-in");
        assert_eq!(ScanMode::CheckOut.to_string(), "check-out");
        assert_eq!(ScanMode::default(), ScanMode::CheckIn);
    }
}
