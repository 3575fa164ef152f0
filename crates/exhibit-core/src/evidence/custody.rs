//! Chain-of-custody log.
//!
//! One line per event: an RFC 3339 UTC timestamp, a space, then the action.
//! Timestamps are caller data, so a log renders identically every time.

use chrono::DateTime;
use chrono::SecondsFormat;
use chrono::Utc;
use serde::Serialize;

use crate::ForensicError;
use crate::Result;

/// One recorded action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustodyEvent {
    /// When the action happened.
    pub timestamp: DateTime<Utc>,
    /// What happened.
    pub action: String,
}

/// Ordered list of custody events.
///
/// # Examples
///
/// ```
/// use chrono::TimeZone;
/// use chrono::Utc;
/// use exhibit_core::evidence::CustodyLog;
///
/// let mut log = CustodyLog::new();
/// let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
/// log.record_at(at, "received upload.zip");
/// assert_eq!(log.render(), "2024-03-01T12:00:00Z received upload.zip\n");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CustodyLog {
    events: Vec<CustodyEvent>,
}

impl CustodyLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an action at the current time.
    pub fn record(&mut self, action: impl Into<String>) -> &mut Self {
        self.record_at(Utc::now(), action)
    }

    /// Records an action at `timestamp`.
    pub fn record_at(&mut self, timestamp: DateTime<Utc>, action: impl Into<String>) -> &mut Self {
        // Line-oriented format: keep each action on one line.
        let action = action.into().replace(['\r', '\n'], " ");
        self.events.push(CustodyEvent { timestamp, action });
        self
    }

    /// Recorded events, oldest first.
    #[must_use]
    pub fn events(&self) -> &[CustodyEvent] {
        &self.events
    }

    /// Returns `true` if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Renders the log as text, one event per line.
    #[must_use]
    pub fn render(&self) -> String {
        self.events
            .iter()
            .map(|event| {
                format!(
                    "{} {}\n",
                    event.timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true),
                    event.action
                )
            })
            .collect()
    }

    /// Parses a rendered log. Blank lines are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ForensicError::InvalidCustodyEntry`] for a line without a
    /// valid RFC 3339 timestamp.
    pub fn parse(text: &str) -> Result<Self> {
        let mut log = Self::new();
        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let invalid = |reason: String| ForensicError::InvalidCustodyEntry {
                line: index + 1,
                reason,
            };
            let (stamp, action) = line
                .split_once(' ')
                .ok_or_else(|| invalid("missing action".to_string()))?;
            let timestamp = DateTime::parse_from_rfc3339(stamp)
                .map_err(|e| invalid(e.to_string()))?
                .with_timezone(&Utc);
            log.record_at(timestamp, action.trim());
        }
        Ok(log)
    }
}
