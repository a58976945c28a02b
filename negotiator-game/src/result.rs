//! Export document and share text for a finished negotiation.
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::analysis::{Grade, PerformanceReport, StrategyTally};
use crate::clock::export_timestamp;
use crate::constants::{EXPORT_FILE_PREFIX, EXPORT_FILE_SUFFIX, SHARE_TITLE};
use crate::error::GameError;

static WHITESPACE_RUNS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// The one-shot results document offered for download.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultExport {
    pub team_name: String,
    pub score: u32,
    pub grade: Grade,
    pub cultural_score: u32,
    pub timestamp: String,
    pub strategies: StrategyTally,
    pub feedback: String,
}

impl ResultExport {
    #[must_use]
    pub fn new(team_name: &str, report: &PerformanceReport, at: DateTime<Utc>) -> Self {
        Self {
            team_name: team_name.to_string(),
            score: report.score,
            grade: report.grade,
            cultural_score: report.cultural_score,
            timestamp: export_timestamp(at),
            strategies: report.strategies,
            feedback: report.feedback.clone(),
        }
    }

    /// Pretty-printed JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, GameError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    #[must_use]
    pub fn filename(&self) -> String {
        export_filename(&self.team_name)
    }

    /// Plain-text summary handed to share or clipboard targets.
    #[must_use]
    pub fn share_text(&self) -> String {
        format!(
            "🎮 {SHARE_TITLE}\nTeam: {}\nScore: {}\nGrade: {}\nCultural Awareness: {}/100",
            self.team_name, self.score, self.grade, self.cultural_score
        )
    }
}

/// `negotiation-results-<team>.json`, with each whitespace run in the team name
/// replaced by a single hyphen.
#[must_use]
pub fn export_filename(team_name: &str) -> String {
    let slug = WHITESPACE_RUNS.replace_all(team_name, "-");
    format!("{EXPORT_FILE_PREFIX}{slug}{EXPORT_FILE_SUFFIX}")
}

/// Platform share and clipboard integration.
pub trait ShareTarget {
    type Error: std::error::Error;

    /// Hand the summary to the platform's native share sheet.
    ///
    /// # Errors
    ///
    /// Returns an error if native sharing is unavailable or was refused.
    fn share(&mut self, title: &str, text: &str) -> Result<(), Self::Error>;

    /// Copy the summary to the clipboard.
    ///
    /// # Errors
    ///
    /// Returns an error if the clipboard cannot be written.
    fn copy_to_clipboard(&mut self, text: &str) -> Result<(), Self::Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShareOutcome {
    Shared,
    /// Native share failed; the text was copied instead and the user should be told.
    CopiedToClipboard,
    Unavailable,
}

/// Best-effort share: native share first, then the clipboard. Never fails.
pub fn share_results<T: ShareTarget>(target: &mut T, export: &ResultExport) -> ShareOutcome {
    let text = export.share_text();
    match target.share(SHARE_TITLE, &text) {
        Ok(()) => return ShareOutcome::Shared,
        Err(err) => log::warn!("native share failed, falling back to clipboard: {err}"),
    }
    match target.copy_to_clipboard(&text) {
        Ok(()) => ShareOutcome::CopiedToClipboard,
        Err(err) => {
            log::warn!("clipboard copy failed: {err}");
            ShareOutcome::Unavailable
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::fmt;

    fn sample() -> ResultExport {
        ResultExport {
            team_name: "Cultural Bridge".to_string(),
            score: 535,
            grade: Grade::APlus,
            cultural_score: 40,
            timestamp: export_timestamp(Utc.with_ymd_and_hms(2026, 5, 1, 8, 30, 0).unwrap()),
            strategies: StrategyTally {
                collaborative: 2,
                logical: 0,
                authoritative: 0,
                adaptive: 1,
            },
            feedback: "Exceptional cultural intelligence. Balanced.".to_string(),
        }
    }

    #[derive(Debug)]
    struct Refused;

    impl fmt::Display for Refused {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("refused")
        }
    }

    impl std::error::Error for Refused {}

    #[derive(Default)]
    struct FakeTarget {
        native: bool,
        clipboard: bool,
        copied: Option<String>,
    }

    impl ShareTarget for FakeTarget {
        type Error = Refused;

        fn share(&mut self, _title: &str, _text: &str) -> Result<(), Refused> {
            if self.native { Ok(()) } else { Err(Refused) }
        }

        fn copy_to_clipboard(&mut self, text: &str) -> Result<(), Refused> {
            if self.clipboard {
                self.copied = Some(text.to_string());
                Ok(())
            } else {
                Err(Refused)
            }
        }
    }

    #[test]
    fn export_uses_camel_case_keys() {
        let json = sample().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["teamName"], "Cultural Bridge");
        assert_eq!(value["grade"], "A+");
        assert_eq!(value["culturalScore"], 40);
        assert_eq!(value["timestamp"], "2026-05-01T08:30:00.000Z");
        assert_eq!(value["strategies"]["collaborative"], 2);
        assert!(json.contains('\n'));
    }

    #[test]
    fn filename_collapses_whitespace_runs() {
        assert_eq!(
            export_filename("Synapse   Team\tAlpha"),
            "negotiation-results-Synapse-Team-Alpha.json"
        );
        assert_eq!(sample().filename(), "negotiation-results-Cultural-Bridge.json");
        assert_eq!(
            export_filename("Harbor\n\r Accord"),
            "negotiation-results-Harbor-Accord.json"
        );
    }

    #[test]
    fn share_text_lists_the_headline_numbers() {
        assert_eq!(
            sample().share_text(),
            "🎮 Negotiation Game Results\nTeam: Cultural Bridge\nScore: 535\nGrade: A+\nCultural Awareness: 40/100"
        );
    }

    #[test]
    fn share_falls_back_to_clipboard() {
        let export = sample();
        let mut native = FakeTarget {
            native: true,
            ..FakeTarget::default()
        };
        assert_eq!(share_results(&mut native, &export), ShareOutcome::Shared);

        let mut clipboard_only = FakeTarget {
            clipboard: true,
            ..FakeTarget::default()
        };
        assert_eq!(
            share_results(&mut clipboard_only, &export),
            ShareOutcome::CopiedToClipboard
        );
        assert_eq!(clipboard_only.copied, Some(export.share_text()));

        let mut nothing = FakeTarget::default();
        assert_eq!(share_results(&mut nothing, &export), ShareOutcome::Unavailable);
    }
}
