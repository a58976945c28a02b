//! Centralized content and scoring constants for the negotiation flow.
//!
//! Timing and point values that hosts may tune live in [`crate::config::GameConfig`];
//! the values here are fixed parts of the game's rules and only change through
//! reviewed code changes.

// History labels -----------------------------------------------------------
pub const COMPLETION_ACTION_LABEL: &str = "Completed all negotiation stages";
pub(crate) const SMART_GOAL_ACTION_PREFIX: &str = "Set SMART goal: ";
pub(crate) const CULTURAL_ADJUSTMENT_PREFIX: &str = "Cultural adjustment: ";

// Catalog shape ------------------------------------------------------------
pub const OPTIONS_PER_STAGE: usize = 3;
pub const EFFECTIVE_OPTION_THRESHOLD: u32 = 30;
pub const MAX_OPTION_POINTS: u32 = 10_000;

// Debrief ------------------------------------------------------------------
pub const CULTURAL_KEYWORDS: [&str; 3] = ["Cultural", "flexible", "relationship"];
pub const CULTURAL_POINTS_PER_MATCH: u32 = 20;
pub const CULTURAL_SCORE_CAP: u32 = 100;
pub const RECENT_HISTORY_LIMIT: usize = 10;

// Export -------------------------------------------------------------------
pub(crate) const EXPORT_FILE_PREFIX: &str = "negotiation-results-";
pub(crate) const EXPORT_FILE_SUFFIX: &str = ".json";
pub(crate) const SHARE_TITLE: &str = "Negotiation Game Results";

// Time display -------------------------------------------------------------
pub(crate) const HISTORY_TIME_FORMAT: &str = "%-I:%M:%S %p";
