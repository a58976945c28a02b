use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Top-level screen of a playthrough. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Briefing,
    Preparation,
    Negotiation,
    Debrief,
}

impl Phase {
    pub const ALL: [Self; 4] = [
        Self::Briefing,
        Self::Preparation,
        Self::Negotiation,
        Self::Debrief,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Briefing => "briefing",
            Self::Preparation => "preparation",
            Self::Negotiation => "negotiation",
            Self::Debrief => "debrief",
        }
    }

    /// One-based position shown in the progress header.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::Briefing => 1,
            Self::Preparation => 2,
            Self::Negotiation => 3,
            Self::Debrief => 4,
        }
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Briefing => "Mission Briefing",
            Self::Preparation => "SMART Objectives",
            Self::Negotiation => "Live Negotiation",
            Self::Debrief => "Strategic Analysis",
        }
    }

    /// The phase the forward flow moves to next; debrief loops back through restart.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Briefing => Some(Self::Preparation),
            Self::Preparation => Some(Self::Negotiation),
            Self::Negotiation => Some(Self::Debrief),
            Self::Debrief => None,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "briefing" => Ok(Self::Briefing),
            "preparation" => Ok(Self::Preparation),
            "negotiation" => Ok(Self::Negotiation),
            "debrief" => Ok(Self::Debrief),
            _ => Err(()),
        }
    }
}

impl From<Phase> for String {
    fn from(value: Phase) -> Self {
        value.as_str().to_string()
    }
}

/// Render a countdown as `M:SS`; minutes are not padded.
#[must_use]
pub fn format_countdown(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
