//! SMART objectives and the cultural time adjustment chosen before negotiating.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::constants::CULTURAL_ADJUSTMENT_PREFIX;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SmartGoalKey {
    #[serde(rename = "specific")]
    Specific,
    #[serde(rename = "measurable")]
    Measurable,
    #[serde(rename = "achievable")]
    Achievable,
    #[serde(rename = "relevant")]
    Relevant,
    #[serde(rename = "timeBound")]
    TimeBound,
}

impl SmartGoalKey {
    pub const ALL: [Self; 5] = [
        Self::Specific,
        Self::Measurable,
        Self::Achievable,
        Self::Relevant,
        Self::TimeBound,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Specific => "specific",
            Self::Measurable => "measurable",
            Self::Achievable => "achievable",
            Self::Relevant => "relevant",
            Self::TimeBound => "timeBound",
        }
    }

    #[must_use]
    pub fn criterion(self) -> &'static SmartCriterion {
        match self {
            Self::Specific => &SMART_CRITERIA[0],
            Self::Measurable => &SMART_CRITERIA[1],
            Self::Achievable => &SMART_CRITERIA[2],
            Self::Relevant => &SMART_CRITERIA[3],
            Self::TimeBound => &SMART_CRITERIA[4],
        }
    }
}

impl fmt::Display for SmartGoalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SmartGoalKey {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or(())
    }
}

/// Guidance shown next to each SMART input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SmartCriterion {
    pub key: SmartGoalKey,
    pub letter: char,
    pub label: &'static str,
    pub description: &'static str,
    pub example: &'static str,
}

pub static SMART_CRITERIA: [SmartCriterion; 5] = [
    SmartCriterion {
        key: SmartGoalKey::Specific,
        letter: 'S',
        label: "Specific",
        description: "Clear, unambiguous goal",
        example: "Secure partnership with 60/40 IP rights favoring Heritage Interactive",
    },
    SmartCriterion {
        key: SmartGoalKey::Measurable,
        letter: 'M',
        label: "Measurable",
        description: "Quantifiable success metrics",
        example: "Achieve 3-year contract with minimum $2M budget allocation",
    },
    SmartCriterion {
        key: SmartGoalKey::Achievable,
        letter: 'A',
        label: "Achievable",
        description: "Realistic and attainable",
        example: "Obtain 4 out of 5 key technical requirements from NeuraLogic",
    },
    SmartCriterion {
        key: SmartGoalKey::Relevant,
        letter: 'R',
        label: "Relevant",
        description: "Aligned with strategic objectives",
        example: "Ensure solution aligns with HI's digital transformation roadmap",
    },
    SmartCriterion {
        key: SmartGoalKey::TimeBound,
        letter: 'T',
        label: "Time-Bound",
        description: "Clear timeframe with cultural adjustment",
        example: "Sign MoU within 6 months (allowing for relationship-building time)",
    },
];

/// Latest committed text for each SMART field.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SmartGoals {
    goals: BTreeMap<SmartGoalKey, String>,
}

impl SmartGoals {
    pub fn set(&mut self, key: SmartGoalKey, text: impl Into<String>) {
        self.goals.insert(key, text.into());
    }

    #[must_use]
    pub fn get(&self, key: SmartGoalKey) -> &str {
        self.goals.get(&key).map_or("", String::as_str)
    }

    /// A goal counts once its trimmed text is longer than `min_chars` characters.
    #[must_use]
    pub fn is_satisfied(&self, key: SmartGoalKey, min_chars: usize) -> bool {
        self.get(key).trim().chars().count() > min_chars
    }

    #[must_use]
    pub fn missing(&self, min_chars: usize) -> Vec<SmartGoalKey> {
        SmartGoalKey::ALL
            .into_iter()
            .filter(|key| !self.is_satisfied(*key, min_chars))
            .collect()
    }

    #[must_use]
    pub fn all_satisfied(&self, min_chars: usize) -> bool {
        self.missing(min_chars).is_empty()
    }
}

/// Choice-log text for a committed goal: the key plus a fixed-length excerpt.
#[must_use]
pub fn smart_goal_choice(key: SmartGoalKey, text: &str, preview_chars: usize) -> String {
    let excerpt: String = text.chars().take(preview_chars).collect();
    format!("SMART: {key} - {excerpt}...")
}

/// How the timeline is adapted for a polychronic counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CulturalAdjustment {
    #[default]
    Flexible,
    Phased,
    Milestone,
    Hybrid,
}

impl CulturalAdjustment {
    pub const ALL: [Self; 4] = [Self::Flexible, Self::Phased, Self::Milestone, Self::Hybrid];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Flexible => "flexible",
            Self::Phased => "phased",
            Self::Milestone => "milestone",
            Self::Hybrid => "hybrid",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Flexible => "Flexible Timeline",
            Self::Phased => "Phased Approach",
            Self::Milestone => "Cultural Milestones",
            Self::Hybrid => "Hybrid Model",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Flexible => "Add 30-50% buffer time for all milestones",
            Self::Phased => "Relationship phase → Technical phase → Legal phase",
            Self::Milestone => "Tie deadlines to relationship achievements",
            Self::Hybrid => "Fixed internal dates, flexible external communications",
        }
    }

    /// Line shown in the strategy summary.
    #[must_use]
    pub const fn summary(self) -> &'static str {
        match self {
            Self::Flexible => "Flexible Timeline with buffers",
            Self::Phased => "Phased Relationship-First Approach",
            Self::Milestone => "Cultural Milestone-Based Deadlines",
            Self::Hybrid => "Hybrid Fixed/Flexible Model",
        }
    }

    #[must_use]
    pub fn choice_text(self) -> String {
        format!("{CULTURAL_ADJUSTMENT_PREFIX}{}", self.as_str())
    }
}

impl fmt::Display for CulturalAdjustment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CulturalAdjustment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "flexible" => Ok(Self::Flexible),
            "phased" => Ok(Self::Phased),
            "milestone" => Ok(Self::Milestone),
            "hybrid" => Ok(Self::Hybrid),
            _ => Err(()),
        }
    }
}
