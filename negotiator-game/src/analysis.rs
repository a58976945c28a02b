//! Debrief analysis: strategy tally, cultural score, grade and feedback.
//!
//! Everything here is a pure function of the recorded history, the choice
//! log and the final score, so the debrief can be recomputed at will.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{
    CULTURAL_KEYWORDS, CULTURAL_POINTS_PER_MATCH, CULTURAL_SCORE_CAP, RECENT_HISTORY_LIMIT,
};
use crate::history::{ChoiceLog, HistoryEntry, HistoryLog};

/// Rhetorical strategy bucket, in tally order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyBucket {
    Collaborative,
    Logical,
    Authoritative,
    Adaptive,
}

impl StrategyBucket {
    pub const ALL: [Self; 4] = [
        Self::Collaborative,
        Self::Logical,
        Self::Authoritative,
        Self::Adaptive,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Collaborative => "collaborative",
            Self::Logical => "logical",
            Self::Authoritative => "authoritative",
            Self::Adaptive => "adaptive",
        }
    }

    /// Lower-case substrings that classify an action into this bucket.
    #[must_use]
    pub const fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::Collaborative => &["collaborat", "we", "together"],
            Self::Logical => &["logic", "data", "analysis"],
            Self::Authoritative => &["authority", "policy", "standard"],
            Self::Adaptive => &["adapt", "flexible", "adjust"],
        }
    }

    /// Sentence used when this bucket dominates the tally.
    #[must_use]
    pub const fn feedback(self) -> &'static str {
        match self {
            Self::Collaborative => {
                "Your collaborative approach was excellent for building rapport with polychronic culture."
            }
            Self::Logical => {
                "Logical reasoning is strong, but remember to balance with relationship-building."
            }
            Self::Authoritative => {
                "Authority references establish credibility, but use sparingly with relationship-focused cultures."
            }
            Self::Adaptive => "Adaptability is key in cross-cultural negotiations - well done!",
        }
    }

    #[must_use]
    pub const fn tip(self) -> &'static str {
        match self {
            Self::Collaborative => "Excellent for relationship-building cultures",
            Self::Logical => "Effective when supported by data and examples",
            Self::Authoritative => "Use cautiously with hierarchical cultures",
            Self::Adaptive => "Shows cultural awareness and flexibility",
        }
    }

    /// Substring match against an already lower-cased action label.
    #[must_use]
    pub fn matches(self, lowered: &str) -> bool {
        self.keywords().iter().any(|kw| lowered.contains(kw))
    }
}

impl fmt::Display for StrategyBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const BALANCED_FEEDBACK: &str = "A balanced approach shows strong negotiation potential.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StrategyTally {
    pub collaborative: u32,
    pub logical: u32,
    pub authoritative: u32,
    pub adaptive: u32,
}

impl StrategyTally {
    /// Count every entry into each bucket whose keywords it contains.
    #[must_use]
    pub fn from_history<'a>(entries: impl IntoIterator<Item = &'a HistoryEntry>) -> Self {
        let mut tally = Self::default();
        for entry in entries {
            let lowered = entry.action_label.to_lowercase();
            for bucket in StrategyBucket::ALL {
                if bucket.matches(&lowered) {
                    *tally.count_mut(bucket) += 1;
                }
            }
        }
        tally
    }

    #[must_use]
    pub const fn count(&self, bucket: StrategyBucket) -> u32 {
        match bucket {
            StrategyBucket::Collaborative => self.collaborative,
            StrategyBucket::Logical => self.logical,
            StrategyBucket::Authoritative => self.authoritative,
            StrategyBucket::Adaptive => self.adaptive,
        }
    }

    fn count_mut(&mut self, bucket: StrategyBucket) -> &mut u32 {
        match bucket {
            StrategyBucket::Collaborative => &mut self.collaborative,
            StrategyBucket::Logical => &mut self.logical,
            StrategyBucket::Authoritative => &mut self.authoritative,
            StrategyBucket::Adaptive => &mut self.adaptive,
        }
    }

    /// Bucket with the strictly highest count; earlier buckets win ties.
    /// `None` when nothing was classified.
    #[must_use]
    pub fn dominant(&self) -> Option<StrategyBucket> {
        let mut best: Option<(StrategyBucket, u32)> = None;
        for bucket in StrategyBucket::ALL {
            let count = self.count(bucket);
            if count > best.map_or(0, |(_, c)| c) {
                best = Some((bucket, count));
            }
        }
        best.map(|(bucket, _)| bucket)
    }

    #[must_use]
    pub fn max_count(&self) -> u32 {
        StrategyBucket::ALL
            .into_iter()
            .map(|b| self.count(b))
            .max()
            .unwrap_or(0)
    }

    /// Bar length relative to the largest bucket, in `[0, 1]`.
    #[must_use]
    pub fn ratio(&self, bucket: StrategyBucket) -> f64 {
        let max = self.max_count();
        if max == 0 {
            0.0
        } else {
            f64::from(self.count(bucket)) / f64::from(max)
        }
    }
}

/// 20 points per choice mentioning a cultural keyword (case-sensitive), capped at 100.
#[must_use]
pub fn cultural_score<'a>(choices: impl IntoIterator<Item = &'a String>) -> u32 {
    let raw = choices
        .into_iter()
        .filter(|choice| CULTURAL_KEYWORDS.iter().any(|kw| choice.contains(kw)))
        .fold(0_u32, |acc, _| acc.saturating_add(CULTURAL_POINTS_PER_MATCH));
    raw.min(CULTURAL_SCORE_CAP)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "C+")]
    CPlus,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "D")]
    D,
}

impl Grade {
    /// Highest threshold first; the first one reached wins.
    const THRESHOLDS: [(u32, Self); 6] = [
        (450, Self::APlus),
        (400, Self::A),
        (350, Self::BPlus),
        (300, Self::B),
        (250, Self::CPlus),
        (200, Self::C),
    ];

    #[must_use]
    pub fn for_score(score: u32) -> Self {
        Self::THRESHOLDS
            .iter()
            .find(|(min, _)| score >= *min)
            .map_or(Self::D, |(_, grade)| *grade)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::APlus => "A+",
            Self::A => "A",
            Self::BPlus => "B+",
            Self::B => "B",
            Self::CPlus => "C+",
            Self::C => "C",
            Self::D => "D",
        }
    }

    #[must_use]
    pub const fn comment(self) -> &'static str {
        match self {
            Self::APlus => "Exceptional cultural intelligence",
            Self::A => "Excellent negotiation skills",
            Self::BPlus => "Very good performance",
            Self::B => "Good strategic approach",
            Self::CPlus => "Adequate with room for growth",
            Self::C => "Basic understanding demonstrated",
            Self::D => "Needs more cultural awareness",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Grade comment followed by the dominant-strategy sentence.
#[must_use]
pub fn feedback_sentence(grade: Grade, tally: &StrategyTally) -> String {
    let strategy_line = tally
        .dominant()
        .map_or(BALANCED_FEEDBACK, StrategyBucket::feedback);
    format!("{}. {strategy_line}", grade.comment())
}

/// Per-bucket row of the strategy breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyBreakdown {
    pub bucket: StrategyBucket,
    pub count: u32,
    pub ratio: f64,
    pub tip: &'static str,
}

/// Everything the debrief screen displays.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceReport {
    pub score: u32,
    pub grade: Grade,
    pub grade_comment: &'static str,
    pub cultural_score: u32,
    pub strategies: StrategyTally,
    pub dominant_strategy: Option<StrategyBucket>,
    pub breakdown: Vec<StrategyBreakdown>,
    pub feedback: String,
    pub decisions_made: usize,
    pub actions_taken: usize,
    pub recent_history: Vec<HistoryEntry>,
}

/// Analyze a finished playthrough.
#[must_use]
pub fn analyze(score: u32, history: &HistoryLog, choices: &ChoiceLog) -> PerformanceReport {
    let strategies = StrategyTally::from_history(history);
    let grade = Grade::for_score(score);
    let breakdown = StrategyBucket::ALL
        .into_iter()
        .map(|bucket| StrategyBreakdown {
            bucket,
            count: strategies.count(bucket),
            ratio: strategies.ratio(bucket),
            tip: bucket.tip(),
        })
        .collect();

    PerformanceReport {
        score,
        grade,
        grade_comment: grade.comment(),
        cultural_score: cultural_score(choices),
        strategies,
        dominant_strategy: strategies.dominant(),
        breakdown,
        feedback: feedback_sentence(grade, &strategies),
        decisions_made: choices.len(),
        actions_taken: history.len(),
        recent_history: history.recent(RECENT_HISTORY_LIMIT).to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase::Phase;

    fn entry(label: &str) -> HistoryEntry {
        HistoryEntry {
            action_label: label.to_string(),
            points: 0,
            timestamp_display: String::new(),
            phase: Phase::Negotiation,
        }
    }

    #[test]
    fn direct_opening_matches_no_bucket() {
        let tally = StrategyTally::from_history(&[entry("Direct opening")]);
        assert_eq!(tally, StrategyTally::default());
        assert_eq!(tally.dominant(), None);
    }

    #[test]
    fn one_label_can_hit_several_buckets() {
        let tally = StrategyTally::from_history(&[entry(
            "Together we adjust the Data POLICY",
        )]);
        assert_eq!(tally.collaborative, 1);
        assert_eq!(tally.logical, 1);
        assert_eq!(tally.authoritative, 1);
        assert_eq!(tally.adaptive, 1);
    }

    #[test]
    fn substring_matching_counts_embedded_we() {
        // "answer" contains "we"; the tally deliberately counts it.
        let tally = StrategyTally::from_history(&[entry("Answered the question")]);
        assert_eq!(tally.collaborative, 1);
    }

    #[test]
    fn dominant_prefers_first_bucket_on_ties() {
        let tally = StrategyTally {
            collaborative: 0,
            logical: 2,
            authoritative: 0,
            adaptive: 2,
        };
        assert_eq!(tally.dominant(), Some(StrategyBucket::Logical));
        assert!((tally.ratio(StrategyBucket::Adaptive) - 1.0).abs() < f64::EPSILON);
        assert!(tally.ratio(StrategyBucket::Collaborative).abs() < f64::EPSILON);
        assert!(StrategyTally::default().ratio(StrategyBucket::Logical).abs() < f64::EPSILON);
    }

    #[test]
    fn cultural_score_is_case_sensitive_and_capped() {
        let choices: Vec<String> = vec![
            "Cultural adjustment: flexible".to_string(),
            "cultural adjustment: rigid".to_string(),
        ];
        assert_eq!(cultural_score(&choices), 20);

        let many: Vec<String> = (0..9)
            .map(|i| format!("build the relationship {i}"))
            .collect();
        assert_eq!(cultural_score(&many), 100);
        assert_eq!(cultural_score(&Vec::<String>::new()), 0);
    }

    #[test]
    fn grade_thresholds_are_inclusive() {
        let cases = [
            (535, Grade::APlus),
            (450, Grade::APlus),
            (449, Grade::A),
            (400, Grade::A),
            (350, Grade::BPlus),
            (300, Grade::B),
            (299, Grade::CPlus),
            (250, Grade::CPlus),
            (200, Grade::C),
            (199, Grade::D),
            (0, Grade::D),
        ];
        for (score, grade) in cases {
            assert_eq!(Grade::for_score(score), grade, "score {score}");
        }
        assert_eq!(
            serde_json::to_string(&Grade::APlus).unwrap(),
            r#""A+""#
        );
    }

    #[test]
    fn feedback_defaults_to_balanced_sentence() {
        let sentence = feedback_sentence(Grade::D, &StrategyTally::default());
        assert_eq!(
            sentence,
            "Needs more cultural awareness. A balanced approach shows strong negotiation potential."
        );
        let adaptive = StrategyTally {
            adaptive: 1,
            ..StrategyTally::default()
        };
        assert!(feedback_sentence(Grade::A, &adaptive).starts_with("Excellent negotiation skills. Adaptability"));
    }

    #[test]
    fn analyze_is_repeatable() {
        let mut history = HistoryLog::default();
        history.push(entry("Opening Phase: Collaborative opening"));
        history.push(entry("Stating Positions: Creative alternative"));
        let mut choices = ChoiceLog::default();
        choices.push("Cultural adjustment: flexible");

        let first = analyze(535, &history, &choices);
        let second = analyze(535, &history, &choices);
        assert_eq!(first, second);
        assert_eq!(first.grade, Grade::APlus);
        assert_eq!(first.cultural_score, 20);
        assert_eq!(first.dominant_strategy, Some(StrategyBucket::Collaborative));
        assert_eq!(first.actions_taken, 2);
        assert_eq!(first.decisions_made, 1);
        assert_eq!(first.breakdown.len(), 4);
    }
}
