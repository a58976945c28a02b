//! Static negotiation content: the ordered stages and their response options.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{EFFECTIVE_OPTION_THRESHOLD, MAX_OPTION_POINTS, OPTIONS_PER_STAGE};

/// A response the player may pick during a stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageOption {
    pub response_text: String,
    pub strategy_label: String,
    pub points: u32,
    pub feedback_text: String,
}

impl StageOption {
    #[must_use]
    pub const fn is_effective(&self) -> bool {
        self.points >= EFFECTIVE_OPTION_THRESHOLD
    }
}

/// One scripted negotiation scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub title: String,
    pub scenario_text: String,
    pub cultural_tip: String,
    pub options: Vec<StageOption>,
}

impl Stage {
    /// Label recorded in the history when `option` is chosen for this stage.
    #[must_use]
    pub fn action_label(&self, option: &StageOption) -> String {
        format!("{}: {}", self.title, option.strategy_label)
    }

    /// Index of the highest-scoring option; the first wins on ties.
    #[must_use]
    pub fn best_option_index(&self) -> usize {
        self.options
            .iter()
            .enumerate()
            .fold((0, 0), |(best_idx, best_pts), (idx, option)| {
                if option.points > best_pts {
                    (idx, option.points)
                } else {
                    (best_idx, best_pts)
                }
            })
            .0
    }
}

/// Content errors caught when a catalog is loaded.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("scenario catalog has no stages")]
    Empty,
    #[error("stage {index} ({title}) has {count} options, expected {expected}")]
    OptionCount {
        index: usize,
        title: String,
        count: usize,
        expected: usize,
    },
    #[error("stage {index} is missing its {field}")]
    EmptyStageField { index: usize, field: &'static str },
    #[error("stage {stage} option {option} is missing its {field}")]
    EmptyOptionField {
        stage: usize,
        option: usize,
        field: &'static str,
    },
    #[error("stage {stage} option {option} is worth {points} points, max {max}")]
    PointsOutOfRange {
        stage: usize,
        option: usize,
        points: u32,
        max: u32,
    },
    #[error("scenario catalog JSON is invalid: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Immutable, validated list of stages. Serializes as a bare JSON array of
/// stages, the same shape [`ScenarioCatalog::from_json`] reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ScenarioCatalog {
    stages: Vec<Stage>,
}

impl ScenarioCatalog {
    /// Validate and wrap a list of stages.
    ///
    /// # Errors
    ///
    /// Returns an error if the list is empty, a stage does not carry exactly
    /// three options, a required text field is blank, or an option is worth
    /// more than [`MAX_OPTION_POINTS`].
    pub fn new(stages: Vec<Stage>) -> Result<Self, CatalogError> {
        if stages.is_empty() {
            return Err(CatalogError::Empty);
        }
        for (index, stage) in stages.iter().enumerate() {
            validate_stage(index, stage)?;
        }
        Ok(Self { stages })
    }

    /// Parse a catalog from a JSON array of stages.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not match the stage shape or the
    /// content fails validation.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let stages: Vec<Stage> = serde_json::from_str(json)?;
        Self::new(stages)
    }

    /// The five-stage German partnership negotiation shipped with the game.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            stages: builtin_stages(),
        }
    }

    #[must_use]
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    #[must_use]
    pub fn stage(&self, index: usize) -> Option<&Stage> {
        self.stages.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Sum of the best option at every stage.
    #[must_use]
    pub fn max_stage_points(&self) -> u32 {
        self.stages
            .iter()
            .map(|stage| stage.options[stage.best_option_index()].points)
            .fold(0, u32::saturating_add)
    }
}

impl Default for ScenarioCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl<'de> Deserialize<'de> for ScenarioCatalog {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let stages = Vec::<Stage>::deserialize(deserializer)?;
        Self::new(stages).map_err(serde::de::Error::custom)
    }
}

fn validate_stage(index: usize, stage: &Stage) -> Result<(), CatalogError> {
    if stage.options.len() != OPTIONS_PER_STAGE {
        return Err(CatalogError::OptionCount {
            index,
            title: stage.title.clone(),
            count: stage.options.len(),
            expected: OPTIONS_PER_STAGE,
        });
    }
    for (field, value) in [
        ("title", &stage.title),
        ("scenario text", &stage.scenario_text),
        ("cultural tip", &stage.cultural_tip),
    ] {
        if value.trim().is_empty() {
            return Err(CatalogError::EmptyStageField { index, field });
        }
    }
    for (option_index, option) in stage.options.iter().enumerate() {
        if option.points > MAX_OPTION_POINTS {
            return Err(CatalogError::PointsOutOfRange {
                stage: index,
                option: option_index,
                points: option.points,
                max: MAX_OPTION_POINTS,
            });
        }
        for (field, value) in [
            ("response text", &option.response_text),
            ("strategy label", &option.strategy_label),
            ("feedback text", &option.feedback_text),
        ] {
            if value.trim().is_empty() {
                return Err(CatalogError::EmptyOptionField {
                    stage: index,
                    option: option_index,
                    field,
                });
            }
        }
    }
    Ok(())
}

fn option(response: &str, strategy: &str, points: u32, feedback: &str) -> StageOption {
    StageOption {
        response_text: response.to_string(),
        strategy_label: strategy.to_string(),
        points,
        feedback_text: feedback.to_string(),
    }
}

fn stage(title: &str, scenario: &str, tip: &str, options: [StageOption; 3]) -> Stage {
    Stage {
        title: title.to_string(),
        scenario_text: scenario.to_string(),
        cultural_tip: tip.to_string(),
        options: options.into(),
    }
}

fn builtin_stages() -> Vec<Stage> {
    vec![
        stage(
            "Opening Phase",
            "You are starting a negotiation with a German tech company about a joint AI research project. How do you open the conversation?",
            "In German business culture, it's important to start with formal greetings and establish clear agenda before diving into details.",
            [
                option(
                    "I propose we begin by aligning our core objectives for this collaboration.",
                    "Collaborative opening",
                    30,
                    "Excellent collaborative approach. This sets a cooperative tone and invites shared goal-setting.",
                ),
                option(
                    "Our data shows a 40% efficiency increase with our proposed framework.",
                    "Data-driven opening",
                    25,
                    "Strong factual opening. However, it might come across as slightly assertive for an opening.",
                ),
                option(
                    "Let's get straight to business – what are your requirements?",
                    "Direct opening",
                    20,
                    "Too direct for German business culture. They prefer relationship-building before diving into details.",
                ),
            ],
        ),
        stage(
            "Stating Positions",
            "The German counterpart states their position: 'We require full access to all research data and a 60% share of intellectual property.' How do you respond?",
            "German negotiators appreciate logical, structured counter-proposals with clear reasoning.",
            [
                option(
                    "I understand your position. From our perspective, we see value in a more balanced data-sharing model.",
                    "Acknowledging then reframing",
                    35,
                    "Perfect! You acknowledged their position while introducing your perspective without confrontation.",
                ),
                option(
                    "That's completely unacceptable. We can't agree to those terms.",
                    "Direct rejection",
                    10,
                    "Too confrontational. This will likely create resistance and damage the negotiation atmosphere.",
                ),
                option(
                    "What if we explore a phased approach to data sharing based on project milestones?",
                    "Creative alternative",
                    40,
                    "Excellent problem-solving approach! This shows flexibility while protecting your interests.",
                ),
            ],
        ),
        stage(
            "Bargaining Phase",
            "You're discussing financial terms. They say: 'Our maximum budget is €200,000 for the first phase.' Your target is €250,000. How do you proceed?",
            "In monochronic cultures like Germany, bargaining should be efficient but thorough. Package deals are often more successful than single-issue bargaining.",
            [
                option(
                    "I understand your budget constraints. Could we discuss additional value-added services to bridge the gap?",
                    "Value-expansion bargaining",
                    45,
                    "Brilliant strategy! Instead of direct price confrontation, you're expanding the value discussion.",
                ),
                option(
                    "Our standard rate is €250,000. We can't go lower.",
                    "Fixed position",
                    15,
                    "Too rigid. This leaves no room for creative solutions and may end the negotiation prematurely.",
                ),
                option(
                    "What would it take for us to meet at €225,000 with extended payment terms?",
                    "Package deal proposal",
                    50,
                    "Perfect use of negotiation language! You're creating a package deal that addresses multiple interests.",
                ),
            ],
        ),
        stage(
            "Handling Objections",
            "They object: 'Your timeline seems too aggressive given our compliance requirements.' How do you address this concern?",
            "When handling objections, German negotiators expect logical, systematic responses with clear next steps.",
            [
                option(
                    "You raise a valid point. Let's analyze which compliance steps could be streamlined.",
                    "Validating then problem-solving",
                    40,
                    "Excellent approach! You validated their concern while directing toward solutions.",
                ),
                option(
                    "Our previous projects show we can meet this timeline.",
                    "Authority-based response",
                    25,
                    "Good use of authority, but it doesn't directly address their specific compliance concerns.",
                ),
                option(
                    "That seems reasonable, however, we have deadlines from our funding body. Can we prioritize critical compliance steps?",
                    "Balanced compromise",
                    55,
                    "Perfect negotiation language! You acknowledged their point while stating your constraints and proposing prioritization.",
                ),
            ],
        ),
        stage(
            "Closing Phase",
            "You've reached agreement on main points. How do you move toward formal closure?",
            "German business culture requires thorough documentation. Closure is a process, not a single event.",
            [
                option(
                    "Can we agree on the following points and schedule a follow-up to finalize details?",
                    "Stepwise closure",
                    60,
                    "Perfect closing approach! This creates momentum while allowing for final adjustments.",
                ),
                option(
                    "Great! Let's sign the agreement now.",
                    "Immediate closure",
                    20,
                    "Too abrupt for German business culture. They prefer systematic documentation before signing.",
                ),
                option(
                    "Let's find a middle ground on the remaining minor points to conclude today.",
                    "Compromise closure",
                    50,
                    "Good compromise language, but ensure all details are documented before concluding.",
                ),
            ],
        ),
    ]
}
