//! Mission briefing content shown before preparation starts.
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PartyProfile {
    pub name: &'static str,
    pub facts: &'static [&'static str],
    pub highlight: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuickTip {
    pub title: &'static str,
    pub body: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MissionBrief {
    pub title: &'static str,
    pub client: PartyProfile,
    pub counterpart: PartyProfile,
    pub scenario: &'static str,
    pub learning_objectives: &'static [&'static str],
    pub readiness_checklist: &'static [&'static str],
    pub quick_tips: &'static [QuickTip],
    pub team_name_examples: &'static [&'static str],
}

pub const MISSION_BRIEF: MissionBrief = MissionBrief {
    title: "Mission Briefing: The Synapse Accord",
    client: PartyProfile {
        name: "Heritage Interactive",
        facts: &[
            "Type: National museum consortium",
            "Objective: AI virtual curator platform",
            "Budget: $2-3M, milestone-based",
            "Must: Own cultural narrative rights",
            "Goal: Digital transformation leader",
        ],
        highlight: "Top Priority: Cultural Integrity & Data Sovereignty",
    },
    counterpart: PartyProfile {
        name: "NeuraLogic Inc.",
        facts: &[
            "Culture: Polychronic (fluid time perception)",
            "Values: Relationships over schedules",
            "Decisions: Consensus-based, collective",
            "Tech: Cutting-edge AI/ML solutions",
            "Goal: Expand into cultural sector",
        ],
        highlight: "Time is flexible for them. Efficiency ≠ speed. Build relationships first!",
    },
    scenario: "Heritage Interactive needs an intelligent system to contextualize artifacts for \
               global audiences. NeuraLogic has the technology but lacks cultural domain \
               expertise. You must broker a partnership that respects HI's cultural mission \
               while leveraging NeuraLogic's technical capabilities.",
    learning_objectives: &[
        "Apply stage-specific negotiation clichés strategically",
        "Adapt persuasive language (logic, collaboration, authority) to scenarios",
        "Diagnose and respond to time-orientation challenges",
        "Formulate SMART objectives for cross-cultural negotiations",
        "Navigate virtual communication barriers effectively",
    ],
    readiness_checklist: &[
        "Understood client objectives and constraints",
        "Recognized cultural differences with NeuraLogic",
        "Ready to adapt negotiation strategies",
        "Prepared to make strategic decisions",
    ],
    quick_tips: &[
        QuickTip {
            title: "Focus on Relationships",
            body: "With polychronic cultures, building trust is more important than strict timelines.",
        },
        QuickTip {
            title: "Listen Actively",
            body: "Pay attention to indirect communication and read between the lines.",
        },
        QuickTip {
            title: "Be Flexible",
            body: "Adapt your strategy based on cultural cues and negotiation dynamics.",
        },
    ],
    team_name_examples: &["Global Negotiators", "Cultural Bridge", "Synapse Masters"],
};
