//! Global Negotiator's Quest game engine
//!
//! Platform-agnostic core flow for the cross-cultural negotiation training game:
//! the four-phase state machine, stage progression, scoring history and the
//! debrief analysis. Presentation layers read render inputs from
//! [`PhaseController`] and feed player events back into it.

pub mod analysis;
pub mod briefing;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod constants;
pub mod controller;
pub mod error;
pub mod history;
pub mod phase;
pub mod preparation;
pub mod progression;
#[cfg(feature = "async")]
pub mod realtime;
pub mod result;
pub mod scheduler;
pub mod session;

// Re-export commonly used types
pub use analysis::{
    Grade, PerformanceReport, StrategyBreakdown, StrategyBucket, StrategyTally, analyze,
    cultural_score,
};
pub use briefing::{MISSION_BRIEF, MissionBrief};
pub use catalog::{CatalogError, ScenarioCatalog, Stage, StageOption};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ConfigError, GameConfig};
pub use controller::{GameEvent, PhaseController};
pub use error::{GameError, LoadError};
pub use history::{ChoiceLog, HistoryEntry, HistoryLog};
pub use phase::{Phase, format_countdown};
pub use preparation::{CulturalAdjustment, SMART_CRITERIA, SmartCriterion, SmartGoalKey, SmartGoals};
pub use progression::{OptionFeedback, StageProgression, StageStatus, StageView};
#[cfg(feature = "async")]
pub use realtime::drive_realtime;
pub use result::{ResultExport, ShareOutcome, ShareTarget, export_filename, share_results};
pub use session::SessionState;

/// Trait for abstracting where content and tuning come from
/// Platform-specific implementations should provide this
pub trait DataLoader {
    type Error: std::error::Error + Send + Sync + 'static + From<ConfigError>;

    /// Load the negotiation stages
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded or fails validation.
    fn load_catalog(&self) -> Result<ScenarioCatalog, Self::Error>;

    /// Load timing and scoring configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or parsed.
    fn load_config(&self) -> Result<GameConfig, Self::Error>;
}

/// Serves the content compiled into the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticDataLoader;

impl DataLoader for StaticDataLoader {
    type Error = LoadError;

    fn load_catalog(&self) -> Result<ScenarioCatalog, Self::Error> {
        Ok(ScenarioCatalog::builtin())
    }

    fn load_config(&self) -> Result<GameConfig, Self::Error> {
        Ok(GameConfig::default())
    }
}

/// Loads content from JSON documents, falling back to the built-in values for
/// anything not supplied. `catalog_json` is a bare array of stages, the shape
/// `ScenarioCatalog` serializes to.
#[derive(Debug, Clone, Default)]
pub struct JsonDataLoader {
    pub catalog_json: Option<String>,
    pub config_json: Option<String>,
}

impl DataLoader for JsonDataLoader {
    type Error = LoadError;

    fn load_catalog(&self) -> Result<ScenarioCatalog, Self::Error> {
        match &self.catalog_json {
            Some(json) => Ok(ScenarioCatalog::from_json(json)?),
            None => Ok(ScenarioCatalog::builtin()),
        }
    }

    fn load_config(&self) -> Result<GameConfig, Self::Error> {
        match &self.config_json {
            Some(json) => Ok(GameConfig::from_json(json)?),
            None => Ok(GameConfig::default()),
        }
    }
}

/// Main game engine for starting playthroughs
pub struct GameEngine<L>
where
    L: DataLoader,
{
    data_loader: L,
}

impl<L> GameEngine<L>
where
    L: DataLoader,
{
    /// Create a new game engine with the provided data loader
    pub const fn new(data_loader: L) -> Self {
        Self { data_loader }
    }

    pub const fn data_loader(&self) -> &L {
        &self.data_loader
    }

    /// Start a playthrough stamped with the system clock.
    ///
    /// # Errors
    ///
    /// Returns an error if content or configuration cannot be loaded or is invalid.
    pub fn new_controller(&self) -> Result<PhaseController, L::Error> {
        self.new_controller_with_clock(SystemClock)
    }

    /// Start a playthrough using `clock` for timestamps.
    ///
    /// # Errors
    ///
    /// Returns an error if content or configuration cannot be loaded or is invalid.
    pub fn new_controller_with_clock<C: Clock>(
        &self,
        clock: C,
    ) -> Result<PhaseController<C>, L::Error> {
        let config = self.data_loader.load_config()?;
        config.validate()?;
        let catalog = self.data_loader.load_catalog()?;
        log::debug!(
            "starting playthrough with {} stages for '{}'",
            catalog.len(),
            config.default_team_name
        );
        Ok(PhaseController::with_clock(config, catalog, clock))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Default)]
    struct BrokenConfigLoader;

    impl DataLoader for BrokenConfigLoader {
        type Error = LoadError;

        fn load_catalog(&self) -> Result<ScenarioCatalog, Self::Error> {
            Ok(ScenarioCatalog::builtin())
        }

        fn load_config(&self) -> Result<GameConfig, Self::Error> {
            Ok(GameConfig {
                stage_feedback_delay_ms: 0,
                ..GameConfig::default()
            })
        }
    }

    #[test]
    fn static_loader_builds_fresh_briefing() {
        let engine = GameEngine::new(StaticDataLoader);
        let game = engine.new_controller().unwrap();
        assert_eq!(game.phase(), Phase::Briefing);
        assert_eq!(game.catalog().len(), 5);
        assert_eq!(game.score(), 0);
    }

    #[test]
    fn engine_rejects_invalid_config() {
        let engine = GameEngine::new(BrokenConfigLoader);
        let err = engine.new_controller().unwrap_err();
        assert!(matches!(
            err,
            LoadError::Config(ConfigError::Zero {
                field: "stage_feedback_delay_ms"
            })
        ));
    }

    #[test]
    fn json_loader_falls_back_to_builtin_content() {
        let loader = JsonDataLoader {
            catalog_json: None,
            config_json: Some(r#"{"default_team_name":"Cultural Bridge"}"#.to_string()),
        };
        let game = GameEngine::new(loader).new_controller().unwrap();
        assert_eq!(game.state().team_name, "Cultural Bridge");
        assert_eq!(game.config().debrief_bonus, 200);
        assert_eq!(game.catalog(), &ScenarioCatalog::builtin());
    }

    #[test]
    fn json_loader_surfaces_catalog_errors() {
        let loader = JsonDataLoader {
            catalog_json: Some("[]".to_string()),
            config_json: None,
        };
        let result = GameEngine::new(loader).new_controller();
        assert!(matches!(result, Err(LoadError::Catalog(CatalogError::Empty))));
    }

    #[test]
    fn json_loader_rejects_overflowing_points() {
        let mut stages = ScenarioCatalog::builtin().stages().to_vec();
        for option in stages.iter_mut().flat_map(|stage| stage.options.iter_mut()) {
            option.points = u32::MAX / 2 + 10;
        }
        let loader = JsonDataLoader {
            catalog_json: Some(serde_json::to_string(&stages).unwrap()),
            config_json: None,
        };
        let result = GameEngine::new(loader).new_controller();
        assert!(matches!(
            result,
            Err(LoadError::Catalog(CatalogError::PointsOutOfRange { stage: 0, option: 0, .. }))
        ));
    }
}
