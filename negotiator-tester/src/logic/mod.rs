pub mod game_tester;
pub mod realtime;
pub mod reports;
pub mod scenarios;
pub mod tester;

pub use game_tester::GameTester;
pub use realtime::run_realtime_check;
pub use scenarios::{get_scenario, list_scenarios};
pub use tester::*;
