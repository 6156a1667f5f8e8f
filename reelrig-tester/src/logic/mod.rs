pub mod player;
pub mod reports;
pub mod scenarios;
pub mod seeds;
pub mod tester;

pub use scenarios::{expand_keys, get_scenario, list_scenarios};
pub use seeds::parse_seeds;
pub use tester::*;
