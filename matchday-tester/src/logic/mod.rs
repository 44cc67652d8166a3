pub mod policy;
pub mod reports;
pub mod scenarios;
pub mod seeds;
pub mod tester;

pub use policy::Strategy;
pub use scenarios::{ScenarioCtx, all_keys, get_scenario, list_scenarios};
pub use seeds::resolve_seed_inputs;
pub use tester::*;
