pub mod hallway;
pub mod scenario;

pub use hallway::Hallway;
pub use scenario::{list_scenarios, scenario, Scenario};
