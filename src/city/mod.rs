//! City layer - occupants, host lifecycle events and the region session

pub mod events;
pub mod occupant;
pub mod scenario;
pub mod session;

pub use events::{apply_event, EventEffect, LifecycleEvent, MessageKind, ResourceProperties};
pub use occupant::{Occupant, OccupantType, PropertyError, PropertyHolder, PropertyValue};
pub use scenario::{Scenario, ScenarioError, ScenarioStep, ScriptOutput};
pub use session::RegionSession;
