//! Scenario files - scripted sequences of host events for replay
//!
//! ```toml
//! [[steps]]
//! kind = "region_init"
//! region = "Timbuktu"
//!
//! [[steps]]
//! kind = "occupant_inserted"
//! name = "Coal Mine"
//! produced = [1, 100]
//! ```

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::city::events::{LifecycleEvent, ResourceProperties};
use crate::city::occupant::{Occupant, OccupantType, PropertyHolder, PropertyValue, EXEMPLAR_NAME};
use crate::city::session::RegionSession;
use crate::scripting::bridge::ScriptValue;
use crate::scripting::call::ScriptCall;
use crate::scripting::ScriptError;

/// Errors that can occur when loading a scenario
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("step {index}: {source}")]
    InvalidCall {
        index: usize,
        #[source]
        source: ScriptError,
    },
}

#[derive(Debug, Deserialize)]
struct ScenarioFile {
    #[serde(default)]
    steps: Vec<StepToml>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum StepToml {
    RegionInit { region: String },
    CityInit,
    CityShutdown,
    OccupantInserted(BuildingToml),
    OccupantRemoved(BuildingToml),
    Script { call: String },
}

#[derive(Debug, Deserialize)]
struct BuildingToml {
    name: Option<String>,
    occupant_type: Option<u32>,
    #[serde(default)]
    consumed: Vec<u32>,
    #[serde(default)]
    produced: Vec<u32>,
}

impl BuildingToml {
    fn into_occupant(self, properties: &ResourceProperties) -> Occupant {
        let mut holder = PropertyHolder::new();
        if let Some(name) = self.name {
            holder.set(EXEMPLAR_NAME, PropertyValue::Text(name));
        }
        if !self.consumed.is_empty() {
            holder.set(properties.consumed, PropertyValue::Uint32Array(self.consumed));
        }
        if !self.produced.is_empty() {
            holder.set(properties.produced, PropertyValue::Uint32Array(self.produced));
        }

        let occupant_type = self
            .occupant_type
            .map(OccupantType)
            .unwrap_or(properties.building_type);
        Occupant::new(occupant_type, holder)
    }
}

/// One step of a scenario
#[derive(Debug, Clone, PartialEq)]
pub enum ScenarioStep {
    Event(LifecycleEvent),
    Script(ScriptCall),
}

/// Result of running one script step
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptOutput {
    pub call: ScriptCall,
    pub result: Result<Vec<ScriptValue>, ScriptError>,
}

/// An ordered list of scenario steps
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scenario {
    pub steps: Vec<ScenarioStep>,
}

impl Scenario {
    /// Load a scenario from a TOML file
    pub fn load(path: &Path, properties: &ResourceProperties) -> Result<Self, ScenarioError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_toml(&content, properties)
    }

    /// Parse a scenario from a TOML string
    pub fn parse_toml(content: &str, properties: &ResourceProperties) -> Result<Self, ScenarioError> {
        let file: ScenarioFile = toml::from_str(content)?;

        let mut steps = Vec::with_capacity(file.steps.len());
        for (index, step) in file.steps.into_iter().enumerate() {
            let step = match step {
                StepToml::RegionInit { region } => {
                    ScenarioStep::Event(LifecycleEvent::RegionInitialized {
                        directory_name: region,
                    })
                }
                StepToml::CityInit => ScenarioStep::Event(LifecycleEvent::CityInitialized),
                StepToml::CityShutdown => ScenarioStep::Event(LifecycleEvent::CityShutdown),
                StepToml::OccupantInserted(building) => ScenarioStep::Event(
                    LifecycleEvent::OccupantInserted(building.into_occupant(properties)),
                ),
                StepToml::OccupantRemoved(building) => ScenarioStep::Event(
                    LifecycleEvent::OccupantRemoved(building.into_occupant(properties)),
                ),
                StepToml::Script { call } => ScenarioStep::Script(
                    ScriptCall::parse(&call)
                        .map_err(|source| ScenarioError::InvalidCall { index, source })?,
                ),
            };
            steps.push(step);
        }

        Ok(Self { steps })
    }

    /// Feed every step to the session, collecting script results
    pub fn run(&self, session: &mut RegionSession) -> Vec<ScriptOutput> {
        let mut outputs = Vec::new();
        for step in &self.steps {
            match step {
                ScenarioStep::Event(event) => {
                    let effect = session.handle(event);
                    tracing::debug!("{:?} -> {:?}", event.kind(), effect);
                }
                ScenarioStep::Script(call) => outputs.push(ScriptOutput {
                    call: call.clone(),
                    result: session.run_script(call),
                }),
            }
        }
        outputs
    }
}
