//! Occupants and the properties that declare their resource use

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::types::ResourceAmount;

/// Property holding the occupant's exemplar name
pub const EXEMPLAR_NAME: u32 = 0x0000_0020;

/// Occupant type id as reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OccupantType(pub u32);

impl OccupantType {
    pub const BUILDING: OccupantType = OccupantType(0x278128A0);
}

/// Value of a single occupant property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyValue {
    Uint32(u32),
    Uint32Array(Vec<u32>),
    Text(String),
}

/// Errors in a building's resource property
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropertyError {
    #[error("property 0x{property_id:08X} has {count} values, expected id/amount pairs")]
    OddLength { property_id: u32, count: usize },
}

/// Property id to value map of one occupant
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyHolder {
    properties: AHashMap<u32, PropertyValue>,
}

impl PropertyHolder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, property_id: u32, value: PropertyValue) -> Self {
        self.set(property_id, value);
        self
    }

    pub fn set(&mut self, property_id: u32, value: PropertyValue) {
        self.properties.insert(property_id, value);
    }

    pub fn get(&self, property_id: u32) -> Option<&PropertyValue> {
        self.properties.get(&property_id)
    }

    /// Name shown in diagnostics, if the exemplar has one
    pub fn display_name(&self) -> Option<&str> {
        match self.get(EXEMPLAR_NAME) {
            Some(PropertyValue::Text(name)) if !name.is_empty() => Some(name),
            _ => None,
        }
    }

    /// Read the id/amount pairs stored in `property_id`
    ///
    /// A missing property, a non-array value or an empty array yields no
    /// pairs. An odd number of values is an error.
    pub fn resource_amounts(&self, property_id: u32) -> Result<Vec<ResourceAmount>, PropertyError> {
        let values = match self.get(property_id) {
            Some(PropertyValue::Uint32Array(values)) => values,
            _ => return Ok(Vec::new()),
        };

        if values.len() % 2 != 0 {
            return Err(PropertyError::OddLength {
                property_id,
                count: values.len(),
            });
        }

        Ok(values
            .chunks_exact(2)
            .map(|pair| ResourceAmount::new(pair[0], pair[1]))
            .collect())
    }
}

/// A placed object in the city (building, prop, flora, ...)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occupant {
    pub occupant_type: OccupantType,
    pub properties: PropertyHolder,
}

impl Occupant {
    pub fn new(occupant_type: OccupantType, properties: PropertyHolder) -> Self {
        Self {
            occupant_type,
            properties,
        }
    }

    pub fn building(properties: PropertyHolder) -> Self {
        Self::new(OccupantType::BUILDING, properties)
    }
}
