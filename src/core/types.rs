//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a resource type (water, ore, goods, ...)
///
/// The ledger imposes no structure on the value; it is only a map key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResourceId(pub u32);

impl ResourceId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl From<u32> for ResourceId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

/// Net quantity of a resource across the region (supply minus demand)
pub type Quantity = i64;

/// One id/amount pair declared by a building's resource property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceAmount {
    pub id: ResourceId,
    pub amount: u32,
}

impl ResourceAmount {
    pub fn new(id: impl Into<ResourceId>, amount: u32) -> Self {
        Self { id: id.into(), amount }
    }
}

/// One ledger balance as listed or written out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceEntry {
    pub id: ResourceId,
    pub quantity: Quantity,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_id_equality() {
        let a = ResourceId(1);
        let b = ResourceId::new(1);
        let c = ResourceId(2);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_resource_id_hash() {
        use std::collections::HashMap;
        let mut map: HashMap<ResourceId, &str> = HashMap::new();
        map.insert(ResourceId(7), "ore");
        assert_eq!(map.get(&ResourceId(7)), Some(&"ore"));
    }

    #[test]
    fn test_resource_id_display_is_hex() {
        assert_eq!(ResourceId(0x16F4C223).to_string(), "0x16F4C223");
        assert_eq!(ResourceId(1).to_string(), "0x00000001");
    }

    #[test]
    fn test_resource_amount_from_raw_id() {
        let pair = ResourceAmount::new(5u32, 10);
        assert_eq!(pair.id, ResourceId(5));
        assert_eq!(pair.amount, 10);
    }
}
