//! Lifecycle events delivered by the host and their effect on the ledger

use crate::city::occupant::{Occupant, OccupantType, PropertyHolder};
use crate::core::config::SupplyConfig;
use crate::core::types::ResourceAmount;
use crate::supply::ledger::RegionalSupply;

/// Host message ids the plugin subscribes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    InsertOccupant,
    RemoveOccupant,
    PostCityInit,
    PostCityShutdown,
    PostRegionInit,
}

impl MessageKind {
    /// Every notification the plugin needs
    pub const REQUIRED: [MessageKind; 5] = [
        MessageKind::InsertOccupant,
        MessageKind::RemoveOccupant,
        MessageKind::PostCityInit,
        MessageKind::PostCityShutdown,
        MessageKind::PostRegionInit,
    ];

    pub fn id(&self) -> u32 {
        match self {
            MessageKind::InsertOccupant => 0x99EF1142,
            MessageKind::RemoveOccupant => 0x99EF1143,
            MessageKind::PostCityInit => 0x26D31EC1,
            MessageKind::PostCityShutdown => 0x26D31EC3,
            MessageKind::PostRegionInit => 0xCBB5BB45,
        }
    }

    pub fn from_id(id: u32) -> Option<Self> {
        Self::REQUIRED.into_iter().find(|kind| kind.id() == id)
    }
}

/// A host notification with its typed payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    OccupantInserted(Occupant),
    OccupantRemoved(Occupant),
    CityInitialized,
    CityShutdown,
    RegionInitialized { directory_name: String },
}

impl LifecycleEvent {
    pub fn kind(&self) -> MessageKind {
        match self {
            LifecycleEvent::OccupantInserted(_) => MessageKind::InsertOccupant,
            LifecycleEvent::OccupantRemoved(_) => MessageKind::RemoveOccupant,
            LifecycleEvent::CityInitialized => MessageKind::PostCityInit,
            LifecycleEvent::CityShutdown => MessageKind::PostCityShutdown,
            LifecycleEvent::RegionInitialized { .. } => MessageKind::PostRegionInit,
        }
    }
}

/// Property ids that tie a building to the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceProperties {
    pub building_type: OccupantType,
    pub consumed: u32,
    pub produced: u32,
}

impl ResourceProperties {
    pub fn from_config(config: &SupplyConfig) -> Self {
        Self {
            building_type: OccupantType(config.building_occupant_type),
            consumed: config.consumed_property,
            produced: config.produced_property,
        }
    }
}

impl Default for ResourceProperties {
    fn default() -> Self {
        Self::from_config(&SupplyConfig::default())
    }
}

/// What the session has to do after an event was applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventEffect {
    /// Building contributions were added to or removed from the ledger
    LedgerUpdated,
    /// The event did not concern the ledger
    Ignored,
    /// A city finished loading; scripting entry points should be registered
    RegisterScripts,
    /// The player left a city; the ledger is saved on the next region init
    CityExited,
    /// A region finished loading
    RegionEntered { directory_name: String },
}

#[derive(Clone, Copy)]
enum Direction {
    Inserted,
    Removed,
}

/// Apply one lifecycle event to the ledger
///
/// Only occupant events mutate the ledger. Everything that needs I/O or
/// session state is returned as an [`EventEffect`] for the caller to carry out.
pub fn apply_event<S>(
    supply: &mut S,
    event: &LifecycleEvent,
    properties: &ResourceProperties,
) -> EventEffect
where
    S: RegionalSupply + ?Sized,
{
    match event {
        LifecycleEvent::OccupantInserted(occupant) => {
            apply_occupant(supply, occupant, properties, Direction::Inserted)
        }
        LifecycleEvent::OccupantRemoved(occupant) => {
            apply_occupant(supply, occupant, properties, Direction::Removed)
        }
        LifecycleEvent::CityInitialized => EventEffect::RegisterScripts,
        LifecycleEvent::CityShutdown => EventEffect::CityExited,
        LifecycleEvent::RegionInitialized { directory_name } => EventEffect::RegionEntered {
            directory_name: directory_name.clone(),
        },
    }
}

fn apply_occupant<S>(
    supply: &mut S,
    occupant: &Occupant,
    properties: &ResourceProperties,
    direction: Direction,
) -> EventEffect
where
    S: RegionalSupply + ?Sized,
{
    if occupant.occupant_type != properties.building_type {
        return EventEffect::Ignored;
    }

    let holder = &occupant.properties;

    for pair in checked_amounts(holder, properties.consumed) {
        match direction {
            Direction::Inserted => supply.add_to_demand(pair.id, pair.amount),
            Direction::Removed => supply.remove_from_demand(pair.id, pair.amount),
        }
    }

    for pair in checked_amounts(holder, properties.produced) {
        match direction {
            Direction::Inserted => supply.add_to_supply(pair.id, pair.amount),
            Direction::Removed => supply.remove_from_supply(pair.id, pair.amount),
        }
    }

    EventEffect::LedgerUpdated
}

/// Resource pairs of one property; a malformed property is logged and skipped
fn checked_amounts(holder: &PropertyHolder, property_id: u32) -> Vec<ResourceAmount> {
    match holder.resource_amounts(property_id) {
        Ok(pairs) => pairs,
        Err(_) => {
            match holder.display_name() {
                Some(name) => tracing::error!(
                    "{} has an invalid 0x{:08X} property, the values must be id/amount pair(s).",
                    name,
                    property_id
                ),
                None => tracing::error!(
                    "Invalid 0x{:08X} property, the values must be id/amount pair(s).",
                    property_id
                ),
            }
            Vec::new()
        }
    }
}
