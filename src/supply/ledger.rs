//! Ledger - region-level running totals of resource supply and demand

use ahash::AHashMap;

use crate::core::types::{Quantity, ResourceEntry, ResourceId};

/// The mutators and query shared by every caller of the ledger
///
/// Building lifecycle handling and the scripting bridge are written against
/// this trait so they can borrow whichever ledger the active session owns.
pub trait RegionalSupply {
    fn add_to_demand(&mut self, id: ResourceId, amount: u32);
    fn remove_from_demand(&mut self, id: ResourceId, amount: u32);
    fn add_to_supply(&mut self, id: ResourceId, amount: u32);
    fn remove_from_supply(&mut self, id: ResourceId, amount: u32);

    fn resource_quantity(&self, id: ResourceId) -> Quantity;
}

/// Net quantity of every resource touched in the region
///
/// Supply and demand collapse into one signed balance per resource. Entries
/// are created on first mutation and kept even when they return to zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    balances: AHashMap<ResourceId, Quantity>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of resources with an entry
    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.balances.clear();
    }

    /// Entries in unspecified order
    pub fn iter(&self) -> impl Iterator<Item = (ResourceId, Quantity)> + '_ {
        self.balances.iter().map(|(id, quantity)| (*id, *quantity))
    }

    /// Entries sorted by resource id, for display
    pub fn sorted_entries(&self) -> Vec<ResourceEntry> {
        let mut entries: Vec<ResourceEntry> = self
            .iter()
            .map(|(id, quantity)| ResourceEntry { id, quantity })
            .collect();
        entries.sort_by_key(|entry| entry.id);
        entries
    }

    /// Place a persisted balance; an id that already has an entry keeps it
    pub(crate) fn insert_balance(&mut self, id: ResourceId, quantity: Quantity) {
        self.balances.entry(id).or_insert(quantity);
    }

    // Overflow is out of scope at game scale, but it must never panic.
    fn increase(&mut self, id: ResourceId, amount: u32) {
        let balance = self.balances.entry(id).or_insert(0);
        *balance = balance.wrapping_add(Quantity::from(amount));
    }

    fn decrease(&mut self, id: ResourceId, amount: u32) {
        let balance = self.balances.entry(id).or_insert(0);
        *balance = balance.wrapping_sub(Quantity::from(amount));
    }
}

impl RegionalSupply for Ledger {
    /// New demand reduces the net balance
    fn add_to_demand(&mut self, id: ResourceId, amount: u32) {
        self.remove_from_supply(id, amount);
    }

    /// Cancelled demand restores the net balance
    fn remove_from_demand(&mut self, id: ResourceId, amount: u32) {
        self.add_to_supply(id, amount);
    }

    fn add_to_supply(&mut self, id: ResourceId, amount: u32) {
        self.increase(id, amount);
    }

    fn remove_from_supply(&mut self, id: ResourceId, amount: u32) {
        self.decrease(id, amount);
    }

    /// Current balance, zero for resources that were never touched
    fn resource_quantity(&self, id: ResourceId) -> Quantity {
        self.balances.get(&id).copied().unwrap_or(0)
    }
}
