//! Scripting bridge - the `regional_supply` entry points
//!
//! Scripts hand over loosely typed values. Every argument is checked before
//! it reaches the ledger; a call with bad arguments does nothing (mutators)
//! or answers zero (query) and never reports an error back to the script.

use crate::core::types::{Quantity, ResourceId};
use crate::scripting::call::ScriptCall;
use crate::scripting::ScriptError;
use crate::supply::ledger::RegionalSupply;

/// A value passed between the scripting host and the bridge
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptValue {
    Nil,
    Boolean(bool),
    Number(f64),
    String(String),
}

impl ScriptValue {
    /// The value as an unsigned 32-bit integer, if it is a number in range
    ///
    /// The range check runs on the f64 before narrowing so that values just past
    /// `u32::MAX` are rejected instead of saturating. Fractions inside the
    /// range are truncated toward zero.
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            ScriptValue::Number(n) if (0.0..=f64::from(u32::MAX)).contains(n) => Some(*n as u32),
            _ => None,
        }
    }
}

impl From<Quantity> for ScriptValue {
    fn from(quantity: Quantity) -> Self {
        // Precision loss past 2^53 matches what a script number can hold
        ScriptValue::Number(quantity as f64)
    }
}

/// One of the five functions exposed to scripts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryPoint {
    AddToDemand,
    RemoveFromDemand,
    AddToSupply,
    RemoveFromSupply,
    GetResourceQuantity,
}

impl EntryPoint {
    pub const ALL: [EntryPoint; 5] = [
        EntryPoint::AddToDemand,
        EntryPoint::RemoveFromDemand,
        EntryPoint::AddToSupply,
        EntryPoint::RemoveFromSupply,
        EntryPoint::GetResourceQuantity,
    ];

    /// Name the function is registered under
    pub fn name(&self) -> &'static str {
        match self {
            EntryPoint::AddToDemand => "add_to_demand",
            EntryPoint::RemoveFromDemand => "remove_from_demand",
            EntryPoint::AddToSupply => "add_to_supply",
            EntryPoint::RemoveFromSupply => "remove_from_supply",
            EntryPoint::GetResourceQuantity => "get_resource_quantity",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|entry| entry.name() == name)
    }
}

/// Routes script calls to the ledger of the active session
///
/// The bridge only borrows the ledger, so it cannot outlive the session that
/// owns it.
pub struct ScriptBridge<'a> {
    table: &'a str,
    supply: &'a mut dyn RegionalSupply,
}

impl<'a> ScriptBridge<'a> {
    pub fn new(table: &'a str, supply: &'a mut dyn RegionalSupply) -> Self {
        Self { table, supply }
    }

    /// Invoke an entry point with raw script arguments
    ///
    /// Returns the values pushed back to the script: nothing for mutators,
    /// the quantity for the query.
    pub fn invoke(&mut self, entry: EntryPoint, args: &[ScriptValue]) -> Vec<ScriptValue> {
        match entry {
            EntryPoint::AddToDemand => self.add_to_demand(args),
            EntryPoint::RemoveFromDemand => self.remove_from_demand(args),
            EntryPoint::AddToSupply => self.add_to_supply(args),
            EntryPoint::RemoveFromSupply => self.remove_from_supply(args),
            EntryPoint::GetResourceQuantity => return vec![self.get_resource_quantity(args)],
        }
        Vec::new()
    }

    /// Dispatch a parsed `table.function(args)` call
    pub fn call(&mut self, call: &ScriptCall) -> Result<Vec<ScriptValue>, ScriptError> {
        let entry = EntryPoint::from_name(&call.function)
            .filter(|_| call.table == self.table)
            .ok_or_else(|| ScriptError::UnknownFunction(call.qualified_name()))?;
        Ok(self.invoke(entry, &call.args))
    }

    pub fn add_to_demand(&mut self, args: &[ScriptValue]) {
        if let Some((id, amount)) = id_and_amount(args) {
            self.supply.add_to_demand(id, amount);
        }
    }

    pub fn remove_from_demand(&mut self, args: &[ScriptValue]) {
        if let Some((id, amount)) = id_and_amount(args) {
            self.supply.remove_from_demand(id, amount);
        }
    }

    pub fn add_to_supply(&mut self, args: &[ScriptValue]) {
        if let Some((id, amount)) = id_and_amount(args) {
            self.supply.add_to_supply(id, amount);
        }
    }

    pub fn remove_from_supply(&mut self, args: &[ScriptValue]) {
        if let Some((id, amount)) = id_and_amount(args) {
            self.supply.remove_from_supply(id, amount);
        }
    }

    pub fn get_resource_quantity(&self, args: &[ScriptValue]) -> ScriptValue {
        let quantity = match args {
            [id] => id
                .as_u32()
                .map(|id| self.supply.resource_quantity(ResourceId(id)))
                .unwrap_or(0),
            _ => 0,
        };
        ScriptValue::from(quantity)
    }
}

fn id_and_amount(args: &[ScriptValue]) -> Option<(ResourceId, u32)> {
    match args {
        [id, amount] => Some((ResourceId(id.as_u32()?), amount.as_u32()?)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::supply::ledger::Ledger;

    fn num(n: f64) -> ScriptValue {
        ScriptValue::Number(n)
    }

    #[test]
    fn test_u32_boundary() {
        assert_eq!(num(4294967295.0).as_u32(), Some(u32::MAX));
        assert_eq!(num(4294967296.0).as_u32(), None);
        assert_eq!(num(0.0).as_u32(), Some(0));
        assert_eq!(num(-1.0).as_u32(), None);
        assert_eq!(num(f64::NAN).as_u32(), None);
        assert_eq!(num(f64::INFINITY).as_u32(), None);
        assert_eq!(num(12.9).as_u32(), Some(12));
        assert_eq!(ScriptValue::String("5".into()).as_u32(), None);
        assert_eq!(ScriptValue::Nil.as_u32(), None);
    }

    #[test]
    fn test_mutators_reach_ledger() {
        let mut ledger = Ledger::new();
        {
            let mut bridge = ScriptBridge::new("regional_supply", &mut ledger);
            bridge.add_to_demand(&[num(1.0), num(50.0)]);
            bridge.remove_from_demand(&[num(1.0), num(25.0)]);
            bridge.add_to_supply(&[num(1.0), num(75.0)]);
            bridge.remove_from_supply(&[num(1.0), num(25.0)]);
            assert_eq!(bridge.get_resource_quantity(&[num(1.0)]), num(25.0));
        }
        assert_eq!(ledger.resource_quantity(ResourceId(1)), 25);
    }

    #[test]
    fn test_wrong_argument_count_is_ignored() {
        let mut ledger = Ledger::new();
        {
            let mut bridge = ScriptBridge::new("regional_supply", &mut ledger);
            bridge.add_to_supply(&[num(1.0), num(2.0), num(3.0)]);
            bridge.add_to_demand(&[num(1.0)]);
            bridge.remove_from_supply(&[]);
        }
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_out_of_range_amount_is_ignored() {
        let mut ledger = Ledger::new();
        {
            let mut bridge = ScriptBridge::new("regional_supply", &mut ledger);
            bridge.add_to_supply(&[num(1.0), num(4294967296.0)]);
            bridge.add_to_supply(&[num(-1.0), num(10.0)]);
            bridge.add_to_supply(&[ScriptValue::String("1".into()), num(10.0)]);
        }
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_max_amount_is_accepted() {
        let mut ledger = Ledger::new();
        ScriptBridge::new("regional_supply", &mut ledger)
            .add_to_supply(&[num(1.0), num(4294967295.0)]);
        assert_eq!(ledger.resource_quantity(ResourceId(1)), 4294967295);
    }

    #[test]
    fn test_query_with_bad_arguments_returns_zero() {
        let mut ledger = Ledger::new();
        ledger.add_to_supply(ResourceId(1), 10);
        let bridge = ScriptBridge::new("regional_supply", &mut ledger);

        assert_eq!(bridge.get_resource_quantity(&[]), num(0.0));
        assert_eq!(bridge.get_resource_quantity(&[num(1.0), num(1.0)]), num(0.0));
        assert_eq!(bridge.get_resource_quantity(&[ScriptValue::Boolean(true)]), num(0.0));
        assert_eq!(bridge.get_resource_quantity(&[num(1.0)]), num(10.0));
    }

    #[test]
    fn test_query_returns_negative_balance() {
        let mut ledger = Ledger::new();
        ledger.add_to_demand(ResourceId(5), 10);
        let bridge = ScriptBridge::new("regional_supply", &mut ledger);
        assert_eq!(bridge.get_resource_quantity(&[num(5.0)]), num(-10.0));
    }

    #[test]
    fn test_invoke_results() {
        let mut ledger = Ledger::new();
        let mut bridge = ScriptBridge::new("regional_supply", &mut ledger);
        assert!(bridge.invoke(EntryPoint::AddToSupply, &[num(2.0), num(3.0)]).is_empty());
        assert_eq!(
            bridge.invoke(EntryPoint::GetResourceQuantity, &[num(2.0)]),
            vec![num(3.0)]
        );
    }

    #[test]
    fn test_entry_point_names() {
        for entry in EntryPoint::ALL {
            assert_eq!(EntryPoint::from_name(entry.name()), Some(entry));
        }
        assert_eq!(EntryPoint::from_name("drop_table"), None);
    }
}
