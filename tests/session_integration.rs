//! Integration tests for the region session
//!
//! These tests drive a `RegionSession` the way the host game does:
//! - Region init resolves the data file and loads the ledger
//! - Buildings entering and leaving a city move supply and demand
//! - Leaving a city saves the ledger on the following region init
//! - Scenario files replay the same sequence from TOML

use regional_supply::city::{
    EventEffect, LifecycleEvent, Occupant, OccupantType, PropertyHolder, PropertyValue,
    RegionSession, ResourceProperties, Scenario,
};
use regional_supply::core::types::ResourceId;
use regional_supply::core::SupplyConfig;
use regional_supply::scripting::{ScriptError, ScriptValue};
use regional_supply::supply::RegionalSupply;

use uuid::Uuid;

fn config_in_temp_dir() -> SupplyConfig {
    SupplyConfig {
        regions_directory: std::env::temp_dir().join(format!("regional-supply-{}", Uuid::new_v4())),
        ..SupplyConfig::default()
    }
}

fn building(consumed: Vec<u32>, produced: Vec<u32>) -> Occupant {
    let config = SupplyConfig::default();
    Occupant::building(
        PropertyHolder::new()
            .with(config.consumed_property, PropertyValue::Uint32Array(consumed))
            .with(config.produced_property, PropertyValue::Uint32Array(produced)),
    )
}

fn region_init(name: &str) -> LifecycleEvent {
    LifecycleEvent::RegionInitialized {
        directory_name: name.to_string(),
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

/// Integration test: a full play session across two cities of one region
///
/// 1. Enter the region (no data yet)
/// 2. Load city A, place a water pump, leave
/// 3. Region init saves the ledger
/// 4. Load city B, place a factory that consumes water
/// 5. A fresh session sees the saved balances
#[test]
fn test_two_cities_share_one_ledger() {
    let config = config_in_temp_dir();
    let mut session = RegionSession::new(config.clone());

    session.handle(&region_init("Timbuktu"));
    assert!(session.ledger().is_empty());

    session.handle(&LifecycleEvent::CityInitialized);
    let pump = building(vec![], vec![1, 100]);
    assert_eq!(
        session.handle(&LifecycleEvent::OccupantInserted(pump)),
        EventEffect::LedgerUpdated
    );
    session.handle(&LifecycleEvent::CityShutdown);
    session.handle(&region_init("Timbuktu"));

    session.handle(&LifecycleEvent::CityInitialized);
    let factory = building(vec![1, 30], vec![2, 5]);
    session.handle(&LifecycleEvent::OccupantInserted(factory));
    assert_eq!(session.ledger().resource_quantity(ResourceId(1)), 70);
    assert_eq!(session.ledger().resource_quantity(ResourceId(2)), 5);
    session.handle(&LifecycleEvent::CityShutdown);
    session.handle(&region_init("Timbuktu"));

    let mut fresh = RegionSession::new(config);
    fresh.handle(&region_init("Timbuktu"));
    assert_eq!(fresh.ledger().resource_quantity(ResourceId(1)), 70);
    assert_eq!(fresh.ledger().resource_quantity(ResourceId(2)), 5);
}

#[test]
fn test_demolishing_building_reverses_it() {
    let mut session = RegionSession::new(config_in_temp_dir());
    session.handle(&region_init("Demolition"));

    let factory = building(vec![1, 30], vec![2, 5]);
    session.handle(&LifecycleEvent::OccupantInserted(factory.clone()));
    session.handle(&LifecycleEvent::OccupantRemoved(factory));

    assert_eq!(session.ledger().resource_quantity(ResourceId(1)), 0);
    assert_eq!(session.ledger().resource_quantity(ResourceId(2)), 0);
}

#[test]
fn test_non_building_occupants_do_not_touch_ledger() {
    let mut session = RegionSession::new(config_in_temp_dir());
    let props = ResourceProperties::default();

    let tree = Occupant::new(
        OccupantType(0x1234_0000),
        PropertyHolder::new().with(props.produced, PropertyValue::Uint32Array(vec![1, 100])),
    );
    assert_eq!(
        session.handle(&LifecycleEvent::OccupantInserted(tree)),
        EventEffect::Ignored
    );
    assert!(session.ledger().is_empty());
}

#[test]
fn test_odd_length_property_is_skipped() {
    let mut session = RegionSession::new(config_in_temp_dir());
    let broken = building(vec![1, 30, 2], vec![3, 8]);

    session.handle(&LifecycleEvent::OccupantInserted(broken));

    assert_eq!(session.ledger().resource_quantity(ResourceId(1)), 0);
    assert_eq!(session.ledger().resource_quantity(ResourceId(3)), 8);
}

#[test]
fn test_scripts_follow_city_lifetime() {
    let mut session = RegionSession::new(config_in_temp_dir());
    session.handle(&region_init("Scripted"));

    let call = regional_supply::scripting::ScriptCall::parse("regional_supply.add_to_supply(4, 9)")
        .unwrap();
    assert_eq!(session.run_script(&call), Err(ScriptError::NotRegistered));

    session.handle(&LifecycleEvent::CityInitialized);
    assert!(session.run_script(&call).unwrap().is_empty());
    assert_eq!(session.ledger().resource_quantity(ResourceId(4)), 9);

    session.handle(&LifecycleEvent::CityShutdown);
    assert_eq!(session.run_script(&call), Err(ScriptError::NotRegistered));
}

// ============================================================================
// Scenario replay
// ============================================================================

const TWO_CITY_SCENARIO: &str = r#"
[[steps]]
kind = "region_init"
region = "Replay"

[[steps]]
kind = "city_init"

[[steps]]
kind = "occupant_inserted"
name = "Water Pump"
produced = [1, 100]

[[steps]]
kind = "occupant_inserted"
name = "Bottling Plant"
consumed = [1, 30]

[[steps]]
kind = "script"
call = "regional_supply.get_resource_quantity(1)"

[[steps]]
kind = "script"
call = "regional_supply.add_to_demand(1, 20)"

[[steps]]
kind = "script"
call = "regional_supply.get_resource_quantity(1)"

[[steps]]
kind = "city_shutdown"

[[steps]]
kind = "region_init"
region = "Replay"
"#;

#[test]
fn test_scenario_replay() {
    let config = config_in_temp_dir();
    let properties = ResourceProperties::from_config(&config);
    let scenario = Scenario::parse_toml(TWO_CITY_SCENARIO, &properties).unwrap();

    let mut session = RegionSession::new(config.clone());
    let outputs = scenario.run(&mut session);

    assert_eq!(outputs.len(), 3);
    assert_eq!(outputs[0].result, Ok(vec![ScriptValue::Number(70.0)]));
    assert_eq!(outputs[1].result, Ok(vec![]));
    assert_eq!(outputs[2].result, Ok(vec![ScriptValue::Number(50.0)]));

    let path = session.data_path().unwrap().to_path_buf();
    assert!(path.exists());

    let mut fresh = RegionSession::new(config);
    fresh.handle(&region_init("Replay"));
    assert_eq!(fresh.ledger().resource_quantity(ResourceId(1)), 50);
}

#[test]
fn test_scenario_script_outside_city_reports_error() {
    let config = config_in_temp_dir();
    let properties = ResourceProperties::from_config(&config);
    let scenario = Scenario::parse_toml(
        "[[steps]]\nkind = \"script\"\ncall = \"regional_supply.get_resource_quantity(1)\"\n",
        &properties,
    )
    .unwrap();

    let mut session = RegionSession::new(config);
    let outputs = scenario.run(&mut session);
    assert_eq!(outputs[0].result, Err(ScriptError::NotRegistered));
}
