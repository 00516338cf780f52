//! Region session - owns the ledger and reacts to host lifecycle events

use std::io;
use std::path::{Path, PathBuf};

use crate::city::events::{apply_event, EventEffect, LifecycleEvent, ResourceProperties};
use crate::core::config::SupplyConfig;
use crate::core::error::Result;
use crate::persist::packed_file::{PackedFile, PackedFileError};
use crate::persist::record::AccessMode;
use crate::persist::region::{load_region_ledger, save_region_ledger, SaveOutcome};
use crate::scripting::bridge::{EntryPoint, ScriptBridge, ScriptValue};
use crate::scripting::call::ScriptCall;
use crate::scripting::ScriptError;
use crate::supply::ledger::Ledger;

/// Controller for the ledger of the region currently open in the game
///
/// Entering a region loads its ledger. Leaving a city sets a flag so the
/// following region init saves the ledger instead of reloading it.
#[derive(Debug)]
pub struct RegionSession {
    config: SupplyConfig,
    properties: ResourceProperties,
    ledger: Ledger,
    data_path: Option<PathBuf>,
    exited_city: bool,
    scripts_registered: bool,
}

impl RegionSession {
    pub fn new(config: SupplyConfig) -> Self {
        let properties = ResourceProperties::from_config(&config);
        Self {
            config,
            properties,
            ledger: Ledger::new(),
            data_path: None,
            exited_city: false,
            scripts_registered: false,
        }
    }

    pub fn config(&self) -> &SupplyConfig {
        &self.config
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Data file of the current region, if one was resolved
    pub fn data_path(&self) -> Option<&Path> {
        self.data_path.as_deref()
    }

    /// True while a city is loaded and scripts can call in
    pub fn scripts_registered(&self) -> bool {
        self.scripts_registered
    }

    /// Handle one host notification
    pub fn handle(&mut self, event: &LifecycleEvent) -> EventEffect {
        let effect = apply_event(&mut self.ledger, event, &self.properties);

        match &effect {
            EventEffect::RegisterScripts => self.register_scripts(),
            EventEffect::CityExited => {
                self.exited_city = true;
                self.scripts_registered = false;
            }
            EventEffect::RegionEntered { directory_name } => self.enter_region(directory_name),
            EventEffect::LedgerUpdated | EventEffect::Ignored => {}
        }

        effect
    }

    /// Bridge for script calls against this session's ledger
    pub fn script_bridge(&mut self) -> std::result::Result<ScriptBridge<'_>, ScriptError> {
        if !self.scripts_registered {
            return Err(ScriptError::NotRegistered);
        }
        Ok(ScriptBridge::new(&self.config.script_table, &mut self.ledger))
    }

    /// Run a parsed script call through the bridge
    pub fn run_script(&mut self, call: &ScriptCall) -> std::result::Result<Vec<ScriptValue>, ScriptError> {
        self.script_bridge()?.call(call)
    }

    fn register_scripts(&mut self) {
        for entry in EntryPoint::ALL {
            tracing::info!(
                "Registered the {}.{} function",
                self.config.script_table,
                entry.name()
            );
        }
        self.scripts_registered = true;
    }

    fn enter_region(&mut self, directory_name: &str) {
        if self.exited_city {
            self.exited_city = false;
            if let Err(e) = self.save_region_data() {
                tracing::error!("Failed to save the region resource data. {}", e);
            }
        } else {
            self.data_path = self.config.region_data_path(directory_name);
            self.load_region_data();
        }
    }

    /// Replace the ledger with the one stored for the current region
    ///
    /// A region without a data file starts with an empty ledger.
    pub fn load_region_data(&mut self) {
        self.ledger = Ledger::new();

        let Some(path) = self.data_path.as_deref() else {
            return;
        };

        match PackedFile::open(path, AccessMode::Read) {
            Ok(mut file) => {
                self.ledger = load_region_ledger(&mut file, self.config.record_key);
                tracing::debug!(
                    "Loaded {} resource balance(s) from {}",
                    self.ledger.len(),
                    path.display()
                );
            }
            Err(PackedFileError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("No regional supply data at {}", path.display());
            }
            Err(e) => {
                tracing::error!("Failed to load the region resource data. {}", e);
            }
        }
    }

    /// Write the ledger to the current region's data file
    pub fn save_region_data(&self) -> Result<SaveOutcome> {
        let Some(path) = self.data_path.as_deref() else {
            return Ok(SaveOutcome::Skipped);
        };
        // Don't create a data file for a region that never used the ledger
        if self.ledger.is_empty() {
            return Ok(SaveOutcome::Skipped);
        }

        let mut file = PackedFile::open(path, AccessMode::ReadWrite)?;
        let outcome = save_region_ledger(&self.ledger, &mut file, self.config.record_key)?;
        file.close()?;

        tracing::debug!("Saved {} resource balance(s) to {}", self.ledger.len(), path.display());
        Ok(outcome)
    }
}
