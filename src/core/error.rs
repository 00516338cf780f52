use thiserror::Error;

use crate::city::scenario::ScenarioError;
use crate::core::config::ConfigError;
use crate::persist::packed_file::PackedFileError;
use crate::persist::record::RecordError;
use crate::scripting::ScriptError;
use crate::supply::serializer::PersistError;

#[derive(Error, Debug)]
pub enum SupplyError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Record error: {0}")]
    Record(#[from] RecordError),

    #[error("Ledger persistence error: {0}")]
    Persist(#[from] PersistError),

    #[error("Packed file error: {0}")]
    PackedFile(#[from] PackedFileError),

    #[error("Scenario error: {0}")]
    Scenario(#[from] ScenarioError),

    #[error("Script error: {0}")]
    Script(#[from] ScriptError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SupplyError>;
