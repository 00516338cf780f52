//! Scripting layer - entry points exposed to advisor scripts

pub mod bridge;
pub mod call;

pub use bridge::{EntryPoint, ScriptBridge, ScriptValue};
pub use call::ScriptCall;

use thiserror::Error;

/// Errors raised around script calls
///
/// Bad arguments are not errors; they are silently ignored by the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    #[error("cannot parse script call '{source_text}': {message}")]
    Parse {
        source_text: String,
        message: String,
    },
    #[error("unknown script function {0}")]
    UnknownFunction(String),
    #[error("script functions are only available while a city is loaded")]
    NotRegistered,
}
