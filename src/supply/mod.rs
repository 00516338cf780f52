//! Supply layer - the regional ledger and its binary form

pub mod ledger;
pub mod serializer;

pub use ledger::{Ledger, RegionalSupply};
pub use serializer::{load_from, save_to, PersistError, LEDGER_FORMAT_VERSION};
