//! Regional Supply - Shared supply/demand ledger for the cities of a region

pub mod city;
pub mod core;
pub mod persist;
pub mod scripting;
pub mod supply;
