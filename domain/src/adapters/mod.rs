//! Test-only adapters that live inside the domain crate for convenience.
//!
//! These are intended for unit testing and local demos. Real stores
//! (SQLite, DynamoDB) live in separate crates under `adapters/`.

pub mod memory_store;
