//! Domain modules organized as vertical slices.
//!
//! Each sub-module contains:
//! - `mod.rs`: rich domain types (validated, business-logic-ready)
//! - `wire.rs`: raw serde structs matching indexer responses
//! - `convert.rs`: `TryFrom` conversions with validation
//! - `state.rs`: pure transformations over domain data
//! - `client.rs`: sub-client over the adapter, chain and indexer

pub mod manager;
pub mod order;
pub mod orderbook;
pub mod pool;
