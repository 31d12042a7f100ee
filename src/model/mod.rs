//! # Property Graph Model
//!
//! Plain DTOs for the property graph the search engine reads.
//! This module is pure data: no I/O, no state, no async.

pub mod node;
pub mod relationship;
pub mod value;
pub mod property_map;

pub use node::{Node, NodeId};
pub use relationship::{Relationship, RelId, Direction};
pub use value::Value;
pub use property_map::{PropertyMap, props};
