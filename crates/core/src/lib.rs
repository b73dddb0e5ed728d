//! Domain logic for the tempo permission-aware dynamic view engine.
//!
//! Everything in this crate is pure and database-free: permission
//! resolution, dynamic-field typing and coercion, settings merge rules,
//! column ordering, and the filter predicate DSL. The `tempo-db` crate
//! loads rows; this crate decides what they mean.

pub mod dynamic;
pub mod entity;
pub mod error;
pub mod permission;
pub mod predicate;
pub mod role;
pub mod settings;
pub mod types;
pub mod value;
pub mod view;
