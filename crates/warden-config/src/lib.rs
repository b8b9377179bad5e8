//! # Warden Config
//!
//! Type-safe framework options for Warden.
//!
//! This crate provides configuration loading from YAML or TOML files with
//! environment overrides and schema validation.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod defaults;
pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::*;
pub use schema::*;
