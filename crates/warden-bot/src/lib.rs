//! # Warden Bot
//!
//! Discord bot binary built on the warden command framework.
//!
//! Wires the framework platform seams to serenity's HTTP client and cache,
//! forwards gateway events into the framework and owns the process lifecycle.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod bot;
pub mod convert;
pub mod demo;
pub mod error;
pub mod handler;
pub mod platform;

pub use bot::*;
pub use error::*;
