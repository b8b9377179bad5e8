//! # Warden Common
//!
//! Shared error types, logging bootstrap and identifier parsing used by
//! every crate in the Warden workspace.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod logging;
pub mod utils;

#[cfg(any(test, feature = "testing"))]
pub mod test_utils;

pub use error::{Result, WardenError};
pub use logging::{init_dev_logging, init_logging, init_prod_logging, LogFormat, LoggingConfig};
pub use utils::*;
