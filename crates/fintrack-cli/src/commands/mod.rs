//! CLI command implementations
//!
//! - `analyze` - Load exported expenses and print an analysis report
//! - `config` - Show the effective narrative configuration
//! - `period` - Period name resolution shared by commands

pub mod analyze;
pub mod config;
pub mod period;

pub use analyze::*;
pub use config::*;
pub use period::*;
