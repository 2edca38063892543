//! Core library for the paramcmp command line application.
//!
//! The library compares the general parameters configured in two systems
//! (TiCares and SFERE). IO adapters live under [`io`], the record types inside
//! [`model`], the classification and join logic in [`compare`], the export
//! tables in [`report`], and the orchestration used by the CLI under [`sync`].

pub mod compare;
pub mod dataset;
pub mod error;
pub mod io;
pub mod logging;
pub mod model;
pub mod report;
pub mod selection;
pub mod sync;

pub use dataset::{Dataset, DatasetCache};
pub use error::{Result, ToolError};
