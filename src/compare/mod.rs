//! Classification and reconciliation of parameter codes between the two
//! source systems.
//!
//! [`partition`] splits codes into the three groups, [`listing`] builds the
//! per-group parameter listings, and [`detail`] produces per-location rows,
//! outer-joined across systems with the generic helper in [`join`].

pub mod detail;
pub mod join;
pub mod listing;
pub mod partition;

pub use detail::{DetailRow, DetailSide, GroupDetail, JoinedDetailRow, rows_match};
pub use listing::ParameterSummary;
pub use partition::{GroupCount, Partition};
