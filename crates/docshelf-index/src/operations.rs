//! Index operations, grouped by concern.

pub mod search;
pub mod sources;
