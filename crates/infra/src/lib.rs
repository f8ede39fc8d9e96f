//! Infrastructure layer: storage collaborators, pagination and the exporters
//! that tie the pure projections to them.

pub mod export;
pub mod pagination;
pub mod store;
