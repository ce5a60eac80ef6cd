//! Database query implementations.

pub mod applications;
pub mod explore;
pub mod raw;
