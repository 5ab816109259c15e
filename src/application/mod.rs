//! Application services: content producers, page aggregation and import.

pub mod content;
pub mod error;
pub mod import;
pub mod page;
pub mod repos;
