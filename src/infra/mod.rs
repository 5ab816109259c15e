//! Infrastructure adapters and runtime bootstrap.

pub mod cache_warmer;
pub mod db;
pub mod error;
pub mod http;
pub mod redis;
pub mod telemetry;
