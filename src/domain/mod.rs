//! Domain layer: content entities and the document mapper.

pub mod documents;
pub mod entities;
pub mod error;
