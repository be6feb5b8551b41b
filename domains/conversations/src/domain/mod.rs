//! Conversations domain layer: entities, reply generation

pub mod entities;
pub mod replies;
