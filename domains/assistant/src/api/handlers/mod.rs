//! HTTP handlers for the Assistant domain

pub mod generate;
