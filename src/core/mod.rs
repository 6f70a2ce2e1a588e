//! Core implementation: the decision engine and its collaborators

pub mod config;
pub mod error;
pub mod iam;
pub mod store;
