//! Core business logic for yatube.

pub mod nullable;
pub mod services;

pub use services::*;
