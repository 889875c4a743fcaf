//! Command handlers.

pub mod address;
pub mod tx;
pub mod wallet;
