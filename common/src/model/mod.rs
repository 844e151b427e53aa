//! Domain models for the papers exchange

pub mod account;
pub mod holding;
pub mod paper;
pub mod trade;
