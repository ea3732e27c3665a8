//! Soaring CLI library.
//!
//! Synthetic flights for exercising the task engine, the channel-backed
//! task service and environment configuration shared by the binaries.

pub mod config;
pub mod report;
pub mod service;
pub mod sim;
