//! Core library for the `ticketero-load` CLI.
//!
//! This crate provides the building blocks used by the binary: CLI argument
//! types, payload generation, the HTTP client, staged virtual-user schedules,
//! per-response checks, metrics aggregation with thresholds, the scenario
//! engine, and an in-process stub of the ticket service. The primary
//! user-facing interface is the `ticketero-load` command-line application.

pub mod checks;
pub mod cli;
pub mod client;
pub mod metrics;
pub mod payload;
pub mod scenarios;
pub mod server;
pub mod stages;
pub mod thresholds;
