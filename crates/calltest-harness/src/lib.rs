//! Fixture-driven harness for calltest.
//!
//! This crate provides:
//! - Fixtures: JSON call/expectation cases, coerced toward declared types
//! - Runner: executes fixture sets through the core engine
//! - Verify and report: per-case verdicts rendered as markdown + JSON
//! - Structured logging: JSONL events and an artifact index with SHA-256 digests
//! - Catalog: the built-in callables the `calltest` binary exposes

#![forbid(unsafe_code)]

pub mod catalog;
pub mod config;
pub mod error;
pub mod fixtures;
pub mod report;
pub mod runner;
pub mod structured_log;
pub mod verify;

pub use config::HarnessConfig;
pub use error::HarnessError;
pub use fixtures::{FixtureCase, FixtureError, FixtureSet};
pub use report::RunReport;
pub use runner::TestRunner;
pub use verify::{VerificationResult, VerificationSummary};
