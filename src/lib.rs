//! Crimewatch - a web dashboard for SQL analytics over crime records.
//!
//! This library exposes the core modules for use in integration tests.

pub mod chart;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod logging;
pub mod paging;
pub mod registry;
pub mod session;
