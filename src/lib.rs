//! appdex - application snapshot browser library
//!
//! This library exposes the catalog loading, fuzzy search and detail
//! resolution used by the `appdex` command-line browser.

pub mod browse;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod constants;
pub mod detail;
pub mod fetch;
pub mod logging;
pub mod models;
pub mod output;
pub mod search;
pub mod session;
