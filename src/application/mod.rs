//! Application layer orchestrating the domain rules over the storage ports.
//!
//! This module defines the `RuleEngine`, the entry point the CLI (or any other
//! record layer) calls whenever a tracked field changes, and the per-record
//! locks that keep recomputations of one record strictly sequential.

pub mod engine;
pub mod locks;
