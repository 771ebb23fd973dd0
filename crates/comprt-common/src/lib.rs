//! # comprt-common
//!
//! Shared error definitions, constants, and configuration models used
//! across the entire comprt workspace.
//!
//! This crate is the leaf of the dependency graph — it depends on no other
//! internal crate and provides the foundational primitives that all other
//! crates build upon.

pub mod config;
pub mod constants;
pub mod error;
