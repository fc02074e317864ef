//! Shared ephemeral-environment domain primitives.
//!
//! This crate owns the cleanup report and audit record contracts, resource
//! name matching, and configuration resolution. It intentionally excludes AWS
//! SDK and Lambda runtime concerns.

pub mod config;
pub mod contract;
pub mod matching;
