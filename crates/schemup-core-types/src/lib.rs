//! Core types shared across schemup facilities
//!
//! This crate provides the canonical field keys and event names used by
//! the logging macros and the error facility.

pub mod schema;
