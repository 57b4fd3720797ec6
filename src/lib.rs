//! Ember - declarative resource compiler
//!
//! This crate compiles declared data-model resources into physical models:
//! - Resource declarations with typed fields and relationships
//! - Property collection across inheritance chains
//! - Two-phase builder graph for tables, keys and relations
//! - Cached, idempotent model generation
//! - DDL and JSON rendering of the compiled schema

pub mod utils;

pub mod config;
pub mod ember;
pub mod model;
pub mod resource;
