// crates/recipe-box-config/src/lib.rs
// ============================================================================
// Module: Recipe Box Config Library
// Description: Canonical config model and validation.
// Purpose: Single source of truth for recipe-box.toml semantics.
// Dependencies: recipe-box-core, recipe-box-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! `recipe-box-config` defines the configuration model for the Recipe Box
//! server. Loading is strict and fail-closed; every section has defaults so an
//! empty file is a valid configuration.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod examples;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use examples::config_toml_example;
