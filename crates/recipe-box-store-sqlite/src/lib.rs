// crates/recipe-box-store-sqlite/src/lib.rs
// ============================================================================
// Module: SQLite Recipe Store
// Description: Durable RecipeStore backend using SQLite.
// Purpose: Persist recipe rows behind the relational store seam.
// Dependencies: recipe-box-core, rusqlite
// ============================================================================

//! ## Overview
//! This crate provides a SQLite-backed [`recipe_box_core::RecipeStore`]. Every
//! caller value is bound as a statement parameter; partial updates execute the
//! statement text rendered by [`recipe_box_core::UpdateStatement`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::SqliteRecipeStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
