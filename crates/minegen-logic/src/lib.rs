//! Pure grid and routing logic for MineGen.
//!
//! This crate contains all generation logic that is independent of any
//! entity store, persistence format, or host engine. Functions take
//! plain data and return results, making them unit-testable and
//! portable across the native generator, headless tools, and any
//! future embedding.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`connection`] | Per-cell directional connection state accumulation |
//! | [`corridor`] | Connection-state classification into corridor pieces |
//! | [`grid`] | Integer/float grid coordinates, quarter-turn rotations |
//! | [`pathfind`] | A* corridor routing with vertical weighting and reuse bias |
//! | [`topology`] | Linear, looping, and star room-pairing strategies |
//! | [`transform`] | World-space to grid-space conversion and tile sizing |

pub mod connection;
pub mod corridor;
pub mod grid;
pub mod pathfind;
pub mod topology;
pub mod transform;
