//! Epicycle renders a hierarchy of named systems and their labeled
//! interactions as a diagram, using a force-directed layout to keep
//! related systems close and unrelated ones apart.
//!
//! The crate is organized around two layers:
//!
//! - [`system::System`]: an ownership tree of named boxes, each optionally
//!   containing subsystems and a list of directed, labeled interactions
//!   between systems at the same nesting level.
//! - [`physics::Engine`]: the force-layout engine. Each call to
//!   [`physics::Engine::step`] computes centering, boundary, repulsion,
//!   and spring forces on every system's direct subsystems and integrates
//!   them into new positions, recursing through the whole tree.
//!
//! Trees are typically built from JSON via the [`loader`] module, seeded
//! with [`system::System::seed_circular_layout`], relaxed by repeated
//! `step` calls, and rendered with the [`export::svg`] exporter.

pub mod error;
pub mod export;
pub mod loader;
pub mod physics;
pub mod system;

pub use epicycle_core::geometry;
pub use error::EpicycleError;
