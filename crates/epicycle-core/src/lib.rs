//! Epicycle Core Types
//!
//! This crate provides the foundational geometric types shared by the
//! Epicycle hierarchy model, force-layout engine, and exporters:
//!
//! - [`geometry::Point`]: a 2D position or vector
//! - [`geometry::Size`]: fixed width/height of a rendered box
//! - [`geometry::Bounds`]: an axis-aligned bounding rectangle

pub mod geometry;
