//! Exporters reading a laid-out [`crate::system::System`] tree.

pub mod svg;
