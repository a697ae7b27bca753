//! Loading a [`System`] tree from a JSON description.
//!
//! The document is a nested object per system:
//!
//! ```json
//! {
//!   "name": "Game",
//!   "size": [140, 50],
//!   "position": [0, 0],
//!   "mass": 1.0,
//!   "outer_boundary_radius": 400,
//!   "subsystems": [ { "name": "Input" }, { "name": "Physics" } ],
//!   "interactions": [ ["Input", "Physics", "feeds", "events"] ]
//! }
//! ```
//!
//! Only `name` is required. Interactions are four-element arrays of
//! `[source, dest, verb, data]`; entries with fewer than four elements
//! are silently dropped, and non-string elements are stringified.

use log::{debug, trace};
use serde::Deserialize;
use serde_json::Value;

use epicycle_core::geometry::{Point, Size};

use crate::{error::EpicycleError, system::System};

/// One system description as it appears in the JSON document.
#[derive(Debug, Deserialize)]
struct SystemDoc {
    name: String,

    #[serde(default = "default_size")]
    size: Size,

    #[serde(default)]
    position: Point,

    #[serde(default = "default_mass")]
    mass: f32,

    #[serde(default)]
    outer_boundary_radius: Option<f32>,

    #[serde(default)]
    inner_boundary_radius: Option<f32>,

    #[serde(default)]
    subsystems: Vec<SystemDoc>,

    #[serde(default)]
    interactions: Vec<Vec<Value>>,
}

fn default_size() -> Size {
    Size::new(140.0, 50.0)
}

fn default_mass() -> f32 {
    1.0
}

/// Parses a JSON document into a [`System`] tree.
///
/// # Errors
///
/// Returns [`EpicycleError::Load`] if the document is not valid JSON or
/// does not match the schema (for example, a system without a `name`).
pub fn from_json_str(source: &str) -> Result<System, EpicycleError> {
    let doc: SystemDoc = serde_json::from_str(source)?;
    trace!(root = doc.name; "Parsed system document");
    Ok(build_system(doc))
}

/// Builds a system depth-first: subsystems are fully constructed before
/// being attached to their parent.
fn build_system(doc: SystemDoc) -> System {
    let mut system = System::new(doc.name)
        .with_size(doc.size)
        .with_position(doc.position)
        .with_mass(doc.mass)
        .with_outer_boundary_radius(doc.outer_boundary_radius)
        .with_inner_boundary_radius(doc.inner_boundary_radius);

    for sub_doc in doc.subsystems {
        system.add_subsystem(build_system(sub_doc));
    }

    for entry in doc.interactions {
        match entry.as_slice() {
            [source, dest, verb, data, ..] => {
                system.add_interaction(
                    value_to_string(source),
                    value_to_string(dest),
                    value_to_string(verb),
                    value_to_string(data),
                );
            }
            _ => {
                debug!(
                    system = system.name(),
                    len = entry.len();
                    "Dropping interaction with fewer than 4 elements"
                );
            }
        }
    }

    system
}

/// Renders a JSON scalar as the plain string used for names and labels.
fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
