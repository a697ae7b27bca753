//! The system hierarchy model.
//!
//! A diagram is a strict ownership tree of [`System`] nodes. Each system
//! has a fixed rendered size, a mutable center position (the layout's
//! primary output), per-step physics scratch state, optional boundary
//! radii softly constraining its subsystems, and an ordered list of
//! [`Interaction`]s between its direct subsystems.

use std::f32::consts::TAU;

use epicycle_core::geometry::{Bounds, Point, Size};

/// A directed, labeled interaction between two named systems.
///
/// Source and destination are plain names. For physics they must resolve
/// among the owning system's direct subsystems; for rendering they may
/// resolve anywhere in the tree. Unresolvable names are silently ignored
/// by both consumers.
#[derive(Debug, Clone)]
pub struct Interaction {
    source: String,
    dest: String,
    verb: String,
    data: String,
}

impl Interaction {
    /// Returns the source system name.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the destination system name.
    pub fn dest(&self) -> &str {
        &self.dest
    }

    /// Returns the interaction verb.
    pub fn verb(&self) -> &str {
        &self.verb
    }

    /// Returns the interaction payload description.
    pub fn data(&self) -> &str {
        &self.data
    }

    /// Returns the rendered arrow label, `"verb (data)"`.
    pub fn label(&self) -> String {
        format!("{} ({})", self.verb, self.data)
    }
}

/// One system (box) in the hierarchy.
///
/// Subsystems are exclusively owned by their parent; the structure is a
/// strict tree. Sibling names should be unique — interaction resolution
/// and force computation look systems up by name and take the first match.
#[derive(Debug, Clone)]
pub struct System {
    name: String,
    size: Size,
    pub(crate) position: Point,
    /// Positive scalar converting net force into acceleration.
    pub(crate) mass: f32,
    pub(crate) velocity: Point,
    pub(crate) acceleration: Point,
    pub(crate) net_force: Point,
    outer_boundary_radius: Option<f32>,
    inner_boundary_radius: Option<f32>,
    pub(crate) subsystems: Vec<System>,
    pub(crate) interactions: Vec<Interaction>,
}

impl System {
    /// Creates a system with the default size (140 x 50), position at
    /// the origin, and unit mass.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size: Size::new(140.0, 50.0),
            position: Point::default(),
            mass: 1.0,
            velocity: Point::default(),
            acceleration: Point::default(),
            net_force: Point::default(),
            outer_boundary_radius: None,
            inner_boundary_radius: None,
            subsystems: Vec::new(),
            interactions: Vec::new(),
        }
    }

    /// Sets the fixed rendered size.
    pub fn with_size(mut self, size: Size) -> Self {
        self.size = size;
        self
    }

    /// Sets the initial center position.
    pub fn with_position(mut self, position: Point) -> Self {
        self.position = position;
        self
    }

    /// Sets the mass. Must be positive.
    pub fn with_mass(mut self, mass: f32) -> Self {
        debug_assert!(mass > 0.0, "mass must be positive");
        self.mass = mass;
        self
    }

    /// Sets the outer boundary radius within which this system's
    /// subsystems are softly contained.
    pub fn with_outer_boundary_radius(mut self, radius: Option<f32>) -> Self {
        self.outer_boundary_radius = radius;
        self
    }

    /// Sets the inner boundary radius out of which this system's
    /// subsystems are softly pushed.
    pub fn with_inner_boundary_radius(mut self, radius: Option<f32>) -> Self {
        self.inner_boundary_radius = radius;
        self
    }

    /// Returns the system name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the fixed rendered size.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Returns the current center position.
    pub fn position(&self) -> Point {
        self.position
    }

    /// Returns the current velocity.
    pub fn velocity(&self) -> Point {
        self.velocity
    }

    /// Returns the net force accumulated by the most recent physics step.
    pub fn net_force(&self) -> Point {
        self.net_force
    }

    /// Returns the outer boundary radius, if configured.
    pub fn outer_boundary_radius(&self) -> Option<f32> {
        self.outer_boundary_radius
    }

    /// Returns the inner boundary radius, if configured.
    pub fn inner_boundary_radius(&self) -> Option<f32> {
        self.inner_boundary_radius
    }

    /// Returns the direct subsystems in stored order.
    pub fn subsystems(&self) -> &[System] {
        &self.subsystems
    }

    /// Returns this system's interactions in stored order.
    pub fn interactions(&self) -> &[Interaction] {
        &self.interactions
    }

    /// Appends a subsystem.
    ///
    /// Name uniqueness among siblings is the caller's responsibility;
    /// no check is performed here.
    pub fn add_subsystem(&mut self, subsystem: System) {
        self.subsystems.push(subsystem);
    }

    /// Appends an interaction between two named systems.
    ///
    /// The endpoints are not validated; names that never resolve are
    /// silently ignored by physics and rendering.
    pub fn add_interaction(
        &mut self,
        source: impl Into<String>,
        dest: impl Into<String>,
        verb: impl Into<String>,
        data: impl Into<String>,
    ) {
        self.interactions.push(Interaction {
            source: source.into(),
            dest: dest.into(),
            verb: verb.into(),
            data: data.into(),
        });
    }

    /// Finds a system by name, searching this system first and then its
    /// subsystems depth-first in stored order. Returns the first match.
    pub fn find(&self, name: &str) -> Option<&System> {
        if self.name == name {
            return Some(self);
        }
        self.subsystems.iter().find_map(|sub| sub.find(name))
    }

    /// Arranges direct subsystems evenly on a circle of the given radius
    /// centered at this system's position, then recursively arranges each
    /// subsystem's children on a circle of half the radius.
    ///
    /// This is the one-time initial placement before the physics engine
    /// takes over; systems without subsystems are untouched.
    pub fn seed_circular_layout(&mut self, radius: f32) {
        let n = self.subsystems.len();
        let center = self.position;
        for (i, sub) in self.subsystems.iter_mut().enumerate() {
            let angle = TAU * i as f32 / n as f32;
            sub.position = center.add_point(Point::new(
                radius * angle.cos(),
                radius * angle.sin(),
            ));
            sub.seed_circular_layout(radius * 0.5);
        }
    }

    /// Recursively computes the axis-aligned bounding box covering this
    /// system's own rectangle and all descendants' rectangles at their
    /// current positions.
    pub fn bounding_box(&self) -> Bounds {
        self.subsystems
            .iter()
            .fold(self.position.to_bounds(self.size), |bounds, sub| {
                bounds.merge(&sub.bounding_box())
            })
    }

    /// Translates this system and every descendant by the given offset.
    pub fn shift(&mut self, offset: Point) {
        self.position = self.position.add_point(offset);
        for sub in &mut self.subsystems {
            sub.shift(offset);
        }
    }
}
