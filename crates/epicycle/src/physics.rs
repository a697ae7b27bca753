//! The force-directed layout engine.
//!
//! [`Engine::step`] advances the simulation by one frame: for each system
//! in the tree it computes forces on that system's direct subsystems
//! (centering, boundary containment, pairwise repulsion, connection
//! springs), integrates them into new positions, and recurses.
//!
//! The coefficients in [`PhysicsParams`] are tuned empirically for the
//! default box sizes and seed radius; they are load-bearing for visual
//! stability rather than numerically principled, so the defaults should
//! not be "fixed".

use serde::Deserialize;

use epicycle_core::geometry::Point;

use crate::system::System;

/// Tunable coefficients for the force model.
///
/// Every field has a serde default, so a configuration file may override
/// any subset of them.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PhysicsParams {
    /// Pull toward the parent's center per incoming interaction.
    pub center_attraction: f32,

    /// Push away from the parent's center per outgoing interaction.
    pub center_repulsion: f32,

    /// Spring constant of the soft boundary annulus penalty.
    pub boundary_stiffness: f32,

    /// Numerator of the `k / d²` repulsion between sibling pairs.
    pub pair_repulsion: f32,

    /// Sibling pairs farther apart than this exert no repulsion.
    pub pair_cutoff: f32,

    /// Spring constant of the connection force between interacting siblings.
    pub spring_stiffness: f32,

    /// Rest length of the connection spring.
    pub spring_rest_length: f32,

    /// Multiplicative velocity decay applied once per step, regardless
    /// of the step's duration.
    pub damping: f32,
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self {
            center_attraction: 500.0,
            center_repulsion: 500.0,
            boundary_stiffness: 1000.0,
            pair_repulsion: 2.0e7,
            pair_cutoff: 10_000.0,
            spring_stiffness: 10.0,
            spring_rest_length: 150.0,
            damping: 0.9,
        }
    }
}

/// The force-layout engine.
///
/// The engine is stateless apart from its parameters: a step is a pure
/// function of the current tree state plus `dt`. It is intended to be
/// driven from a single-threaded animation loop holding exclusive
/// mutable access to the tree.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    params: PhysicsParams,
}

impl Engine {
    /// Creates an engine with the default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine with the given parameters.
    pub fn with_params(params: PhysicsParams) -> Self {
        Self { params }
    }

    /// Returns the engine's parameters.
    pub fn params(&self) -> &PhysicsParams {
        &self.params
    }

    /// Advances the simulation by one step of duration `dt` seconds.
    ///
    /// Forces act on `system`'s direct subsystems only; `system`'s own
    /// position is never touched. All force terms for a sibling group are
    /// fully accumulated before any member integrates, and subsystems are
    /// always visited in stored order, so stepping is deterministic.
    ///
    /// `dt` is not clamped; a pathologically large value can destabilize
    /// the integration.
    pub fn step(&self, system: &mut System, dt: f32) {
        if system.subsystems.is_empty() {
            return;
        }

        self.apply_center_forces(system);
        self.apply_boundary_forces(system);
        self.apply_pair_repulsion(system);
        self.apply_connection_springs(system);
        self.integrate(system, dt);

        for sub in &mut system.subsystems {
            self.step(sub, dt);
        }
    }

    /// Sets each subsystem's net force to the base centering term: an
    /// attraction toward the parent per incoming interaction minus a
    /// repulsion per outgoing interaction, along the unit vector toward
    /// the parent's center. Overwrites any force left from earlier steps.
    fn apply_center_forces(&self, system: &mut System) {
        let parent_center = system.position;
        for sub in &mut system.subsystems {
            let incoming = system
                .interactions
                .iter()
                .filter(|i| i.dest() == sub.name())
                .count() as f32;
            let outgoing = system
                .interactions
                .iter()
                .filter(|i| i.source() == sub.name())
                .count() as f32;

            let magnitude = self.params.center_attraction * incoming
                - self.params.center_repulsion * outgoing;

            let toward_parent = parent_center
                .sub_point(sub.position)
                .normalized()
                .unwrap_or_default();
            sub.net_force = toward_parent.scale(magnitude);
        }
    }

    /// Adds soft containment forces for subsystems outside the parent's
    /// outer boundary radius or inside its inner boundary radius. The two
    /// checks are independent; contradictory radii are the caller's
    /// responsibility.
    fn apply_boundary_forces(&self, system: &mut System) {
        let parent_center = system.position;
        let outer = system.outer_boundary_radius();
        let inner = system.inner_boundary_radius();

        for sub in &mut system.subsystems {
            let outward = sub.position.sub_point(parent_center);
            let r = outward.hypot();
            if r == 0.0 {
                continue;
            }

            if let Some(radius) = outer {
                if r > radius {
                    let penetration = r - radius;
                    let pull = outward.scale(self.params.boundary_stiffness * penetration / r);
                    sub.net_force = sub.net_force.sub_point(pull);
                }
            }
            if let Some(radius) = inner {
                if r < radius {
                    let penetration = radius - r;
                    let push = outward.scale(self.params.boundary_stiffness * penetration / r);
                    sub.net_force = sub.net_force.add_point(push);
                }
            }
        }
    }

    /// Adds an inverse-square repulsion between every unordered pair of
    /// subsystems, applied antisymmetrically to both. The distance is
    /// clamped to at least 1 to avoid the singularity, and pairs beyond
    /// the cutoff exert no force.
    fn apply_pair_repulsion(&self, system: &mut System) {
        let n = system.subsystems.len();
        for i in 0..n {
            for j in (i + 1)..n {
                let delta = system.subsystems[j]
                    .position
                    .sub_point(system.subsystems[i].position);
                let d = delta.hypot().max(1.0);
                if d >= self.params.pair_cutoff {
                    continue;
                }

                let magnitude = self.params.pair_repulsion / (d * d);
                let push = delta.scale(magnitude / d);
                system.subsystems[i].net_force =
                    system.subsystems[i].net_force.sub_point(push);
                system.subsystems[j].net_force =
                    system.subsystems[j].net_force.add_point(push);
            }
        }
    }

    /// Adds a rest-length spring along every interaction whose endpoints
    /// both resolve among the direct subsystems: pulls the pair together
    /// beyond the rest length, pushes apart when closer. Interactions
    /// with an unresolvable endpoint or coincident endpoints contribute
    /// nothing.
    fn apply_connection_springs(&self, system: &mut System) {
        for interaction in &system.interactions {
            let source = system
                .subsystems
                .iter()
                .position(|sub| sub.name() == interaction.source());
            let dest = system
                .subsystems
                .iter()
                .position(|sub| sub.name() == interaction.dest());
            let (Some(si), Some(di)) = (source, dest) else {
                continue;
            };

            let delta = system.subsystems[di]
                .position
                .sub_point(system.subsystems[si].position);
            let d = delta.hypot();
            if d == 0.0 {
                continue;
            }

            let magnitude =
                -self.params.spring_stiffness * (d - self.params.spring_rest_length);
            let push = delta.scale(magnitude / d);
            system.subsystems[si].net_force =
                system.subsystems[si].net_force.sub_point(push);
            system.subsystems[di].net_force =
                system.subsystems[di].net_force.add_point(push);
        }
    }

    /// Converts each subsystem's accumulated net force into motion:
    /// `a = F/m`, `v += a·dt`, `v *= damping`, `p += v·dt`.
    fn integrate(&self, system: &mut System, dt: f32) {
        for sub in &mut system.subsystems {
            sub.acceleration = sub.net_force.scale(1.0 / sub.mass);
            sub.velocity = sub
                .velocity
                .add_point(sub.acceleration.scale(dt))
                .scale(self.params.damping);
            sub.position = sub.position.add_point(sub.velocity.scale(dt));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use epicycle_core::geometry::Point;
    use float_cmp::assert_approx_eq;

    const DT: f32 = 1.0 / 60.0;

    /// Parameters with everything but the term under test switched off.
    fn only(params: PhysicsParams) -> Engine {
        Engine::with_params(params)
    }

    fn quiet() -> PhysicsParams {
        PhysicsParams {
            center_attraction: 0.0,
            center_repulsion: 0.0,
            boundary_stiffness: 0.0,
            pair_repulsion: 0.0,
            spring_stiffness: 0.0,
            ..PhysicsParams::default()
        }
    }

    fn parent_with(children: Vec<System>) -> System {
        let mut parent = System::new("parent");
        for child in children {
            parent.add_subsystem(child);
        }
        parent
    }

    #[test]
    fn childless_system_is_left_untouched() {
        let mut solo = System::new("solo").with_position(Point::new(3.0, 4.0));
        let before = solo.clone();

        Engine::new().step(&mut solo, DT);

        assert_eq!(solo.position(), before.position());
        assert_eq!(solo.velocity(), before.velocity());
        assert_eq!(solo.net_force(), before.net_force());
    }

    #[test]
    fn step_moves_only_subsystems_not_the_parent() {
        let mut root = parent_with(vec![
            System::new("a").with_position(Point::new(100.0, 0.0)),
            System::new("b").with_position(Point::new(-100.0, 0.0)),
        ]);

        Engine::new().step(&mut root, DT);

        assert!(root.position().is_zero());
        assert_ne!(root.subsystems()[0].position().x(), 100.0);
    }

    #[test]
    fn pair_repulsion_is_antisymmetric() {
        let mut root = parent_with(vec![
            System::new("a").with_position(Point::new(-40.0, 10.0)),
            System::new("b").with_position(Point::new(55.0, -20.0)),
        ]);

        // No interactions, so the centering term is zero and net force is
        // the repulsion term alone.
        Engine::new().step(&mut root, DT);

        let fa = root.subsystems()[0].net_force();
        let fb = root.subsystems()[1].net_force();
        assert_approx_eq!(f32, fa.x(), -fb.x());
        assert_approx_eq!(f32, fa.y(), -fb.y());
        assert!(fa.hypot() > 0.0);
    }

    #[test]
    fn pair_repulsion_skipped_beyond_cutoff() {
        let engine = only(PhysicsParams {
            pair_repulsion: 2.0e7,
            pair_cutoff: 50.0,
            ..quiet()
        });
        let mut root = parent_with(vec![
            System::new("a").with_position(Point::new(0.0, 0.0)),
            System::new("b").with_position(Point::new(60.0, 0.0)),
        ]);

        engine.step(&mut root, DT);

        assert!(root.subsystems()[0].net_force().is_zero());
        assert!(root.subsystems()[1].net_force().is_zero());
    }

    #[test]
    fn pair_repulsion_distance_clamped_near_singularity() {
        let engine = only(PhysicsParams {
            pair_repulsion: 2.0e7,
            ..quiet()
        });
        let mut root = parent_with(vec![
            System::new("a").with_position(Point::new(0.0, 0.0)),
            System::new("b").with_position(Point::new(0.1, 0.0)),
        ]);

        engine.step(&mut root, DT);

        // Clamped to d = 1: the force is the raw 0.1-long offset times the
        // coefficient, finite rather than the ~2e9 the true distance gives.
        assert_approx_eq!(
            f32,
            root.subsystems()[1].net_force().x(),
            2.0e6,
            epsilon = 1.0
        );
    }

    #[test]
    fn coincident_pair_exerts_no_nan_forces() {
        let mut root = parent_with(vec![
            System::new("a").with_position(Point::new(5.0, 5.0)),
            System::new("b").with_position(Point::new(5.0, 5.0)),
        ]);

        Engine::new().step(&mut root, DT);

        for sub in root.subsystems() {
            assert!(sub.position().x().is_finite());
            assert!(sub.position().y().is_finite());
        }
    }

    #[test]
    fn spring_force_vanishes_at_rest_length() {
        let engine = only(PhysicsParams {
            spring_stiffness: 10.0,
            ..quiet()
        });
        let mut root = parent_with(vec![
            System::new("a").with_position(Point::new(0.0, 0.0)),
            System::new("b").with_position(Point::new(150.0, 0.0)),
        ]);
        root.add_interaction("a", "b", "calls", "data");

        engine.step(&mut root, DT);

        assert!(root.subsystems()[0].net_force().is_zero());
        assert!(root.subsystems()[1].net_force().is_zero());
    }

    #[test]
    fn spring_pulls_together_when_stretched() {
        let engine = only(PhysicsParams {
            spring_stiffness: 10.0,
            ..quiet()
        });
        let mut root = parent_with(vec![
            System::new("a").with_position(Point::new(0.0, 0.0)),
            System::new("b").with_position(Point::new(300.0, 0.0)),
        ]);
        root.add_interaction("a", "b", "calls", "data");

        engine.step(&mut root, DT);

        // Stretched by 150 beyond rest: source pulled toward dest and
        // dest toward source, each with magnitude 10 * 150.
        assert_approx_eq!(f32, root.subsystems()[0].net_force().x(), 1500.0);
        assert_approx_eq!(f32, root.subsystems()[1].net_force().x(), -1500.0);
    }

    #[test]
    fn spring_pushes_apart_when_compressed() {
        let engine = only(PhysicsParams {
            spring_stiffness: 10.0,
            ..quiet()
        });
        let mut root = parent_with(vec![
            System::new("a").with_position(Point::new(0.0, 0.0)),
            System::new("b").with_position(Point::new(50.0, 0.0)),
        ]);
        root.add_interaction("a", "b", "calls", "data");

        engine.step(&mut root, DT);

        assert!(root.subsystems()[0].net_force().x() < 0.0);
        assert!(root.subsystems()[1].net_force().x() > 0.0);
    }

    #[test]
    fn center_force_balances_incoming_against_outgoing() {
        let engine = only(PhysicsParams {
            center_attraction: 500.0,
            center_repulsion: 500.0,
            ..quiet()
        });
        let mut root = parent_with(vec![
            System::new("a").with_position(Point::new(200.0, 0.0)),
            System::new("b").with_position(Point::new(-200.0, 0.0)),
        ]);
        root.add_interaction("a", "b", "sends", "x");
        root.add_interaction("a", "b", "sends", "y");

        engine.step(&mut root, DT);

        // "a" has two outgoing edges: pushed away from the center.
        assert_approx_eq!(f32, root.subsystems()[0].net_force().x(), 1000.0);
        // "b" has two incoming edges: pulled toward the center.
        assert_approx_eq!(f32, root.subsystems()[1].net_force().x(), 1000.0);
    }

    #[test]
    fn center_force_zero_when_child_on_parent_center() {
        let engine = only(PhysicsParams {
            center_attraction: 500.0,
            center_repulsion: 500.0,
            ..quiet()
        });
        let mut root = parent_with(vec![System::new("a")]);
        root.add_interaction("b", "a", "sends", "x");

        engine.step(&mut root, DT);

        // Coincident with the parent: no direction, no force.
        assert!(root.subsystems()[0].net_force().is_zero());
    }

    #[test]
    fn outer_boundary_pulls_escapee_inward() {
        let engine = only(PhysicsParams {
            boundary_stiffness: 1000.0,
            ..quiet()
        });
        let mut root = parent_with(vec![
            System::new("a").with_position(Point::new(300.0, 0.0)),
        ])
        .with_outer_boundary_radius(Some(200.0));

        engine.step(&mut root, DT);

        // 100 past the boundary at stiffness 1000, pointing back inward.
        assert_approx_eq!(f32, root.subsystems()[0].net_force().x(), -100_000.0);
    }

    #[test]
    fn inner_boundary_pushes_intruder_outward() {
        let engine = only(PhysicsParams {
            boundary_stiffness: 1000.0,
            ..quiet()
        });
        let mut root = parent_with(vec![
            System::new("a").with_position(Point::new(50.0, 0.0)),
        ])
        .with_inner_boundary_radius(Some(120.0));

        engine.step(&mut root, DT);

        assert_approx_eq!(f32, root.subsystems()[0].net_force().x(), 70_000.0);
    }

    #[test]
    fn damping_decays_velocity_geometrically() {
        let engine = only(quiet());
        let mut root = parent_with(vec![System::new("a")]);
        root.subsystems[0].velocity = Point::new(64.0, -32.0);

        for _ in 0..3 {
            engine.step(&mut root, 1.0);
        }

        // No forces: velocity decays by the damping factor each step.
        let velocity = root.subsystems()[0].velocity();
        assert_approx_eq!(f32, velocity.x(), 64.0 * 0.9f32.powi(3), epsilon = 1e-3);
        assert_approx_eq!(f32, velocity.y(), -32.0 * 0.9f32.powi(3), epsilon = 1e-3);
    }

    #[test]
    fn dangling_interaction_exerts_no_spring_force() {
        let engine = only(PhysicsParams {
            spring_stiffness: 10.0,
            ..quiet()
        });
        // "b" lives a level deeper, not as a direct sibling of "a".
        let mut nested = System::new("inner").with_position(Point::new(400.0, 0.0));
        nested.add_subsystem(System::new("b").with_position(Point::new(400.0, 300.0)));
        let mut root = parent_with(vec![
            System::new("a").with_position(Point::new(-400.0, 0.0)),
            nested,
        ]);
        root.add_interaction("a", "b", "calls", "x");

        engine.step(&mut root, DT);

        assert!(root.subsystems()[0].net_force().is_zero());
        assert!(root.subsystems()[1].subsystems()[0].net_force().is_zero());
    }

    #[test]
    fn step_recurses_into_subsystem_groups() {
        let mut inner = System::new("inner").with_position(Point::new(0.0, 500.0));
        inner.add_subsystem(System::new("x").with_position(Point::new(-20.0, 500.0)));
        inner.add_subsystem(System::new("y").with_position(Point::new(20.0, 500.0)));
        let mut root = parent_with(vec![inner]);

        let before_x = root.subsystems()[0].subsystems()[0].position();
        Engine::new().step(&mut root, DT);

        // The nested pair repels: the grandchildren moved.
        assert!(root.subsystems()[0].subsystems()[0].position() != before_x);
    }

    #[test]
    fn stepping_is_deterministic() {
        let build = || {
            let mut root = parent_with(vec![
                System::new("a").with_position(Point::new(100.0, 20.0)),
                System::new("b").with_position(Point::new(-80.0, 60.0)),
                System::new("c").with_position(Point::new(10.0, -120.0)),
            ]);
            root.add_interaction("a", "b", "calls", "x");
            root.add_interaction("c", "a", "reads", "y");
            root
        };

        let engine = Engine::new();
        let mut first = build();
        let mut second = build();
        for _ in 0..50 {
            engine.step(&mut first, DT);
            engine.step(&mut second, DT);
        }

        for (a, b) in first.subsystems().iter().zip(second.subsystems()) {
            assert_eq!(a.position(), b.position());
        }
    }

    #[test]
    fn default_params_match_tuned_constants() {
        let params = PhysicsParams::default();
        assert_eq!(params.center_attraction, 500.0);
        assert_eq!(params.center_repulsion, 500.0);
        assert_eq!(params.boundary_stiffness, 1000.0);
        assert_eq!(params.pair_repulsion, 2.0e7);
        assert_eq!(params.pair_cutoff, 10_000.0);
        assert_eq!(params.spring_stiffness, 10.0);
        assert_eq!(params.spring_rest_length, 150.0);
        assert_eq!(params.damping, 0.9);
    }
}
