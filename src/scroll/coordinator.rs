//! Maps scroll steps onto simulation and rotation changes.

use std::collections::BTreeSet;
use std::f64::consts::PI;

use log::{debug, warn};

use super::rotation::{RotationAnimator, RotationHandle};
use super::steps::{Direction, HighlightClass, ScrollStep, StepRule, StepTarget, lookup};
use crate::layout::{Axis, LayoutSimulation, Membership, Point, Target, weighted_centroid};

/// Screen direction an isolated subset is turned to face.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Facing {
	Left,
	Up,
}

impl Facing {
	/// Landscape viewports send the subset left, portrait ones send it up.
	pub fn for_viewport(width: f64, height: f64) -> Self {
		if width >= height { Facing::Left } else { Facing::Up }
	}

	/// Screen angle, with y growing downward.
	pub fn angle(self) -> f64 {
		match self {
			Facing::Left => PI,
			Facing::Up => -PI / 2.0,
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScrollState {
	pub index: Option<usize>,
	pub direction: Direction,
	pub isolated: Option<BTreeSet<String>>,
	pub size_separation: bool,
	/// Net field rotation the coordinator last asked for.
	pub rotation: f64,
}

impl Default for ScrollState {
	fn default() -> Self {
		Self {
			index: None,
			direction: Direction::Down,
			isolated: None,
			size_separation: false,
			rotation: 0.0,
		}
	}
}

/// Outcome of entering a step.
pub struct Transition {
	/// Present when the step started a new rotation.
	pub rotation: Option<RotationHandle>,
	pub highlight: Vec<HighlightClass>,
}

pub struct ScrollCoordinator {
	rules: Vec<StepRule>,
	state: ScrollState,
	facing: Facing,
	separation_offset: f64,
	transition_alpha: f64,
	size_threshold: f64,
}

impl ScrollCoordinator {
	pub fn new(
		rules: Vec<StepRule>,
		facing: Facing,
		separation_offset: f64,
		transition_alpha: f64,
		size_threshold: f64,
	) -> Self {
		Self {
			rules,
			state: ScrollState::default(),
			facing,
			separation_offset,
			transition_alpha,
			size_threshold,
		}
	}

	pub fn state(&self) -> &ScrollState {
		&self.state
	}

	pub fn facing(&self) -> Facing {
		self.facing
	}

	/// Switches facing, turning an isolated subset toward the new side if one is active.
	pub fn reorient(
		&mut self,
		facing: Facing,
		sim: &mut LayoutSimulation,
		rotation: &mut RotationAnimator,
	) -> Option<RotationHandle> {
		if facing == self.facing {
			return None;
		}
		debug!("facing changed to {facing:?}");
		self.facing = facing;
		let set = self.state.isolated.clone()?;
		let theta = self.subset_angle(&set, sim)?;
		let handle = rotation.rotate_to(facing.angle() - theta);
		self.apply_centering(sim, rotation.target());
		self.state.rotation = rotation.target();
		Some(handle)
	}

	pub fn set_separation_offset(&mut self, offset: f64) {
		self.separation_offset = offset;
	}

	/// Reacts to a step event. Unknown steps are ignored.
	pub fn on_step(
		&mut self,
		step: ScrollStep,
		sim: &mut LayoutSimulation,
		rotation: &mut RotationAnimator,
	) -> Option<Transition> {
		let Some(target) = lookup(&self.rules, step).cloned() else {
			warn!("no narrative rule for step {}", step.index);
			return None;
		};
		debug!("entered step {} going {:?}", step.index, step.direction);
		self.state.index = Some(step.index);
		self.state.direction = step.direction;
		Some(self.transition(&target, sim, rotation))
	}

	/// Moves the chart to `target`. Re-entering the current isolation is a no-op for the
	/// rotation and the centering forces.
	pub fn transition(
		&mut self,
		target: &StepTarget,
		sim: &mut LayoutSimulation,
		rotation: &mut RotationAnimator,
	) -> Transition {
		let mut reheat = false;
		let mut handle = None;

		if target.size_separation != self.state.size_separation {
			if let Some(collide) = sim.collide_mut() {
				if target.size_separation {
					collide.ghost(self.size_threshold);
					if let Some(delay) = target.ghost_restore_delay_ms {
						collide.defer_unghost(delay);
					}
				} else {
					collide.unghost();
				}
			}
			self.state.size_separation = target.size_separation;
			reheat = true;
		}

		let isolate = target.isolate.clone();
		if isolate != self.state.isolated {
			match &isolate {
				Some(set) if set.is_empty() => warn!("empty isolation target ignored"),
				Some(set) => match self.subset_angle(set, sim) {
					Some(theta) => {
						handle = Some(rotation.rotate_to(self.facing.angle() - theta));
						self.state.isolated = isolate;
						reheat = true;
					}
					None => warn!("isolation target {set:?} matches no nodes"),
				},
				None => {
					handle = Some(rotation.rotate_to(0.0));
					self.state.isolated = None;
					reheat = true;
				}
			}
		}

		if reheat {
			self.apply_centering(sim, rotation.target());
			sim.restart_if_higher_alpha(self.transition_alpha);
		}
		self.state.rotation = rotation.target();

		Transition {
			rotation: handle,
			highlight: target.highlight.clone(),
		}
	}

	/// Returns to the centered layout with no rotation.
	pub fn unseparate(
		&mut self,
		sim: &mut LayoutSimulation,
		rotation: &mut RotationAnimator,
	) -> Transition {
		self.transition(&StepTarget::default(), sim, rotation)
	}

	/// Re-derives the centering targets, e.g. after the viewport changed.
	pub fn refresh(&mut self, sim: &mut LayoutSimulation, rotation: &RotationAnimator) {
		self.apply_centering(sim, rotation.target());
	}

	/// Polar angle of the subset's weighted centroid in simulation space.
	fn subset_angle(&self, set: &BTreeSet<String>, sim: &LayoutSimulation) -> Option<f64> {
		let members = sim.nodes().iter().filter(|n| set.contains(n.category()));
		weighted_centroid(members).map(Point::angle)
	}

	fn apply_centering(&self, sim: &mut LayoutSimulation, field_rotation: f64) {
		let targets = match (&self.state.isolated, self.state.size_separation) {
			(Some(set), _) => {
				// Pull the subset further out along the direction it already sits in.
				let theta = self.facing.angle() - field_rotation;
				let anchor = Point::new(self.separation_offset, 0.0).rotate(theta);
				Some((Membership::Categories(set.clone()), anchor))
			}
			(None, true) => {
				let theta = self.facing.angle() - field_rotation;
				let anchor = Point::new(self.separation_offset, 0.0).rotate(theta);
				Some((Membership::HeavierThan(self.size_threshold), anchor))
			}
			(None, false) => None,
		};

		let (x, y) = match targets {
			Some((members, anchor)) => (
				Target::Split {
					members: members.clone(),
					value: anchor.x,
				},
				Target::Split {
					members,
					value: anchor.y,
				},
			),
			None => (Target::Fixed(0.0), Target::Fixed(0.0)),
		};
		if let Some(f) = sim.center_mut(Axis::X) {
			f.set_target(x);
		}
		if let Some(f) = sim.center_mut(Axis::Y) {
			f.set_target(y);
		}
	}
}

#[cfg(test)]
mod tests {
	use futures::executor::block_on;

	use super::*;
	use crate::config::SimulationConfig;
	use crate::layout::{Node, PositionForce};
	use crate::scroll::RotationOutcome;

	fn set(names: &[&str]) -> BTreeSet<String> {
		names.iter().map(|s| s.to_string()).collect()
	}

	fn isolate(names: &[&str]) -> StepTarget {
		StepTarget {
			isolate: Some(set(names)),
			..Default::default()
		}
	}

	fn fixture() -> (ScrollCoordinator, LayoutSimulation, RotationAnimator) {
		let config = SimulationConfig::default();
		let mut sim = LayoutSimulation::new(&config);
		sim.set_center(Axis::X, Some(config.center_force(PositionForce::x())))
			.set_center(Axis::Y, Some(config.center_force(PositionForce::y())))
			.set_cluster(Some(config.cluster_force()))
			.set_collide(Some(config.collide_force()));
		// A sits straight below the origin, B straight to the right.
		sim.initialize(vec![
			Node::new("a1", "A", 50.0, 5.0).at(Point::new(-5.0, 80.0)),
			Node::new("a2", "A", 50.0, 5.0).at(Point::new(5.0, 80.0)),
			Node::new("b1", "B", 5000.0, 20.0).at(Point::new(80.0, 0.0)),
			Node::new("c1", "C", 300.0, 8.0).at(Point::new(-60.0, -60.0)),
		]);
		let coordinator = ScrollCoordinator::new(Vec::new(), Facing::Left, 100.0, 0.6, 1000.0);
		(coordinator, sim, RotationAnimator::new(1200.0, 500.0))
	}

	fn snapshot(sim: &LayoutSimulation) -> Vec<(Point, Point)> {
		sim.nodes().iter().map(|n| (n.position(), n.velocity())).collect()
	}

	#[test]
	fn isolation_turns_subset_to_face_left() {
		let (mut coord, mut sim, mut rot) = fixture();
		let t = coord.transition(&isolate(&["A"]), &mut sim, &mut rot);
		assert!(t.rotation.is_some());
		// A's centroid is at +π/2; facing left (π) needs a +π/2 turn.
		assert!((rot.target() - PI / 2.0).abs() < 1e-9);
		assert_eq!(coord.state().isolated, Some(set(&["A"])));

		// In simulation space the anchor lies along +y, where A already is.
		let x = sim.center(Axis::X).unwrap().current_target().clone();
		let y = sim.center(Axis::Y).unwrap().current_target().clone();
		match (x, y) {
			(Target::Split { value: vx, .. }, Target::Split { value: vy, members }) => {
				assert!(vx.abs() < 1e-9);
				assert!((vy - 100.0).abs() < 1e-9);
				assert_eq!(members, Membership::Categories(set(&["A"])));
			}
			other => panic!("expected split targets, got {other:?}"),
		}
	}

	#[test]
	fn re_isolating_same_subset_is_a_no_op() {
		let (mut coord, mut sim, mut rot) = fixture();
		let first = coord.transition(&isolate(&["A"]), &mut sim, &mut rot);
		assert!(first.rotation.is_some());
		let generation = first.rotation.as_ref().map(|h| h.generation());
		let second = coord.transition(&isolate(&["A"]), &mut sim, &mut rot);
		assert!(second.rotation.is_none());
		assert!(rot.is_animating());
		assert_eq!(generation, Some(1));
	}

	#[test]
	fn newer_isolation_cancels_in_flight_rotation() {
		let (mut coord, mut sim, mut rot) = fixture();
		let to_a = coord.transition(&isolate(&["A"]), &mut sim, &mut rot);
		rot.advance(200.0);

		let before = snapshot(&sim);
		let to_b = coord.transition(&isolate(&["B"]), &mut sim, &mut rot);
		assert_eq!(snapshot(&sim), before);

		assert_eq!(block_on(to_a.rotation.unwrap()), RotationOutcome::Interrupted);
		let mut settled = 0;
		for _ in 0..200 {
			if rot.advance(16.0) {
				settled += 1;
			}
		}
		assert_eq!(settled, 1);
		// B sits at angle 0, so the field ends up turned by π.
		assert!((rot.angle().abs() - PI).abs() < 1e-9);
		assert_eq!(block_on(to_b.rotation.unwrap()), RotationOutcome::Settled);
	}

	#[test]
	fn unseparate_resets_forces_and_rotation() {
		let (mut coord, mut sim, mut rot) = fixture();
		let _ = coord.transition(&isolate(&["A"]), &mut sim, &mut rot);
		let back = coord.unseparate(&mut sim, &mut rot);
		assert!(back.rotation.is_some());
		assert_eq!(rot.target(), 0.0);
		assert_eq!(coord.state().isolated, None);
		assert_eq!(sim.center(Axis::X).unwrap().current_target(), &Target::Fixed(0.0));
		assert_eq!(sim.center(Axis::Y).unwrap().current_target(), &Target::Fixed(0.0));
	}

	#[test]
	fn unknown_subset_changes_nothing() {
		let (mut coord, mut sim, mut rot) = fixture();
		let t = coord.transition(&isolate(&["Nope"]), &mut sim, &mut rot);
		assert!(t.rotation.is_none());
		assert_eq!(coord.state().isolated, None);
		assert!(!rot.is_animating());
	}

	#[test]
	fn reorient_turns_isolated_subset_to_new_side() {
		let (mut coord, mut sim, mut rot) = fixture();
		assert!(coord.reorient(Facing::Left, &mut sim, &mut rot).is_none());
		let _ = coord.transition(&isolate(&["B"]), &mut sim, &mut rot);
		let handle = coord.reorient(Facing::Up, &mut sim, &mut rot);
		assert!(handle.is_some());
		assert_eq!(coord.facing(), Facing::Up);
		assert!((rot.target() + PI / 2.0).abs() < 1e-9);
	}

	#[test]
	fn empty_isolation_set_keeps_current_layout() {
		let (mut coord, mut sim, mut rot) = fixture();
		let _ = coord.transition(&isolate(&["A"]), &mut sim, &mut rot);
		while rot.is_animating() {
			rot.advance(16.0);
		}
		let before_rotation = rot.target();
		let before_x = sim.center(Axis::X).unwrap().current_target().clone();

		let t = coord.transition(&isolate(&[]), &mut sim, &mut rot);
		assert!(t.rotation.is_none());
		assert!(!rot.is_animating());
		assert_eq!(coord.state().isolated, Some(set(&["A"])));
		assert_eq!(rot.target(), before_rotation);
		assert_eq!(sim.center(Axis::X).unwrap().current_target(), &before_x);
	}

	#[test]
	fn size_separation_ghosts_and_restores() {
		let (mut coord, mut sim, mut rot) = fixture();
		let split = StepTarget {
			size_separation: true,
			ghost_restore_delay_ms: Some(1000.0),
			..Default::default()
		};
		coord.transition(&split, &mut sim, &mut rot);
		let collide = sim.collide().unwrap();
		assert!(collide.is_ghosting());
		assert!(collide.has_pending_restore());
		assert_eq!(
			sim.center(Axis::X).unwrap().current_target(),
			&Target::Split {
				members: Membership::HeavierThan(1000.0),
				value: -100.0
			}
		);

		coord.transition(&StepTarget::default(), &mut sim, &mut rot);
		assert!(!sim.collide().unwrap().is_ghosting());
	}

	#[test]
	fn transitions_reheat_the_simulation() {
		let (mut coord, mut sim, mut rot) = fixture();
		while sim.tick() {}
		let _ = coord.transition(&isolate(&["C"]), &mut sim, &mut rot);
		assert!(sim.is_running());
		assert_eq!(sim.alpha(), 0.6);
	}

	#[test]
	fn steps_follow_the_rule_table() {
		let (_, mut sim, mut rot) = fixture();
		let rules = vec![
			StepRule {
				index: 0,
				direction: None,
				target: StepTarget::default(),
			},
			StepRule {
				index: 1,
				direction: None,
				target: isolate(&["B"]),
			},
		];
		let mut coord = ScrollCoordinator::new(rules, Facing::Up, 100.0, 0.6, 1000.0);
		let down = coord
			.on_step(ScrollStep { index: 1, direction: Direction::Down }, &mut sim, &mut rot)
			.unwrap();
		assert!(down.rotation.is_some());
		// B at angle 0 must turn to face up (-π/2).
		assert!((rot.target() + PI / 2.0).abs() < 1e-9);
		assert_eq!(coord.state().index, Some(1));

		let up = coord
			.on_step(ScrollStep { index: 0, direction: Direction::Up }, &mut sim, &mut rot)
			.unwrap();
		assert!(up.rotation.is_some());
		assert_eq!(coord.state().direction, Direction::Up);
		assert!(coord
			.on_step(ScrollStep { index: 7, direction: Direction::Down }, &mut sim, &mut rot)
			.is_none());
	}
}
