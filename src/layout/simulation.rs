use log::debug;

use super::{Axis, ClusterForce, CollideForce, Force, Node, PositionForce};
use crate::config::SimulationConfig;

/// Installed forces, listed in the order they run each step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ForceSlot {
	CenterX,
	CenterY,
	Cluster,
	Collide,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimState {
	Idle,
	Running,
}

/// Owns the nodes and steps them under the installed forces.
///
/// Each step cools `alpha` toward its target, runs centering, then clustering, then
/// collision (collision has to see post-cluster positions or it re-introduces overlap),
/// integrates velocity into position, and finally hands the nodes to the tick callback.
pub struct LayoutSimulation {
	nodes: Vec<Node>,
	alpha: f64,
	alpha_min: f64,
	alpha_decay: f64,
	alpha_target: f64,
	velocity_decay: f64,
	state: SimState,
	center_x: Option<PositionForce>,
	center_y: Option<PositionForce>,
	cluster: Option<ClusterForce>,
	collide: Option<CollideForce>,
	on_tick: Option<Box<dyn FnMut(&[Node])>>,
}

impl LayoutSimulation {
	pub fn new(config: &SimulationConfig) -> Self {
		Self {
			nodes: Vec::new(),
			alpha: 1.0,
			alpha_min: config.alpha_min,
			alpha_decay: config.alpha_decay,
			alpha_target: config.alpha_target,
			velocity_decay: config.velocity_decay,
			state: SimState::Running,
			center_x: None,
			center_y: None,
			cluster: None,
			collide: None,
			on_tick: None,
		}
	}

	/// Takes ownership of the node set for the lifetime of the simulation.
	pub fn initialize(&mut self, nodes: Vec<Node>) {
		self.nodes = nodes;
		self.reinit_forces();
		self.alpha = 1.0;
		self.state = SimState::Running;
	}

	fn reinit_forces(&mut self) {
		let nodes = &self.nodes;
		if let Some(f) = self.center_x.as_mut() {
			f.set_nodes(nodes);
		}
		if let Some(f) = self.center_y.as_mut() {
			f.set_nodes(nodes);
		}
		if let Some(f) = self.cluster.as_mut() {
			f.set_nodes(nodes);
		}
		if let Some(f) = self.collide.as_mut() {
			f.set_nodes(nodes);
		}
	}

	pub fn set_center(&mut self, axis: Axis, force: Option<PositionForce>) -> &mut Self {
		let slot = match axis {
			Axis::X => &mut self.center_x,
			Axis::Y => &mut self.center_y,
		};
		*slot = force;
		if let Some(f) = slot.as_mut() {
			f.set_nodes(&self.nodes);
		}
		self
	}

	pub fn set_cluster(&mut self, force: Option<ClusterForce>) -> &mut Self {
		self.cluster = force;
		if let Some(f) = self.cluster.as_mut() {
			f.set_nodes(&self.nodes);
		}
		self
	}

	pub fn set_collide(&mut self, force: Option<CollideForce>) -> &mut Self {
		self.collide = force;
		if let Some(f) = self.collide.as_mut() {
			f.set_nodes(&self.nodes);
		}
		self
	}

	pub fn remove_force(&mut self, slot: ForceSlot) -> &mut Self {
		match slot {
			ForceSlot::CenterX => self.center_x = None,
			ForceSlot::CenterY => self.center_y = None,
			ForceSlot::Cluster => self.cluster = None,
			ForceSlot::Collide => self.collide = None,
		}
		self
	}

	pub fn center_mut(&mut self, axis: Axis) -> Option<&mut PositionForce> {
		match axis {
			Axis::X => self.center_x.as_mut(),
			Axis::Y => self.center_y.as_mut(),
		}
	}

	pub fn center(&self, axis: Axis) -> Option<&PositionForce> {
		match axis {
			Axis::X => self.center_x.as_ref(),
			Axis::Y => self.center_y.as_ref(),
		}
	}

	pub fn cluster(&self) -> Option<&ClusterForce> {
		self.cluster.as_ref()
	}

	pub fn cluster_mut(&mut self) -> Option<&mut ClusterForce> {
		self.cluster.as_mut()
	}

	pub fn collide(&self) -> Option<&CollideForce> {
		self.collide.as_ref()
	}

	pub fn collide_mut(&mut self) -> Option<&mut CollideForce> {
		self.collide.as_mut()
	}

	pub fn on_tick(&mut self, callback: impl FnMut(&[Node]) + 'static) -> &mut Self {
		self.on_tick = Some(Box::new(callback));
		self
	}

	/// Sets alpha without touching the running state.
	pub fn set_alpha(&mut self, alpha: f64) -> &mut Self {
		self.alpha = alpha;
		self
	}

	/// Raises alpha to `alpha` and resumes stepping, unless the simulation is already running
	/// at least that hot. Returns whether anything changed.
	pub fn restart_if_higher_alpha(&mut self, alpha: f64) -> bool {
		if alpha <= self.alpha && self.state == SimState::Running {
			return false;
		}
		if alpha > self.alpha {
			self.alpha = alpha;
		}
		if self.alpha < self.alpha_min {
			return false;
		}
		if self.state == SimState::Idle {
			debug!("simulation restarted at alpha {:.3}", self.alpha);
		}
		self.state = SimState::Running;
		true
	}

	/// Replaces every node's radius and lets the forces re-read the node set.
	pub fn set_radii(&mut self, radius: impl Fn(&Node) -> f64) {
		for node in &mut self.nodes {
			node.radius = radius(node).max(f64::MIN_POSITIVE);
		}
		self.reinit_forces();
	}

	pub fn step(&mut self) {
		self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;
		let alpha = self.alpha;
		let nodes = self.nodes.as_mut_slice();

		if let Some(f) = self.center_x.as_mut() {
			f.apply(nodes, alpha);
		}
		if let Some(f) = self.center_y.as_mut() {
			f.apply(nodes, alpha);
		}
		if let Some(f) = self.cluster.as_mut() {
			f.apply(nodes, alpha);
		}
		if let Some(f) = self.collide.as_mut() {
			f.apply(nodes, alpha);
		}

		let keep = 1.0 - self.velocity_decay;
		for node in nodes.iter_mut() {
			node.vx *= keep;
			node.vy *= keep;
			node.x += node.vx;
			node.y += node.vy;
		}

		if self.alpha < self.alpha_min {
			self.state = SimState::Idle;
		}
		if let Some(callback) = self.on_tick.as_mut() {
			callback(&self.nodes);
		}
	}

	/// One frame of the animation loop: steps once if running. Returns whether it stepped.
	pub fn tick(&mut self) -> bool {
		if self.state == SimState::Idle {
			return false;
		}
		self.step();
		true
	}

	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	pub fn state(&self) -> SimState {
		self.state
	}

	pub fn is_running(&self) -> bool {
		self.state == SimState::Running
	}
}

#[cfg(test)]
mod tests {
	use std::cell::Cell;
	use std::collections::BTreeSet;
	use std::rc::Rc;

	use super::*;
	use crate::layout::scale::SqrtScale;
	use crate::layout::{Point, weighted_centroid};

	fn sim() -> LayoutSimulation {
		LayoutSimulation::new(&SimulationConfig::default())
	}

	fn ring(n: usize) -> Vec<Node> {
		(0..n)
			.map(|i| {
				let angle = i as f64 * 0.7;
				let category = ["A", "B", "C"][i % 3];
				Node::new(format!("n{i}"), category, 10.0 + i as f64, 4.0 + (i % 5) as f64)
					.at(Point::new(50.0 * angle.cos(), 50.0 * angle.sin()))
			})
			.collect()
	}

	#[test]
	fn stepping_never_loses_nodes() {
		let nodes = ring(60);
		let ids: BTreeSet<String> = nodes.iter().map(|n| n.id.clone()).collect();
		let mut sim = sim();
		sim.set_center(Axis::X, Some(PositionForce::x()))
			.set_center(Axis::Y, Some(PositionForce::y()))
			.set_cluster(Some(ClusterForce::new()))
			.set_collide(Some(CollideForce::new()));
		sim.initialize(nodes);
		for _ in 0..120 {
			sim.step();
		}
		let after: BTreeSet<String> = sim.nodes().iter().map(|n| n.id.clone()).collect();
		assert_eq!(sim.nodes().len(), 60);
		assert_eq!(after, ids);
		assert!(sim.nodes().iter().all(|n| n.position().x.is_finite()));
	}

	#[test]
	fn alpha_cools_until_idle() {
		let mut sim = sim();
		sim.initialize(ring(3));
		let mut steps = 0;
		while sim.tick() {
			steps += 1;
			assert!(steps < 1000);
		}
		assert_eq!(sim.state(), SimState::Idle);
		assert!(sim.alpha() < 0.001);
		assert!((290..=310).contains(&steps));
	}

	#[test]
	fn restart_ignores_lower_or_equal_alpha() {
		let mut sim = sim();
		sim.initialize(ring(3));
		sim.set_alpha(0.8);
		assert!(!sim.restart_if_higher_alpha(0.5));
		assert!(!sim.restart_if_higher_alpha(0.8));
		assert_eq!(sim.alpha(), 0.8);
		assert!(sim.restart_if_higher_alpha(0.9));
		assert_eq!(sim.alpha(), 0.9);
	}

	#[test]
	fn restart_wakes_an_idle_simulation() {
		let mut sim = sim();
		sim.initialize(ring(3));
		while sim.tick() {}
		assert!(sim.restart_if_higher_alpha(0.3));
		assert!(sim.is_running());
		assert!(sim.tick());
	}

	#[test]
	fn tick_callback_sees_integrated_positions() {
		let mut sim = sim();
		sim.set_center(Axis::X, Some(PositionForce::x().strength(1.0)));
		sim.initialize(vec![Node::new("a", "A", 1.0, 1.0).at(Point::new(100.0, 0.0))]);
		let seen = Rc::new(Cell::new(f64::NAN));
		let sink = seen.clone();
		sim.on_tick(move |nodes| sink.set(nodes[0].position().x));
		sim.step();
		assert!(seen.get() < 100.0);
		assert_eq!(seen.get(), sim.nodes()[0].position().x);
	}

	#[test]
	fn clusters_separate_without_centering() {
		let scale = SqrtScale::new((100.0, 400.0), (5.0, 10.0));
		let node = |id: &str, category: &str, weight: f64, x: f64| {
			Node::new(id, category, weight, scale.apply(weight)).at(Point::new(x, 0.0))
		};
		let mut sim = sim();
		sim.set_cluster(Some(ClusterForce::new()))
			.set_collide(Some(CollideForce::new()));
		sim.initialize(vec![
			node("x1", "X", 100.0, -40.0),
			node("x2", "X", 100.0, -29.0),
			node("y1", "Y", 400.0, 0.0),
			node("y2", "Y", 400.0, 21.0),
		]);
		while sim.tick() {}

		let (r_small, r_large) = (scale.apply(100.0), scale.apply(400.0));
		let collide = sim.collide().unwrap();
		let (pad_same, pad_cross) = (collide.padding_same(), collide.padding_cross());
		let nodes = sim.nodes();
		let cx = weighted_centroid(nodes.iter().filter(|n| n.category() == "X")).unwrap();
		let cy = weighted_centroid(nodes.iter().filter(|n| n.category() == "Y")).unwrap();
		assert!(cx.distance(cy) >= r_small + r_large + pad_cross);

		let d = |a: usize, b: usize| nodes[a].position().distance(nodes[b].position());
		assert!(d(0, 1) >= 2.0 * r_small + pad_same - 0.05);
		assert!(d(2, 3) >= 2.0 * r_large + pad_same - 0.05);
		for (a, b) in [(0, 2), (0, 3), (1, 2), (1, 3)] {
			assert!(d(a, b) >= r_small + r_large + pad_cross - 0.05);
		}
	}

	#[test]
	fn removed_force_behaves_as_never_installed() {
		let config = SimulationConfig::default();
		let build = || {
			let mut sim = LayoutSimulation::new(&config);
			sim.set_center(Axis::X, Some(config.center_force(PositionForce::x())))
				.set_center(Axis::Y, Some(config.center_force(PositionForce::y())))
				.set_cluster(Some(config.cluster_force()))
				.set_collide(Some(config.collide_force()));
			sim.initialize(ring(30));
			sim
		};
		let (mut with, mut without) = (build(), build());
		for _ in 0..40 {
			with.step();
			without.step();
		}

		without.remove_force(ForceSlot::Collide).remove_force(ForceSlot::CenterX);
		assert!(without.collide().is_none());
		assert!(without.center(Axis::X).is_none());
		assert!(without.cluster().is_some());

		// Same remaining forces in the same order: center y, then cluster.
		with.set_collide(None).set_center(Axis::X, None);
		for _ in 0..40 {
			with.step();
			without.step();
		}
		assert_eq!(without.nodes().len(), 30);
		for (a, b) in with.nodes().iter().zip(without.nodes()) {
			assert_eq!(a.id, b.id);
			assert_eq!(a.position(), b.position());
		}
	}
}
