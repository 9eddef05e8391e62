use std::collections::BTreeSet;

use super::{Force, Node};

pub const DEFAULT_STRENGTH: f64 = 0.02;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
	X,
	Y,
}

/// Selects the nodes that go to the positive side of a [`Target::Split`].
#[derive(Clone, Debug, PartialEq)]
pub enum Membership {
	Categories(BTreeSet<String>),
	/// Nodes whose weight is strictly above the threshold.
	HeavierThan(f64),
}

impl Membership {
	pub fn contains(&self, node: &Node) -> bool {
		match self {
			Membership::Categories(set) => set.contains(node.category()),
			Membership::HeavierThan(threshold) => node.weight() > *threshold,
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub enum Target {
	/// Every node is drawn to the same coordinate.
	Fixed(f64),
	/// Members are drawn to `value`, everyone else to `-value`.
	Split { members: Membership, value: f64 },
}

impl Target {
	fn resolve(&self, node: &Node) -> f64 {
		match self {
			Target::Fixed(v) => *v,
			Target::Split { members, value } if members.contains(node) => *value,
			Target::Split { value, .. } => -*value,
		}
	}
}

/// Pulls each node's velocity toward a target coordinate on one axis.
#[derive(Clone, Debug)]
pub struct PositionForce {
	axis: Axis,
	strength: f64,
	target: Target,
}

impl PositionForce {
	pub fn new(axis: Axis) -> Self {
		Self {
			axis,
			strength: DEFAULT_STRENGTH,
			target: Target::Fixed(0.0),
		}
	}

	pub fn x() -> Self {
		Self::new(Axis::X)
	}

	pub fn y() -> Self {
		Self::new(Axis::Y)
	}

	pub fn strength(mut self, strength: f64) -> Self {
		self.strength = strength;
		self
	}

	pub fn target(mut self, target: Target) -> Self {
		self.target = target;
		self
	}

	pub fn set_target(&mut self, target: Target) -> &mut Self {
		self.target = target;
		self
	}

	pub fn current_target(&self) -> &Target {
		&self.target
	}

	pub fn axis(&self) -> Axis {
		self.axis
	}
}

impl Force for PositionForce {
	fn apply(&mut self, nodes: &mut [Node], alpha: f64) {
		let k = self.strength * alpha;
		for node in nodes {
			let t = self.target.resolve(node);
			match self.axis {
				Axis::X => node.vx += (t - node.x) * k,
				Axis::Y => node.vy += (t - node.y) * k,
			}
		}
	}
}
