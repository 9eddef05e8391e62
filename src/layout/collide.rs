//! Collision between bubbles, with more whitespace between categories than within one.
//!
//! Overlapping pairs are pushed apart directly in position space by a fixed fraction of the
//! overlap. That fraction does not follow the simulation's alpha, so clusters stay crisp while
//! the rest of the layout cools down.

use log::debug;

use super::quadtree::{Bounds, QuadTree};
use super::{Force, Node};

pub const DEFAULT_RIGIDITY: f64 = 0.4;
pub const DEFAULT_PADDING_SAME: f64 = 1.0;
pub const DEFAULT_PADDING_CROSS: f64 = 17.0;
pub const DEFAULT_GHOST_PADDING_CROSS: f64 = 12.0;

/// Separation used when two centers coincide exactly.
const JIGGLE: f64 = 1e-6;

#[derive(Clone, Debug)]
pub struct CollideForce {
	rigidity: f64,
	padding_same: f64,
	padding_cross: f64,
	ghost_padding_cross: f64,
	/// While set, only nodes on the same side of this weight threshold collide.
	ghost_threshold: Option<f64>,
	/// Milliseconds left before ghosting switches itself off.
	restore_in: Option<f64>,
	reach: f64,
}

impl Default for CollideForce {
	fn default() -> Self {
		Self::new()
	}
}

impl CollideForce {
	pub fn new() -> Self {
		Self {
			rigidity: DEFAULT_RIGIDITY,
			padding_same: DEFAULT_PADDING_SAME,
			padding_cross: DEFAULT_PADDING_CROSS,
			ghost_padding_cross: DEFAULT_GHOST_PADDING_CROSS,
			ghost_threshold: None,
			restore_in: None,
			reach: 0.0,
		}
	}

	pub fn rigidity(mut self, rigidity: f64) -> Self {
		self.rigidity = rigidity;
		self
	}

	pub fn padding(mut self, same: f64, cross: f64) -> Self {
		self.padding_same = same;
		self.padding_cross = cross;
		self
	}

	/// Cross-category padding used while ghosting.
	pub fn ghost_padding(mut self, cross: f64) -> Self {
		self.ghost_padding_cross = cross;
		self
	}

	/// Lets nodes on opposite sides of `threshold` pass through each other. Cancels any
	/// pending deferred restore.
	pub fn ghost(&mut self, threshold: f64) -> &mut Self {
		debug!("collision ghosting on (threshold {threshold})");
		self.restore_in = None;
		self.ghost_threshold = Some(threshold);
		self
	}

	pub fn unghost(&mut self) -> &mut Self {
		if self.ghost_threshold.is_some() {
			debug!("collision ghosting off");
		}
		self.restore_in = None;
		self.ghost_threshold = None;
		self
	}

	/// Turns ghosting off once `delay_ms` of clock time has passed, giving the nodes a moment
	/// to settle first. A later [`ghost`](Self::ghost) call cancels it.
	pub fn defer_unghost(&mut self, delay_ms: f64) -> &mut Self {
		if self.ghost_threshold.is_some() {
			debug!("collision ghosting off in {delay_ms}ms");
			self.restore_in = Some(delay_ms);
		}
		self
	}

	/// Advances the deferred-restore clock. Returns `true` if ghosting was switched off.
	pub fn advance_clock(&mut self, dt_ms: f64) -> bool {
		let Some(left) = self.restore_in else {
			return false;
		};
		let left = left - dt_ms;
		if left > 0.0 {
			self.restore_in = Some(left);
			return false;
		}
		self.unghost();
		true
	}

	pub fn is_ghosting(&self) -> bool {
		self.ghost_threshold.is_some()
	}

	pub fn has_pending_restore(&self) -> bool {
		self.restore_in.is_some()
	}

	pub fn padding_same(&self) -> f64 {
		self.padding_same
	}

	/// Cross-category padding currently in effect.
	pub fn padding_cross(&self) -> f64 {
		if self.is_ghosting() {
			self.ghost_padding_cross
		} else {
			self.padding_cross
		}
	}
}

impl Force for CollideForce {
	fn set_nodes(&mut self, nodes: &[Node]) {
		let max_radius = nodes.iter().map(Node::radius).fold(0.0, f64::max);
		let max_padding = self
			.padding_same
			.max(self.padding_cross)
			.max(self.ghost_padding_cross);
		self.reach = max_radius + max_padding;
	}

	fn apply(&mut self, nodes: &mut [Node], _alpha: f64) {
		let tree = QuadTree::build(nodes.iter().map(Node::position));
		let (rigidity, padding_same, padding_cross) =
			(self.rigidity, self.padding_same, self.padding_cross());
		let ghost = self.ghost_threshold;

		for i in 0..nodes.len() {
			let region = Bounds::around(nodes[i].position(), nodes[i].radius + self.reach);

			tree.visit(|bounds, items| {
				for &j in items {
					if j == i {
						continue;
					}
					if let Some(t) = ghost {
						if (nodes[i].weight > t) != (nodes[j].weight > t) {
							continue;
						}
					}
					let padding = if nodes[i].category() == nodes[j].category() {
						padding_same
					} else {
						padding_cross
					};
					let min_distance = nodes[i].radius + nodes[j].radius + padding;
					let mut dx = nodes[i].x - nodes[j].x;
					let mut dy = nodes[i].y - nodes[j].y;
					let mut distance = dx.hypot(dy);
					if distance >= min_distance {
						continue;
					}
					if distance == 0.0 {
						dx = if i < j { -JIGGLE } else { JIGGLE };
						dy = 0.0;
						distance = JIGGLE;
					}
					let k = (distance - min_distance) / distance * rigidity;
					dx *= k;
					dy *= k;
					nodes[i].x -= dx;
					nodes[i].y -= dy;
					nodes[j].x += dx;
					nodes[j].y += dy;
				}
				!bounds.intersects(&region)
			});
		}
	}
}
