//! Attraction of every node toward the weighted centroid of its own category.

use std::collections::BTreeMap;

use super::{Force, Node, Point};

pub const DEFAULT_STRENGTH: f64 = 0.08;

/// Category name to centroid, as of the latest step.
pub type Centroids = BTreeMap<String, Point>;

/// Makes `category` follow `anchor`'s centroid shifted by `offset` instead of its own.
///
/// Keeps a near-empty category next to a related cluster rather than drifting on its own.
#[derive(Clone, Debug, PartialEq)]
pub struct CentroidAlias {
	pub category: String,
	pub anchor: String,
	pub offset: Point,
}

pub struct ClusterForce {
	strength: f64,
	aliases: Vec<CentroidAlias>,
	latest: Centroids,
	listener: Option<Box<dyn FnMut(&Centroids)>>,
}

impl Default for ClusterForce {
	fn default() -> Self {
		Self::new()
	}
}

impl ClusterForce {
	pub fn new() -> Self {
		Self {
			strength: DEFAULT_STRENGTH,
			aliases: Vec::new(),
			latest: Centroids::new(),
			listener: None,
		}
	}

	pub fn strength(mut self, strength: f64) -> Self {
		self.strength = strength;
		self
	}

	pub fn aliases(mut self, aliases: Vec<CentroidAlias>) -> Self {
		self.aliases = aliases;
		self
	}

	pub fn set_aliases(&mut self, aliases: Vec<CentroidAlias>) -> &mut Self {
		self.aliases = aliases;
		self
	}

	pub fn alias_table(&self) -> &[CentroidAlias] {
		&self.aliases
	}

	/// Registers a callback that receives the centroids every step, before any node moves.
	pub fn on_centroids(mut self, listener: impl FnMut(&Centroids) + 'static) -> Self {
		self.listener = Some(Box::new(listener));
		self
	}

	/// Snapshot from the most recent step.
	pub fn centroids(&self) -> &Centroids {
		&self.latest
	}

	fn compute(nodes: &[Node]) -> Centroids {
		let mut sums: BTreeMap<&str, (f64, f64, f64)> = BTreeMap::new();
		for node in nodes {
			let k = node.radius * node.radius;
			let sum = sums.entry(node.category()).or_default();
			sum.0 += node.x * k;
			sum.1 += node.y * k;
			sum.2 += k;
		}
		sums.into_iter()
			.filter(|(_, (_, _, z))| *z > 0.0)
			.map(|(category, (x, y, z))| (category.to_string(), Point::new(x / z, y / z)))
			.collect()
	}

	fn target_for(&self, category: &str) -> Option<Point> {
		let alias = self
			.aliases
			.iter()
			.find(|a| a.category == category)
			.and_then(|a| {
				self.latest.get(&a.anchor).map(|c| Point::new(c.x + a.offset.x, c.y + a.offset.y))
			});
		alias.or_else(|| self.latest.get(category).copied())
	}
}

impl Force for ClusterForce {
	fn apply(&mut self, nodes: &mut [Node], alpha: f64) {
		self.latest = Self::compute(nodes);
		if let Some(listener) = self.listener.as_mut() {
			listener(&self.latest);
		}

		let k = alpha * self.strength;
		for node in nodes.iter_mut() {
			let Some(c) = self.target_for(node.category()) else {
				continue;
			};
			node.vx -= (node.x - c.x) * k;
			node.vy -= (node.y - c.y) * k;
		}
	}
}
