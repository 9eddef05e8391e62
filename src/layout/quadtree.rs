//! Point quadtree rebuilt from scratch every simulation step.
//!
//! Distinct points end up in their own leaves; coincident points share a leaf so none of
//! them is lost. Leaves store indices into the slice the tree was built from.

use super::node::Point;

/// Deeper than this, points that still share a cell are chained into one leaf.
const MAX_DEPTH: usize = 48;

/// Axis-aligned box, `x0 <= x1` and `y0 <= y1`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
	pub x0: f64,
	pub y0: f64,
	pub x1: f64,
	pub y1: f64,
}

impl Bounds {
	/// Square of half-width `half` centered on `center`.
	pub fn around(center: Point, half: f64) -> Self {
		Self {
			x0: center.x - half,
			y0: center.y - half,
			x1: center.x + half,
			y1: center.y + half,
		}
	}

	pub fn intersects(&self, other: &Bounds) -> bool {
		!(self.x0 > other.x1 || self.x1 < other.x0 || self.y0 > other.y1 || self.y1 < other.y0)
	}

	pub fn contains(&self, p: Point) -> bool {
		p.x >= self.x0 && p.x <= self.x1 && p.y >= self.y0 && p.y <= self.y1
	}

	fn quadrant(&self, p: Point) -> (usize, Bounds) {
		let (xm, ym) = ((self.x0 + self.x1) / 2.0, (self.y0 + self.y1) / 2.0);
		let right = p.x >= xm;
		let bottom = p.y >= ym;
		let b = Bounds {
			x0: if right { xm } else { self.x0 },
			x1: if right { self.x1 } else { xm },
			y0: if bottom { ym } else { self.y0 },
			y1: if bottom { self.y1 } else { ym },
		};
		((bottom as usize) << 1 | right as usize, b)
	}
}

#[derive(Debug)]
enum Quad {
	Branch([Option<usize>; 4]),
	Leaf(Vec<usize>),
}

/// Spatial index over a fixed set of points.
#[derive(Debug)]
pub struct QuadTree {
	quads: Vec<Quad>,
	root: Option<usize>,
	extent: Bounds,
	points: Vec<Point>,
}

impl QuadTree {
	/// Builds a tree over `points`. Non-finite points are left out of the index.
	pub fn build(points: impl IntoIterator<Item = Point>) -> Self {
		let points: Vec<Point> = points.into_iter().collect();
		let mut tree = Self {
			quads: Vec::with_capacity(points.len() * 2),
			root: None,
			extent: Self::square_extent(&points),
			points,
		};
		for i in 0..tree.points.len() {
			let p = tree.points[i];
			if p.x.is_finite() && p.y.is_finite() {
				tree.insert(i);
			}
		}
		tree
	}

	fn square_extent(points: &[Point]) -> Bounds {
		let finite = points.iter().filter(|p| p.x.is_finite() && p.y.is_finite());
		let (mut x0, mut y0) = (f64::INFINITY, f64::INFINITY);
		let (mut x1, mut y1) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
		for p in finite {
			x0 = x0.min(p.x);
			y0 = y0.min(p.y);
			x1 = x1.max(p.x);
			y1 = y1.max(p.y);
		}
		if x0 > x1 {
			return Bounds { x0: 0.0, y0: 0.0, x1: 1.0, y1: 1.0 };
		}
		let size = (x1 - x0).max(y1 - y0).max(1.0);
		Bounds {
			x0,
			y0,
			x1: x0 + size,
			y1: y0 + size,
		}
	}

	fn push(&mut self, quad: Quad) -> usize {
		self.quads.push(quad);
		self.quads.len() - 1
	}

	fn insert(&mut self, index: usize) {
		let p = self.points[index];
		let Some(mut q) = self.root else {
			self.root = Some(self.push(Quad::Leaf(vec![index])));
			return;
		};
		let mut bounds = self.extent;
		let mut depth = 0;

		loop {
			match &mut self.quads[q] {
				Quad::Branch(children) => {
					let (slot, child_bounds) = bounds.quadrant(p);
					if let Some(child) = children[slot] {
						q = child;
						bounds = child_bounds;
						depth += 1;
						continue;
					}
					let leaf = self.push(Quad::Leaf(vec![index]));
					if let Quad::Branch(children) = &mut self.quads[q] {
						children[slot] = Some(leaf);
					}
					return;
				}
				Quad::Leaf(items) => {
					let other = self.points[items[0]];
					if other == p || depth >= MAX_DEPTH {
						items.push(index);
						return;
					}
					// Push the occupant one level down and retry from the new branch.
					let occupants = std::mem::take(items);
					let (slot, _) = bounds.quadrant(other);
					let moved = self.push(Quad::Leaf(occupants));
					let mut children = [None; 4];
					children[slot] = Some(moved);
					self.quads[q] = Quad::Branch(children);
				}
			}
		}
	}

	pub fn is_empty(&self) -> bool {
		self.root.is_none()
	}

	/// Position the tree was built with for `index`.
	pub fn point(&self, index: usize) -> Point {
		self.points[index]
	}

	/// Pre-order traversal. `visitor` receives each quad's bounds and, for leaves, the indices
	/// stored there (empty for branches). Returning `true` skips that quad's children.
	pub fn visit(&self, mut visitor: impl FnMut(&Bounds, &[usize]) -> bool) {
		let Some(root) = self.root else {
			return;
		};
		let mut stack = vec![(root, self.extent)];
		while let Some((q, bounds)) = stack.pop() {
			match &self.quads[q] {
				Quad::Leaf(items) => {
					visitor(&bounds, items);
				}
				Quad::Branch(children) => {
					if visitor(&bounds, &[]) {
						continue;
					}
					let (xm, ym) = ((bounds.x0 + bounds.x1) / 2.0, (bounds.y0 + bounds.y1) / 2.0);
					for slot in (0..4).rev() {
						let Some(child) = children[slot] else {
							continue;
						};
						let right = slot & 1 == 1;
						let bottom = slot & 2 == 2;
						let b = Bounds {
							x0: if right { xm } else { bounds.x0 },
							x1: if right { bounds.x1 } else { xm },
							y0: if bottom { ym } else { bounds.y0 },
							y1: if bottom { bounds.y1 } else { ym },
						};
						stack.push((child, b));
					}
				}
			}
		}
	}

	/// Calls `f` with every indexed point that lies inside `region`.
	pub fn query(&self, region: &Bounds, mut f: impl FnMut(usize)) {
		self.visit(|bounds, items| {
			for &i in items {
				if region.contains(self.points[i]) {
					f(i);
				}
			}
			!bounds.intersects(region)
		});
	}
}
