//! Bubble nodes and the bit of planar geometry the forces share.

use std::f64::consts::PI;

/// A point in simulation space. The origin is the center of the field.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

	pub fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	/// Rotates the point counterclockwise about the origin by `theta` radians.
	pub fn rotate(self, theta: f64) -> Self {
		let (sin, cos) = theta.sin_cos();
		Self {
			x: self.x * cos - self.y * sin,
			y: self.x * sin + self.y * cos,
		}
	}

	/// Polar angle in `(-PI, PI]`. The origin reports 0.
	pub fn angle(self) -> f64 {
		self.y.atan2(self.x)
	}

	pub fn distance(self, other: Point) -> f64 {
		(self.x - other.x).hypot(self.y - other.y)
	}

	pub fn scale(self, k: f64) -> Self {
		Self {
			x: self.x * k,
			y: self.y * k,
		}
	}
}

/// Wraps an angle into `(-PI, PI]`.
pub fn normalize_angle(theta: f64) -> f64 {
	let mut t = theta % (2.0 * PI);
	if t <= -PI {
		t += 2.0 * PI;
	} else if t > PI {
		t -= 2.0 * PI;
	}
	t
}

/// One company bubble.
///
/// Position and velocity are only written by the simulation and its forces; everything
/// outside `crate::layout` reads them through accessors.
#[derive(Clone, Debug)]
pub struct Node {
	pub id: String,
	category: String,
	pub(crate) weight: f64,
	pub(crate) radius: f64,
	pub(crate) x: f64,
	pub(crate) y: f64,
	pub(crate) vx: f64,
	pub(crate) vy: f64,
}

impl Node {
	pub fn new(id: impl Into<String>, category: impl Into<String>, weight: f64, radius: f64) -> Self {
		Self {
			id: id.into(),
			category: category.into(),
			weight,
			radius: radius.max(f64::MIN_POSITIVE),
			x: 0.0,
			y: 0.0,
			vx: 0.0,
			vy: 0.0,
		}
	}

	/// Seeds the initial position. Only meaningful before the node joins a simulation.
	pub fn at(mut self, position: Point) -> Self {
		self.x = position.x;
		self.y = position.y;
		self
	}

	pub fn category(&self) -> &str {
		&self.category
	}

	pub fn weight(&self) -> f64 {
		self.weight
	}

	pub fn radius(&self) -> f64 {
		self.radius
	}

	pub fn position(&self) -> Point {
		Point::new(self.x, self.y)
	}

	pub fn velocity(&self) -> Point {
		Point::new(self.vx, self.vy)
	}
}

/// Weighted mean position of `nodes`, each weighted by `radius²`.
///
/// Returns `None` for an empty set.
pub fn weighted_centroid<'a>(nodes: impl IntoIterator<Item = &'a Node>) -> Option<Point> {
	let (mut x, mut y, mut z) = (0.0, 0.0, 0.0);
	for node in nodes {
		let k = node.radius * node.radius;
		x += node.x * k;
		y += node.y * k;
		z += k;
	}
	(z > 0.0).then(|| Point::new(x / z, y / z))
}
