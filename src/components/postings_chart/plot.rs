//! Screen geometry for the postings charts, kept apart from the canvas calls.

use crate::data::PostingPoint;
use crate::layout::Point;
use crate::layout::scale::{LinearScale, extent};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Margins {
	pub top: f64,
	pub right: f64,
	pub bottom: f64,
	pub left: f64,
}

impl Default for Margins {
	fn default() -> Self {
		Self {
			top: 20.0,
			right: 20.0,
			bottom: 30.0,
			left: 40.0,
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct LinePlot {
	pub total: Vec<Point>,
	pub remote: Vec<Point>,
	/// Largest daily count, the top of the y axis.
	pub y_max: f64,
	pub baseline: f64,
}

/// Daily totals and remote counts as two polylines. `None` without any points.
pub fn line_plot(points: &[PostingPoint], width: f64, height: f64, m: Margins) -> Option<LinePlot> {
	let first = points.first()?.date;
	let day = |p: &PostingPoint| (p.date - first).num_days() as f64;
	let x = LinearScale::new(extent(points.iter().map(day))?, (m.left, width - m.right));
	let y_max = extent(points.iter().map(|p| f64::from(p.count)))?.1.max(1.0);
	let y = LinearScale::new((0.0, y_max), (height - m.bottom, m.top));

	let total = points
		.iter()
		.map(|p| Point::new(x.apply(day(p)), y.apply(f64::from(p.count))))
		.collect();
	let remote = points
		.iter()
		.map(|p| Point::new(x.apply(day(p)), y.apply(f64::from(p.remote_count))))
		.collect();
	Some(LinePlot {
		total,
		remote,
		y_max,
		baseline: height - m.bottom,
	})
}

#[derive(Clone, Debug, PartialEq)]
pub struct Bar {
	pub label: String,
	pub change: f64,
	/// Left and right edges; a negative change extends left of the zero line.
	pub x0: f64,
	pub x1: f64,
	pub y: f64,
	pub height: f64,
}

/// One horizontal bar per industry, in the order given. The zero line is always in view.
pub fn bar_plot(changes: &[(&str, f64)], width: f64, height: f64, m: Margins) -> Vec<Bar> {
	let Some((lo, hi)) = extent(changes.iter().map(|(_, v)| *v)) else {
		return Vec::new();
	};
	let x = LinearScale::new((lo.min(0.0), hi.max(0.0)), (m.left, width - m.right));
	let zero = x.apply(0.0);
	let band = (height - m.top - m.bottom) / changes.len() as f64;

	changes
		.iter()
		.enumerate()
		.map(|(i, (label, change))| {
			let end = x.apply(*change);
			Bar {
				label: label.to_string(),
				change: *change,
				x0: zero.min(end),
				x1: zero.max(end),
				y: m.top + band * i as f64 + band * 0.1,
				height: band * 0.8,
			}
		})
		.collect()
}
