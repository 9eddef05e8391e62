use std::collections::BTreeSet;

use log::{debug, info};

use crate::config::ChartConfig;
use crate::data::{CategoryTable, CompanyRecord, build_nodes, weight_domain};
use crate::layout::scale::SqrtScale;
use crate::layout::{Axis, CentroidAlias, LayoutSimulation, Node, Point, PositionForce};
use crate::scroll::{
	Facing, HighlightClass, RotationAnimator, RotationHandle, ScrollCoordinator, ScrollStep,
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
	pub width: f64,
	pub height: f64,
}

impl Viewport {
	pub fn new(width: f64, height: f64) -> Self {
		Self {
			width: width.max(1.0),
			height: height.max(1.0),
		}
	}

	/// Layout scale relative to the reference width. Never grows past 1.
	pub fn scale_factor(&self, config: &ChartConfig) -> f64 {
		(self.width.min(self.height) / config.reference_width).min(1.0)
	}

	/// True when the viewport is narrower than the layout was designed for.
	pub fn is_shrunk(&self, config: &ChartConfig) -> bool {
		self.width < config.min_width
	}

	pub fn facing(&self) -> Facing {
		Facing::for_viewport(self.width, self.height)
	}

	fn center(&self) -> Point {
		Point::new(self.width / 2.0, self.height / 2.0)
	}
}

/// A category name pinned to a screen position.
#[derive(Clone, Debug, PartialEq)]
pub struct Label {
	pub text: String,
	pub at: Point,
}

/// What the hover outline needs to draw.
#[derive(Clone, Debug, PartialEq)]
pub struct HoverDetails<'a> {
	pub employer: &'a str,
	pub industry: &'a str,
	pub size_text: &'a str,
	pub at: Point,
	pub radius: f64,
}

/// One bubble chart: its simulation, scroll coordinator, rotation and display state.
///
/// Instances share nothing, so several charts can live on one page.
pub struct ChartInstance {
	config: ChartConfig,
	records: Vec<CompanyRecord>,
	table: CategoryTable,
	domain: (f64, f64),
	viewport: Viewport,
	scale_factor: f64,
	sim: LayoutSimulation,
	coordinator: ScrollCoordinator,
	rotation: RotationAnimator,
	highlight: Vec<HighlightClass>,
	labels: Vec<Label>,
	hover: Option<usize>,
}

impl ChartInstance {
	pub fn new(records: Vec<CompanyRecord>, viewport: Viewport, config: ChartConfig) -> Self {
		let table = CategoryTable::from_records(&records);
		let domain = weight_domain(&records).unwrap_or((1.0, 1.0));
		let scale_factor = viewport.scale_factor(&config);

		let sim_config = &config.simulation;
		let mut sim = LayoutSimulation::new(sim_config);
		sim.set_center(Axis::X, Some(sim_config.center_force(PositionForce::x())))
			.set_center(Axis::Y, Some(sim_config.center_force(PositionForce::y())))
			.set_cluster(Some(
				sim_config
					.cluster_force()
					.aliases(scaled_aliases(&config, scale_factor)),
			))
			.set_collide(Some(sim_config.collide_force()));
		let scale = radius_scale(&config, domain, scale_factor);
		sim.initialize(build_nodes(
			&records,
			&table,
			&scale,
			config.seed_radius * scale_factor,
		));

		let coordinator = ScrollCoordinator::new(
			config.narrative.clone(),
			viewport.facing(),
			config.separation_offset * scale_factor,
			config.transition_alpha,
			sim_config.size_threshold,
		);
		let rotation = RotationAnimator::new(config.rotation_duration_ms, config.rotation_extra_ms);
		info!(
			"bubble chart ready: {} companies in {} categories",
			records.len(),
			table.len()
		);

		Self {
			config,
			records,
			table,
			domain,
			viewport,
			scale_factor,
			sim,
			coordinator,
			rotation,
			highlight: Vec::new(),
			labels: Vec::new(),
			hover: None,
		}
	}

	/// Advances every clock by `dt_ms`. Returns whether anything on screen moved.
	pub fn frame(&mut self, dt_ms: f64) -> bool {
		let restored = self
			.sim
			.collide_mut()
			.is_some_and(|c| c.advance_clock(dt_ms));
		if restored {
			self.sim.restart_if_higher_alpha(self.config.resize_alpha);
		}
		let rotating = self.rotation.is_animating();
		self.rotation.advance(dt_ms);
		let stepped = self.sim.tick();
		rotating || stepped
	}

	/// Applies a step event. The returned handle, if any, resolves when the field stops
	/// turning; labels should be revealed then.
	pub fn on_step(&mut self, step: ScrollStep) -> Option<RotationHandle> {
		let transition = self
			.coordinator
			.on_step(step, &mut self.sim, &mut self.rotation)?;
		self.highlight = transition.highlight;
		if transition.rotation.is_some() {
			self.labels.clear();
		}
		transition.rotation
	}

	/// Resizes the chart. Returns a rotation handle if the subset has to turn to a new side.
	pub fn resize(&mut self, viewport: Viewport) -> Option<RotationHandle> {
		if viewport == self.viewport {
			return None;
		}
		self.viewport = viewport;
		let factor = viewport.scale_factor(&self.config);
		if factor != self.scale_factor {
			debug!("layout scale {:.3} -> {factor:.3}", self.scale_factor);
			self.scale_factor = factor;
			let scale = radius_scale(&self.config, self.domain, factor);
			self.sim.set_radii(|n| scale.apply(n.weight()));
			if let Some(cluster) = self.sim.cluster_mut() {
				cluster.set_aliases(scaled_aliases(&self.config, factor));
			}
			self.coordinator
				.set_separation_offset(self.config.separation_offset * factor);
			self.coordinator.refresh(&mut self.sim, &self.rotation);
		}
		let handle = self
			.coordinator
			.reorient(viewport.facing(), &mut self.sim, &mut self.rotation);
		self.labels.clear();
		self.sim.restart_if_higher_alpha(self.config.resize_alpha);
		// A rotation still in flight places the labels once it settles.
		if handle.is_none() && !self.rotation.is_animating() {
			self.reveal_labels();
		}
		handle
	}

	/// Places a label at each isolated category's centroid, as seen on screen right now.
	pub fn reveal_labels(&mut self) {
		let Some(isolated) = self.coordinator.state().isolated.clone() else {
			self.labels.clear();
			return;
		};
		let Some(centroids) = self.sim.cluster().map(|c| c.centroids()) else {
			return;
		};
		let labels: Vec<Label> = isolated
			.iter()
			.filter_map(|name| {
				centroids.get(name).map(|c| Label {
					text: name.clone(),
					at: self.to_screen(*c),
				})
			})
			.collect();
		debug!("revealing {} labels", labels.len());
		self.labels = labels;
	}

	pub fn to_screen(&self, p: Point) -> Point {
		let r = p.rotate(self.rotation.angle());
		let c = self.viewport.center();
		Point::new(r.x + c.x, r.y + c.y)
	}

	pub fn to_field(&self, sx: f64, sy: f64) -> Point {
		let c = self.viewport.center();
		Point::new(sx - c.x, sy - c.y).rotate(-self.rotation.angle())
	}

	/// Topmost node under a screen position.
	pub fn node_at(&self, sx: f64, sy: f64) -> Option<usize> {
		let p = self.to_field(sx, sy);
		self.sim
			.nodes()
			.iter()
			.rposition(|n| n.position().distance(p) <= n.radius())
	}

	pub fn set_hover(&mut self, node: Option<usize>) -> bool {
		if self.hover == node {
			return false;
		}
		self.hover = node;
		true
	}

	pub fn hover(&self) -> Option<HoverDetails<'_>> {
		let i = self.hover?;
		let node = self.sim.nodes().get(i)?;
		let record = self.records.get(i)?;
		Some(HoverDetails {
			employer: &record.employer,
			industry: &record.industry,
			size_text: &record.size_text,
			at: self.to_screen(node.position()),
			radius: node.radius(),
		})
	}

	/// Whether any highlight class is active.
	pub fn has_highlight(&self) -> bool {
		!self.highlight.is_empty()
	}

	pub fn is_highlighted(&self, node: &Node) -> bool {
		let threshold = self.config.simulation.size_threshold;
		self.highlight.iter().any(|h| h.matches(node, threshold))
	}

	/// Categories currently pulled aside, if any.
	pub fn isolated(&self) -> Option<&BTreeSet<String>> {
		self.coordinator.state().isolated.as_ref()
	}

	pub fn nodes(&self) -> &[Node] {
		self.sim.nodes()
	}

	pub fn color(&self, category: &str) -> String {
		self.table.color(category)
	}

	pub fn labels(&self) -> &[Label] {
		&self.labels
	}

	/// Field rotation on screen, in radians.
	pub fn rotation(&self) -> f64 {
		self.rotation.angle()
	}

	pub fn viewport(&self) -> Viewport {
		self.viewport
	}

	pub fn is_shrunk(&self) -> bool {
		self.viewport.is_shrunk(&self.config)
	}

	pub fn is_settled(&self) -> bool {
		!self.sim.is_running() && !self.rotation.is_animating()
	}
}

/// Alias offsets are in pixels at the reference width, like every other layout distance.
fn scaled_aliases(config: &ChartConfig, factor: f64) -> Vec<CentroidAlias> {
	config
		.simulation
		.aliases
		.iter()
		.map(|a| CentroidAlias {
			offset: a.offset.scale(factor),
			..a.clone()
		})
		.collect()
}

fn radius_scale(config: &ChartConfig, domain: (f64, f64), factor: f64) -> SqrtScale {
	SqrtScale::new(
		domain,
		(config.min_radius * factor, config.max_radius * factor),
	)
}

#[cfg(test)]
mod tests {
	use futures::executor::block_on;

	use super::*;
	use crate::scroll::{Direction, RotationOutcome};

	fn records() -> Vec<CompanyRecord> {
		let rows = [
			("Acme Cloud", "Internet & Software", "5,000+ employees"),
			("Bitwise", "Internet & Software", "200 employees"),
			("Codehaus", "Internet & Software", "51-200 employees"),
			("Datadeck", "Internet & Software", "1,200+ employees"),
			("Shopright", "Retail", "10,000+ employees"),
			("Cornerstore", "Retail", "80 employees"),
			("Mallway", "Retail", "unknown"),
			("Ledger & Co", "Finance", "3,000 employees"),
			("Penny Bank", "Finance", "150 employees"),
			("Vault", "Finance", "40 employees"),
		];
		rows.iter()
			.map(|(e, i, s)| CompanyRecord {
				employer: e.to_string(),
				industry: i.to_string(),
				size_text: s.to_string(),
			})
			.collect()
	}

	fn chart() -> ChartInstance {
		ChartInstance::new(records(), Viewport::new(800.0, 600.0), ChartConfig::default())
	}

	fn run(chart: &mut ChartInstance, frames: usize) {
		for _ in 0..frames {
			chart.frame(16.0);
		}
	}

	fn step(index: usize) -> ScrollStep {
		ScrollStep {
			index,
			direction: Direction::Down,
		}
	}

	#[test]
	fn one_node_per_record() {
		let chart = chart();
		assert_eq!(chart.nodes().len(), 10);
		assert_eq!(chart.nodes()[0].id, "Acme Cloud");
		assert!(!chart.is_settled());
	}

	#[test]
	fn settles_when_left_alone() {
		let mut chart = chart();
		run(&mut chart, 400);
		assert!(chart.is_settled());
		assert!(!chart.frame(16.0));
	}

	#[test]
	fn isolation_reveals_labels_after_rotation() {
		let mut chart = chart();
		run(&mut chart, 100);
		let handle = chart.on_step(step(1)).expect("isolation rotates the field");
		assert!(chart.labels().is_empty());
		assert!(chart.has_highlight());
		run(&mut chart, 200);
		assert_eq!(block_on(handle), RotationOutcome::Settled);

		chart.reveal_labels();
		let texts: Vec<&str> = chart.labels().iter().map(|l| l.text.as_str()).collect();
		assert_eq!(texts, vec!["Internet & Software"]);
	}

	#[test]
	fn highlight_follows_step() {
		let mut chart = chart();
		let _ = chart.on_step(step(3));
		let big: Vec<&str> = chart
			.nodes()
			.iter()
			.filter(|n| chart.is_highlighted(n))
			.map(|n| n.id.as_str())
			.collect();
		assert_eq!(big, vec!["Acme Cloud", "Datadeck", "Shopright", "Ledger & Co"]);
	}

	#[test]
	fn hit_test_undoes_rotation() {
		let mut chart = chart();
		let _ = chart.on_step(step(1));
		run(&mut chart, 500);
		assert!(chart.rotation() != 0.0);

		let target = chart.nodes()[4].position();
		let screen = chart.to_screen(target);
		assert_eq!(chart.node_at(screen.x, screen.y), Some(4));
		assert_eq!(chart.node_at(-1000.0, -1000.0), None);

		assert!(chart.set_hover(Some(4)));
		assert!(!chart.set_hover(Some(4)));
		let details = chart.hover().unwrap();
		assert_eq!(details.employer, "Shopright");
		assert!(details.at.distance(screen) < 1e-9);
	}

	#[test]
	fn narrow_viewport_shrinks_bubbles() {
		let mut chart = chart();
		let before: f64 = chart.nodes().iter().map(Node::radius).sum();
		assert!(chart.resize(Viewport::new(300.0, 600.0)).is_none());
		let after: f64 = chart.nodes().iter().map(Node::radius).sum();
		assert!(after < before);
		assert!(chart.is_shrunk());
	}

	#[test]
	fn resize_mid_rotation_leaves_labels_to_the_rotation() {
		let mut chart = chart();
		let handle = chart.on_step(step(1)).unwrap();
		chart.frame(16.0);
		assert!(chart.resize(Viewport::new(900.0, 600.0)).is_none());
		assert!(chart.labels().is_empty());

		run(&mut chart, 200);
		assert_eq!(block_on(handle), RotationOutcome::Settled);
		chart.reveal_labels();
		assert_eq!(chart.labels().len(), 1);
	}

	#[test]
	fn deferred_ghost_restore_wakes_the_simulation() {
		let mut chart = chart();
		let _ = chart.on_step(step(4));
		assert!(chart.sim.collide().unwrap().is_ghosting());

		let mut went_idle = false;
		let mut frames = 0;
		while chart.sim.collide().unwrap().is_ghosting() {
			chart.frame(1.0);
			went_idle |= !chart.sim.is_running();
			frames += 1;
			assert!(frames <= 2000);
		}
		assert!(went_idle);
		assert!(frames >= 1800);
		assert!(!chart.sim.collide().unwrap().has_pending_restore());
		assert!(chart.sim.is_running());
	}

	#[test]
	fn alias_offsets_follow_layout_scale() {
		let offset = |chart: &ChartInstance| chart.sim.cluster().unwrap().alias_table()[0].offset;
		let small = ChartInstance::new(records(), Viewport::new(300.0, 600.0), ChartConfig::default());
		assert_eq!(offset(&small), Point::new(-40.0, 40.0));

		let mut chart = chart();
		assert_eq!(offset(&chart), Point::new(-80.0, 80.0));
		let _ = chart.resize(Viewport::new(300.0, 600.0));
		assert_eq!(offset(&chart), Point::new(-40.0, 40.0));
	}

	#[test]
	fn instances_are_independent() {
		let mut a = chart();
		let b = chart();
		let _ = a.on_step(step(1));
		assert!(a.isolated().is_some());
		assert!(b.isolated().is_none());
		assert_eq!(b.rotation(), 0.0);
	}
}
