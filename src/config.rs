//! Tunables for one chart instance. Everything here is plain data with a `Default`.

use crate::layout::{CentroidAlias, ClusterForce, CollideForce, Point, PositionForce};
use crate::scroll::StepRule;

#[derive(Clone, Debug)]
pub struct SimulationConfig {
	pub alpha_min: f64,
	pub alpha_decay: f64,
	pub alpha_target: f64,
	pub velocity_decay: f64,
	pub center_strength: f64,
	pub cluster_strength: f64,
	pub collide_rigidity: f64,
	pub padding_same: f64,
	pub padding_cross: f64,
	/// Cross-category padding while large and small bubbles ghost through each other.
	pub ghost_padding_cross: f64,
	/// Weight separating "large" from "small" for ghosting and size highlights.
	pub size_threshold: f64,
	pub aliases: Vec<CentroidAlias>,
}

impl Default for SimulationConfig {
	fn default() -> Self {
		let alpha_min = 0.001;
		Self {
			alpha_min,
			alpha_decay: 1.0 - f64::powf(alpha_min, 1.0 / 300.0),
			alpha_target: 0.0,
			velocity_decay: 0.4,
			center_strength: 0.02,
			cluster_strength: 0.08,
			collide_rigidity: 0.4,
			padding_same: 1.0,
			padding_cross: 17.0,
			ghost_padding_cross: 12.0,
			size_threshold: 1000.0,
			aliases: vec![CentroidAlias {
				category: "Hotels & Accommodation".into(),
				anchor: "Aerospace".into(),
				offset: Point::new(-80.0, 80.0),
			}],
		}
	}
}

impl SimulationConfig {
	pub fn center_force(&self, force: PositionForce) -> PositionForce {
		force.strength(self.center_strength)
	}

	pub fn cluster_force(&self) -> ClusterForce {
		ClusterForce::new()
			.strength(self.cluster_strength)
			.aliases(self.aliases.clone())
	}

	pub fn collide_force(&self) -> CollideForce {
		CollideForce::new()
			.rigidity(self.collide_rigidity)
			.padding(self.padding_same, self.padding_cross)
			.ghost_padding(self.ghost_padding_cross)
	}
}

#[derive(Clone, Debug)]
pub struct ChartConfig {
	pub simulation: SimulationConfig,
	/// Bubble radius range at `reference_width`.
	pub min_radius: f64,
	pub max_radius: f64,
	pub reference_width: f64,
	/// Below this width the whole layout is scaled down instead of reflowed.
	pub min_width: f64,
	/// Distance of the isolation anchor from the field origin, at `reference_width`.
	pub separation_offset: f64,
	/// Radius of the ring the categories are seeded on, at `reference_width`.
	pub seed_radius: f64,
	pub transition_alpha: f64,
	pub resize_alpha: f64,
	pub rotation_duration_ms: f64,
	/// Added to the rotation duration when the turn is wider than 3π/4.
	pub rotation_extra_ms: f64,
	pub narrative: Vec<StepRule>,
}

impl Default for ChartConfig {
	fn default() -> Self {
		Self {
			simulation: SimulationConfig::default(),
			min_radius: 3.0,
			max_radius: 24.0,
			reference_width: 600.0,
			min_width: 320.0,
			separation_offset: 110.0,
			seed_radius: 150.0,
			transition_alpha: 0.6,
			resize_alpha: 0.3,
			rotation_duration_ms: 1200.0,
			rotation_extra_ms: 500.0,
			narrative: crate::scroll::default_narrative(),
		}
	}
}
