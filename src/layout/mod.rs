//! Bubble layout engine: nodes, a spatial index, the forces and the stepping loop.

mod center;
mod cluster;
mod collide;
mod node;
pub mod quadtree;
pub mod scale;
mod simulation;

pub use center::{Axis, Membership, PositionForce, Target};
pub use cluster::{CentroidAlias, Centroids, ClusterForce};
pub use collide::CollideForce;
pub use node::{Node, Point, normalize_angle, weighted_centroid};
pub use simulation::{ForceSlot, LayoutSimulation, SimState};

/// A force mutates node velocities (or, for collision, positions) once per simulation step.
pub trait Force {
	/// Called when the force is installed and whenever node radii change.
	fn set_nodes(&mut self, _nodes: &[Node]) {}

	fn apply(&mut self, nodes: &mut [Node], alpha: f64);
}
