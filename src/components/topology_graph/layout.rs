//! Initial node placement.
//!
//! Layout is a strategy object so the random scatter default can be swapped
//! for a deterministic or force-relaxed placement without touching the rest
//! of the engine. Strategies run once per rebuild; nothing is incremental.

use std::collections::HashMap;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};
use rand::Rng;
use rand::rngs::ThreadRng;
use serde::Deserialize;

use super::model::{GraphModel, NodeKind, Point};

/// Places non-root nodes in model space at build time.
pub trait LayoutStrategy {
	/// Position for one non-root node. `node_count` is the number of
	/// non-root nodes in the graph being built.
	fn place(&mut self, node_count: usize, kind: NodeKind) -> Point;

	/// Optional second pass over the fully built model.
	fn settle(&mut self, _model: &mut GraphModel) {}
}

/// Which built-in strategy a session uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutKind {
	/// Uniform random scatter inside kind-dependent bands.
	#[default]
	Scatter,
	/// Scatter followed by a fixed number of spring/repulsion steps.
	Relaxed,
}

/// Layout tuning.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
	pub strategy: LayoutKind,
	/// Half-width of the square members are scattered in (model units).
	pub member_radius: f64,
	/// Half-width of the square peers are scattered in (model units).
	pub peer_radius: f64,
	/// Simulation steps for [`LayoutKind::Relaxed`].
	pub relax_iterations: usize,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			strategy: LayoutKind::Scatter,
			member_radius: 200.0,
			peer_radius: 300.0,
			relax_iterations: 120,
		}
	}
}

impl LayoutConfig {
	/// Instantiates the configured strategy.
	pub fn strategy(&self) -> Box<dyn LayoutStrategy> {
		let scatter = RandomScatter::new(self.member_radius, self.peer_radius);
		match self.strategy {
			LayoutKind::Scatter => Box::new(scatter),
			LayoutKind::Relaxed => Box::new(ForceRelaxation::new(scatter, self.relax_iterations)),
		}
	}
}

/// Samples each coordinate uniformly in `[-radius, radius]`, with a tighter
/// radius for members than for peers.
pub struct RandomScatter<R = ThreadRng> {
	rng: R,
	member_radius: f64,
	peer_radius: f64,
}

impl RandomScatter {
	pub fn new(member_radius: f64, peer_radius: f64) -> Self {
		Self::with_rng(rand::thread_rng(), member_radius, peer_radius)
	}
}

impl<R: Rng> RandomScatter<R> {
	/// Uses a caller-supplied generator, e.g. a seeded one in tests.
	pub fn with_rng(rng: R, member_radius: f64, peer_radius: f64) -> Self {
		Self {
			rng,
			member_radius,
			peer_radius,
		}
	}

	/// Non-finite results collapse to 0.
	fn sample(&mut self, radius: f64) -> f64 {
		if !(radius.is_finite() && radius > 0.0) {
			return 0.0;
		}
		let v = self.rng.gen_range(-1.0..=1.0) * radius;
		if v.is_finite() { v } else { 0.0 }
	}
}

impl<R: Rng> LayoutStrategy for RandomScatter<R> {
	fn place(&mut self, _node_count: usize, kind: NodeKind) -> Point {
		let radius = if kind.is_member() {
			self.member_radius
		} else if kind.is_peer() {
			self.peer_radius
		} else {
			return Point::ORIGIN;
		};
		Point::new(self.sample(radius), self.sample(radius))
	}
}

/// Seeds positions with a scatter, then relaxes them with the `force_graph`
/// spring/repulsion simulation. The root is anchored at the origin.
pub struct ForceRelaxation<R = ThreadRng> {
	seed: RandomScatter<R>,
	iterations: usize,
}

impl<R: Rng> ForceRelaxation<R> {
	pub fn new(seed: RandomScatter<R>, iterations: usize) -> Self {
		Self { seed, iterations }
	}
}

/// Fixed simulation step, one 60 Hz frame.
const RELAX_STEP: f32 = 0.016;

impl<R: Rng> LayoutStrategy for ForceRelaxation<R> {
	fn place(&mut self, node_count: usize, kind: NodeKind) -> Point {
		self.seed.place(node_count, kind)
	}

	fn settle(&mut self, model: &mut GraphModel) {
		let mut graph: ForceGraph<usize, ()> = ForceGraph::new(SimulationParameters {
			force_charge: 150.0,
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
		});

		{
			let mut id_to_idx: HashMap<&str, DefaultNodeIdx> = HashMap::new();
			for (i, node) in model.nodes().iter().enumerate() {
				let idx = graph.add_node(NodeData {
					x: node.position.x as f32,
					y: node.position.y as f32,
					mass: 10.0,
					is_anchor: node.kind == NodeKind::NetworkGroup,
					user_data: i,
				});
				id_to_idx.insert(node.id.as_str(), idx);
			}
			for conn in model.connections() {
				if let (Some(&src), Some(&tgt)) = (
					id_to_idx.get(conn.from.as_str()),
					id_to_idx.get(conn.to.as_str()),
				) {
					graph.add_edge(src, tgt, EdgeData::default());
				}
			}
		}

		for _ in 0..self.iterations {
			graph.update(RELAX_STEP);
		}

		let nodes = model.nodes_mut();
		graph.visit_nodes(|node| {
			let Some(target) = nodes.get_mut(node.data.user_data) else {
				return;
			};
			if target.kind == NodeKind::NetworkGroup {
				return;
			}
			let p = Point::new(node.x() as f64, node.y() as f64);
			target.position = if p.is_finite() { p } else { Point::ORIGIN };
		});
	}
}
