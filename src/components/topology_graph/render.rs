//! Canvas rendering for the topology graph.
//!
//! Drawing is a direct projection of the session state. [`frame`] derives
//! the sprites to draw (positions, radii, colors, z-order) without touching
//! the canvas; [`render`] paints them. Passes:
//! 1. Background (screen space)
//! 2. Edges, then nodes in z-order (model space, under the view transform)
//! 3. Error banner (screen space)

use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::model::{ConnectionKind, Point};
use super::scale::ScaledValues;
use super::state::TopologyState;
use super::theme::{Color, Theme};

/// One node, ready to draw in model space.
#[derive(Clone, Debug)]
pub struct NodeSprite {
	pub id: String,
	pub center: Point,
	pub radius: f64,
	pub fill: Color,
	pub outline: Color,
	pub selected: bool,
	pub title: String,
	pub subtitle: Option<String>,
}

/// One edge, ready to draw in model space.
#[derive(Clone, Debug)]
pub struct EdgeSprite {
	pub from: Point,
	pub to: Point,
	/// Trim at each end so the stroke stops at the node outlines.
	pub from_radius: f64,
	pub to_radius: f64,
	pub color: Color,
	pub dashed: bool,
}

/// Everything drawn in one pass.
#[derive(Clone, Debug)]
pub struct Frame {
	pub scale: ScaledValues,
	pub edges: Vec<EdgeSprite>,
	/// Bottom first.
	pub nodes: Vec<NodeSprite>,
}

/// Derives the sprites for the current state, or `None` before the first build.
pub fn frame(state: &TopologyState, theme: &Theme) -> Option<Frame> {
	let model = state.model()?;
	let scale = ScaledValues::new(state.scale_config(), state.viewport().scale());
	let selected = state.selected();

	let nodes: Vec<NodeSprite> = model
		.z_order(selected)
		.into_iter()
		.map(|node| NodeSprite {
			id: node.id.clone(),
			center: state.display_position(&node.id).unwrap_or(node.position),
			radius: scale.node_radius(node.kind),
			fill: theme.status_color(&node.status),
			outline: theme.kind_color(node.kind),
			selected: selected == Some(node.id.as_str()),
			title: node.title.clone(),
			subtitle: node.subtitle.clone(),
		})
		.collect();

	let edges = model
		.connections()
		.iter()
		.filter_map(|conn| {
			let from = model.node(&conn.from)?;
			let to = model.node(&conn.to)?;
			Some(EdgeSprite {
				from: state.display_position(&from.id)?,
				to: state.display_position(&to.id)?,
				from_radius: scale.node_radius(from.kind),
				to_radius: scale.node_radius(to.kind),
				color: theme.edge_color(conn.kind),
				dashed: conn.kind == ConnectionKind::Peering,
			})
		})
		.collect();

	Some(Frame {
		scale,
		edges,
		nodes,
	})
}

/// Renders the complete graph to the canvas.
pub fn render(state: &TopologyState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	ctx.set_fill_style_str(&theme.background.to_css());
	ctx.fill_rect(0.0, 0.0, state.width, state.height);

	if let Some(frame) = frame(state, theme) {
		let origin = state.center() + state.viewport().pan_offset();
		let k = state.viewport().scale();

		ctx.save();
		let _ = ctx.translate(origin.x, origin.y);
		let _ = ctx.scale(k, k);

		for edge in &frame.edges {
			draw_edge(ctx, &frame.scale, edge);
		}
		let _ = ctx.set_line_dash(&js_sys::Array::new());
		for node in &frame.nodes {
			draw_node(ctx, &frame.scale, theme, node);
		}

		ctx.restore();
	}

	if let Some(err) = state.last_error() {
		ctx.set_fill_style_str(&theme.tones.negative.to_css());
		ctx.set_font("13px sans-serif");
		let _ = ctx.fill_text(&format!("Topology unavailable: {err}"), 16.0, 24.0);
	}
}

fn draw_edge(ctx: &CanvasRenderingContext2d, scale: &ScaledValues, edge: &EdgeSprite) {
	let d = edge.to - edge.from;
	let dist = d.length();
	if dist <= edge.from_radius + edge.to_radius {
		return;
	}
	let u = d / dist;
	let start = edge.from + u * edge.from_radius;
	let end = edge.to - u * edge.to_radius;

	ctx.set_stroke_style_str(&edge.color.to_css());
	ctx.set_line_width(scale.edge_width);
	if edge.dashed {
		let _ = ctx.set_line_dash(&js_sys::Array::of2(
			&JsValue::from_f64(scale.dash_pattern.0),
			&JsValue::from_f64(scale.dash_pattern.1),
		));
	} else {
		let _ = ctx.set_line_dash(&js_sys::Array::new());
	}

	ctx.begin_path();
	ctx.move_to(start.x, start.y);
	ctx.line_to(end.x, end.y);
	ctx.stroke();
}

fn draw_node(ctx: &CanvasRenderingContext2d, scale: &ScaledValues, theme: &Theme, node: &NodeSprite) {
	let Point { x, y } = node.center;

	ctx.begin_path();
	let _ = ctx.arc(x, y, node.radius, 0.0, 2.0 * PI);
	ctx.set_fill_style_str(&node.fill.to_css());
	ctx.fill();
	ctx.set_stroke_style_str(&node.outline.to_css());
	ctx.set_line_width(scale.edge_width * 1.5);
	ctx.stroke();

	if node.selected {
		ctx.begin_path();
		let _ = ctx.arc(x, y, node.radius + scale.ring_width * 1.5, 0.0, 2.0 * PI);
		ctx.set_stroke_style_str(&theme.selection_ring.to_css());
		ctx.set_line_width(scale.ring_width);
		ctx.stroke();
	}

	ctx.set_text_align("center");
	ctx.set_fill_style_str(&theme.label.to_css());
	ctx.set_font(&scale.label_font);
	let baseline = y + node.radius + 16.0 / scale.k;
	let _ = ctx.fill_text(&node.title, x, baseline);

	if let Some(subtitle) = &node.subtitle {
		ctx.set_fill_style_str(&theme.sublabel.to_css());
		ctx.set_font(&scale.sublabel_font);
		let _ = ctx.fill_text(subtitle, x, baseline + 14.0 / scale.k);
	}
}
