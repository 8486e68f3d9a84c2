//! Canvas rendering for the graph widget.
//!
//! Drawing is read-only over the widget state. Passes, back to front:
//! 1. Background (screen space)
//! 2. Links, the selected one dashed on top (world space)
//! 3. Nodes with pin markers, then the selection ring and labels

use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::scale::ScaledValues;
use super::state::ForceGraphState;
use super::theme::{Color, Theme};
use super::types::{Edge, LinkMeta, Node, NodeMeta};

/// Renders the complete graph to the canvas.
pub fn render(
	state: &ForceGraphState<NodeMeta, LinkMeta>,
	ctx: &CanvasRenderingContext2d,
	theme: &Theme,
) {
	let view = state.view();
	let scale = ScaledValues::new(state.options(), view.scale());
	let (tx, ty) = view.translation();

	draw_background(state, ctx, theme);

	ctx.save();
	let _ = ctx.translate(tx, ty);
	let _ = ctx.scale(scale.k, scale.k);

	draw_edges(state, ctx, &scale, theme);
	draw_nodes(state, ctx, &scale, theme);

	ctx.restore();
}

fn draw_background(
	state: &ForceGraphState<NodeMeta, LinkMeta>,
	ctx: &CanvasRenderingContext2d,
	theme: &Theme,
) {
	let (width, height) = state.size();
	let gradient = if theme.background.use_gradient {
		ctx.create_radial_gradient(
			width / 2.0,
			height / 2.0,
			0.0,
			width / 2.0,
			height / 2.0,
			width.max(height) * 0.8,
		)
		.ok()
	} else {
		None
	};

	match gradient {
		Some(gradient) => {
			let _ = gradient.add_color_stop(0.0, &theme.background.color_secondary.to_css());
			let _ = gradient.add_color_stop(1.0, &theme.background.color.to_css());
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
		}
		None => ctx.set_fill_style_str(&theme.background.color.to_css()),
	}

	ctx.fill_rect(0.0, 0.0, width, height);
}

fn draw_edges(
	state: &ForceGraphState<NodeMeta, LinkMeta>,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
) {
	let store = state.store();
	let selected = state.selection().link.as_deref();

	ctx.set_stroke_style_str(&theme.edge.color.to_css());
	ctx.set_line_width(scale.link_width);
	let _ = ctx.set_line_dash(&js_sys::Array::new());

	let mut highlighted = None;
	for edge in store.edges() {
		if selected == Some(edge.id.as_str()) {
			highlighted = Some(edge);
			continue;
		}
		stroke_edge(state, ctx, scale, edge);
	}

	// Drawn last so it sits above crossing links.
	if let Some(edge) = highlighted {
		let [dash, gap] = theme.edge.selected_dash;
		ctx.set_stroke_style_str(&theme.edge.selected_color.to_css());
		ctx.set_line_width(scale.link_width * 1.8);
		let _ = ctx.set_line_dash(&js_sys::Array::of2(
			&JsValue::from_f64(dash / scale.k),
			&JsValue::from_f64(gap / scale.k),
		));
		stroke_edge(state, ctx, scale, edge);
		let _ = ctx.set_line_dash(&js_sys::Array::new());
	}
}

fn stroke_edge(
	state: &ForceGraphState<NodeMeta, LinkMeta>,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	edge: &Edge<LinkMeta>,
) {
	let store = state.store();
	let (Some(a), Some(b)) = (store.node(&edge.source), store.node(&edge.target)) else {
		return;
	};
	let (dx, dy) = (b.x - a.x, b.y - a.y);
	let dist = (dx * dx + dy * dy).sqrt();
	if dist < 0.001 {
		return;
	}
	let (ux, uy) = (dx / dist, dy / dist);

	ctx.begin_path();
	ctx.move_to(a.x + ux * scale.node_radius, a.y + uy * scale.node_radius);
	ctx.line_to(b.x - ux * scale.node_radius, b.y - uy * scale.node_radius);
	ctx.stroke();
}

fn draw_nodes(
	state: &ForceGraphState<NodeMeta, LinkMeta>,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
) {
	let selected = state.selection().node.as_deref();
	let dragged = state.dragged_node();

	for (i, node) in state.store().nodes().iter().enumerate() {
		draw_node(ctx, node, node_color(node, i, theme), scale, theme);
	}

	for node in state.store().nodes() {
		let is_selected = selected == Some(node.id.as_str());
		if is_selected || dragged == Some(node.id.as_str()) {
			let alpha = if is_selected { 1.0 } else { 0.45 };
			ctx.begin_path();
			let _ = ctx.arc(
				node.x,
				node.y,
				scale.node_radius + scale.ring_offset,
				0.0,
				2.0 * PI,
			);
			ctx.set_stroke_style_str(&theme.selection.ring_color.with_alpha(alpha).to_css());
			ctx.set_line_width(scale.ring_width);
			ctx.stroke();
		}
	}

	ctx.set_font(&scale.label_font);
	ctx.set_fill_style_str(&theme.node.label_color.to_css());
	for node in state.store().nodes() {
		if let Some(label) = &node.payload.label {
			let _ = ctx.fill_text(label, node.x + scale.node_radius + 4.0 / scale.k, node.y + 3.0 / scale.k);
		}
	}
}

fn draw_node(
	ctx: &CanvasRenderingContext2d,
	node: &Node<NodeMeta>,
	color: Color,
	scale: &ScaledValues,
	theme: &Theme,
) {
	let (x, y) = (node.x, node.y);
	let radius = scale.node_radius;

	let gradient = if theme.node.use_gradient {
		ctx.create_radial_gradient(x - radius * 0.3, y - radius * 0.3, 0.0, x, y, radius)
			.ok()
	} else {
		None
	};

	ctx.begin_path();
	let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
	match gradient {
		Some(gradient) => {
			let _ = gradient.add_color_stop(0.0, &color.lighten(0.4).to_css());
			let _ = gradient.add_color_stop(0.7, &color.to_css());
			let _ = gradient.add_color_stop(1.0, &color.darken(0.2).to_css());
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
		}
		None => ctx.set_fill_style_str(&color.to_css()),
	}
	ctx.fill();

	if theme.node.border_width > 0.0 {
		ctx.set_stroke_style_str(&theme.node.border_color.to_css());
		ctx.set_line_width(theme.node.border_width / scale.k);
		ctx.stroke();
	}

	if node.is_pinned() {
		ctx.begin_path();
		let _ = ctx.arc(x, y, radius * 0.35, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(&theme.selection.pin_color.to_css());
		ctx.fill();
	}
}

/// Explicit color, else a palette entry picked by group, else by position.
fn node_color(node: &Node<NodeMeta>, index: usize, theme: &Theme) -> Color {
	if let Some(color) = node.payload.color.as_deref().and_then(Color::parse) {
		return color;
	}
	match &node.payload.group {
		Some(group) => theme.palette.get(group_slot(group)),
		None => theme.palette.get(index),
	}
}

/// Stable palette slot for a group name.
fn group_slot(group: &str) -> usize {
	group
		.bytes()
		.fold(0usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn explicit_color_wins_over_group() {
		let theme = Theme::default();
		let node = Node::new(
			"a",
			NodeMeta {
				color: Some("#102030".into()),
				group: Some("g".into()),
				..NodeMeta::default()
			},
		);
		assert_eq!(node_color(&node, 0, &theme), Color::rgb(0x10, 0x20, 0x30));
	}

	#[test]
	fn same_group_same_color() {
		let theme = Theme::default();
		let meta = |group: &str| NodeMeta {
			group: Some(group.into()),
			..NodeMeta::default()
		};
		let a = Node::new("a", meta("modules"));
		let b = Node::new("b", meta("modules"));
		assert_eq!(node_color(&a, 0, &theme), node_color(&b, 5, &theme));
	}
}
