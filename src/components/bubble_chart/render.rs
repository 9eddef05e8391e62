use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::state::{ChartInstance, HoverDetails};

const BACKGROUND: &str = "#fdfdfc";
const DIMMED_ALPHA: f64 = 0.2;

pub fn render(chart: &ChartInstance, ctx: &CanvasRenderingContext2d) {
	let viewport = chart.viewport();
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, viewport.width, viewport.height);

	ctx.save();
	let _ = ctx.translate(viewport.width / 2.0, viewport.height / 2.0);
	let _ = ctx.rotate(chart.rotation());
	draw_nodes(chart, ctx);
	ctx.restore();

	let font_px = if chart.is_shrunk() { 11.0 } else { 14.0 };
	draw_labels(chart, ctx, font_px);
	if let Some(details) = chart.hover() {
		draw_hover(&details, ctx, font_px);
	}
}

fn draw_nodes(chart: &ChartInstance, ctx: &CanvasRenderingContext2d) {
	let has_highlight = chart.has_highlight();
	for node in chart.nodes() {
		let p = node.position();
		let dimmed = has_highlight && !chart.is_highlighted(node);
		ctx.set_global_alpha(if dimmed { DIMMED_ALPHA } else { 1.0 });
		ctx.begin_path();
		let _ = ctx.arc(p.x, p.y, node.radius(), 0.0, 2.0 * PI);
		ctx.set_fill_style_str(&chart.color(node.category()));
		ctx.fill();
	}
	ctx.set_global_alpha(1.0);
}

fn draw_labels(chart: &ChartInstance, ctx: &CanvasRenderingContext2d, font_px: f64) {
	ctx.set_font(&format!("600 {font_px}px sans-serif"));
	ctx.set_text_align("center");
	for label in chart.labels() {
		// Halo so the text stays legible over the bubbles.
		ctx.set_stroke_style_str(BACKGROUND);
		ctx.set_line_width(4.0);
		let _ = ctx.stroke_text(&label.text, label.at.x, label.at.y);
		ctx.set_fill_style_str("#222");
		let _ = ctx.fill_text(&label.text, label.at.x, label.at.y);
	}
	ctx.set_text_align("start");
}

fn draw_hover(details: &HoverDetails<'_>, ctx: &CanvasRenderingContext2d, font_px: f64) {
	let HoverDetails { at, radius, .. } = *details;
	ctx.begin_path();
	let _ = ctx.arc(at.x, at.y, radius + 2.0, 0.0, 2.0 * PI);
	ctx.set_stroke_style_str("#222");
	ctx.set_line_width(1.5);
	ctx.stroke();

	let lines = [details.employer, details.industry, details.size_text];
	let (x, mut y) = (at.x + radius + 6.0, at.y - font_px);
	ctx.set_font(&format!("{font_px}px sans-serif"));
	for line in lines {
		ctx.set_stroke_style_str(BACKGROUND);
		ctx.set_line_width(3.0);
		let _ = ctx.stroke_text(line, x, y);
		ctx.set_fill_style_str("#222");
		let _ = ctx.fill_text(line, x, y);
		y += font_px * 1.2;
	}
}
