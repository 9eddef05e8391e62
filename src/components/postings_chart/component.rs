use leptos::prelude::*;
use log::{error, info};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::plot::{Margins, bar_plot, line_plot};
use crate::data::{POSTINGS_JSON, PostingPoint, PostingsSummary};
use crate::error::ChartError;

const TOTAL_COLOR: &str = "#3288bd";
const REMOTE_COLOR: &str = "#f46d43";

/// Daily internship postings, total and remote, plus the per-industry change.
#[component]
pub fn PostingsChart(
	#[prop(default = 640.0)] width: f64,
	#[prop(default = 260.0)] height: f64,
) -> impl IntoView {
	let line_ref = NodeRef::<leptos::html::Canvas>::new();
	let bars_ref = NodeRef::<leptos::html::Canvas>::new();

	Effect::new(move |_| {
		let (Some(line), Some(bars)) = (line_ref.get(), bars_ref.get()) else {
			return;
		};
		let summary = match PostingsSummary::load(POSTINGS_JSON) {
			Ok(summary) => summary,
			Err(e) => {
				error!("{e}");
				return;
			}
		};
		let series = match summary.series() {
			Ok(series) => series,
			Err(e) => {
				error!("{e}");
				return;
			}
		};
		info!("postings chart: {} days", series.len());

		let changes = summary.sorted_changes();
		let bars_height = (changes.len() as f64 * 22.0).max(height / 2.0);
		match (
			prepare(line.into(), width, height),
			prepare(bars.into(), width, bars_height),
		) {
			(Ok(line_ctx), Ok(bars_ctx)) => {
				draw_lines(&line_ctx, &series, width, height);
				draw_bars(&bars_ctx, &changes, width, bars_height);
			}
			(Err(e), _) | (_, Err(e)) => error!("{e}"),
		}
	});

	view! {
		<figure class="postings-chart">
			<canvas node_ref=line_ref class="postings-line" />
			<figcaption>
				<span style=format!("color: {TOTAL_COLOR}")>"All postings"</span>
				" / "
				<span style=format!("color: {REMOTE_COLOR}")>"Remote"</span>
			</figcaption>
			<canvas node_ref=bars_ref class="postings-bars" />
		</figure>
	}
}

fn prepare(
	canvas: HtmlCanvasElement,
	width: f64,
	height: f64,
) -> Result<CanvasRenderingContext2d, ChartError> {
	canvas.set_width(width as u32);
	canvas.set_height(height as u32);
	canvas
		.get_context("2d")
		.ok()
		.flatten()
		.and_then(|ctx| ctx.dyn_into().ok())
		.ok_or_else(|| ChartError::MissingAnchor {
			selector: "postings canvas 2d context".into(),
		})
}

fn draw_lines(ctx: &CanvasRenderingContext2d, series: &[PostingPoint], width: f64, height: f64) {
	let m = Margins::default();
	let Some(plot) = line_plot(series, width, height, m) else {
		return;
	};
	ctx.clear_rect(0.0, 0.0, width, height);

	ctx.set_stroke_style_str("#999");
	ctx.set_line_width(1.0);
	ctx.begin_path();
	ctx.move_to(m.left, plot.baseline);
	ctx.line_to(width - m.right, plot.baseline);
	ctx.stroke();

	for (points, color) in [(&plot.total, TOTAL_COLOR), (&plot.remote, REMOTE_COLOR)] {
		ctx.set_stroke_style_str(color);
		ctx.set_line_width(2.0);
		ctx.begin_path();
		for (i, p) in points.iter().enumerate() {
			if i == 0 {
				ctx.move_to(p.x, p.y);
			} else {
				ctx.line_to(p.x, p.y);
			}
		}
		ctx.stroke();
	}

	ctx.set_fill_style_str("#555");
	ctx.set_font("11px sans-serif");
	let _ = ctx.fill_text(&format!("{}", plot.y_max), 4.0, m.top + 4.0);
	if let (Some(first), Some(last)) = (series.first(), series.last()) {
		let y = height - 8.0;
		let _ = ctx.fill_text(&first.date.format("%b %-d").to_string(), m.left, y);
		ctx.set_text_align("end");
		let _ = ctx.fill_text(&last.date.format("%b %-d").to_string(), width - m.right, y);
		ctx.set_text_align("start");
	}
}

fn draw_bars(ctx: &CanvasRenderingContext2d, changes: &[(&str, f64)], width: f64, height: f64) {
	// Labels sit inside the left margin.
	let m = Margins {
		left: width * 0.4,
		..Margins::default()
	};
	ctx.clear_rect(0.0, 0.0, width, height);
	ctx.set_font("11px sans-serif");
	for bar in bar_plot(changes, width, height, m) {
		ctx.set_fill_style_str(if bar.change < 0.0 { REMOTE_COLOR } else { TOTAL_COLOR });
		ctx.fill_rect(bar.x0, bar.y, bar.x1 - bar.x0, bar.height);

		ctx.set_fill_style_str("#333");
		ctx.set_text_align("end");
		let mid = bar.y + bar.height * 0.75;
		let _ = ctx.fill_text(&bar.label, m.left - 6.0, mid);
		ctx.set_text_align("start");
		let _ = ctx.fill_text(&format!("{:+.0}%", bar.change * 100.0), bar.x1 + 4.0, mid);
	}
}
