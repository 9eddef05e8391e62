use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, error};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Element, HtmlCanvasElement, MouseEvent, Window};

use super::render;
use super::state::{ChartInstance, Viewport};
use crate::config::ChartConfig;
use crate::data::{COMPANIES_JSON, load_companies};
use crate::error::ChartError;
use crate::scroll::{RotationHandle, RotationOutcome, StepDetector};

type SharedChart = Rc<RefCell<Option<ChartInstance>>>;
type Callback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// Longest frame step fed to the clocks, so a backgrounded tab doesn't jump on return.
const MAX_FRAME_MS: f64 = 100.0;

#[component]
pub fn BubbleChart(
	/// Selector for the narrative step elements, in document order.
	#[prop(default = ".scrolly .step")]
	step_selector: &'static str,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let chart: SharedChart = Rc::new(RefCell::new(None));
	let animate: Callback = Rc::new(RefCell::new(None));
	let resize_cb: Callback = Rc::new(RefCell::new(None));
	let scroll_cb: Callback = Rc::new(RefCell::new(None));
	let (chart_init, animate_init, resize_init, scroll_init) =
		(chart.clone(), animate.clone(), resize_cb.clone(), scroll_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};
		let Some(ctx) = context_2d(&canvas) else {
			error!("{}", ChartError::MissingAnchor {
				selector: "canvas 2d context".into()
			});
			return;
		};
		let steps = match step_elements(&window, step_selector) {
			Ok(steps) => steps,
			Err(e) => {
				error!("{e}");
				return;
			}
		};
		let records = match load_companies(COMPANIES_JSON) {
			Ok(records) => records,
			Err(e) => {
				error!("{e}");
				return;
			}
		};

		let viewport = fit_canvas(&canvas);
		*chart_init.borrow_mut() = Some(ChartInstance::new(records, viewport, ChartConfig::default()));

		let (chart_resize, canvas_resize) = (chart_init.clone(), canvas.clone());
		*resize_init.borrow_mut() = Some(Closure::new(move || {
			let viewport = fit_canvas(&canvas_resize);
			let handle = chart_resize
				.borrow_mut()
				.as_mut()
				.and_then(|c| c.resize(viewport));
			if let Some(handle) = handle {
				reveal_labels_after(chart_resize.clone(), handle);
			}
		}));
		if let Some(ref cb) = *resize_init.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let detector = Rc::new(RefCell::new(StepDetector::default()));
		let chart_scroll = chart_init.clone();
		let on_scroll = move || {
			let Some(window) = web_sys::window() else {
				return;
			};
			let tops: Vec<f64> = steps
				.iter()
				.map(|el| el.get_bounding_client_rect().top())
				.collect();
			let height = window_height(&window);
			let Some(step) = detector.borrow_mut().update(&tops, height) else {
				return;
			};
			debug!("scroll step {} ({:?})", step.index, step.direction);
			let handle = chart_scroll
				.borrow_mut()
				.as_mut()
				.and_then(|c| c.on_step(step));
			if let Some(handle) = handle {
				reveal_labels_after(chart_scroll.clone(), handle);
			}
		};
		*scroll_init.borrow_mut() = Some(Closure::new(on_scroll));
		if let Some(ref cb) = *scroll_init.borrow() {
			let _ = window.add_event_listener_with_callback("scroll", cb.as_ref().unchecked_ref());
			// The page may load already scrolled into a step.
			let _ = cb.as_ref().unchecked_ref::<js_sys::Function>().call0(&JsValue::NULL);
		}

		let (chart_anim, animate_inner) = (chart_init.clone(), animate_init.clone());
		let mut last = js_sys::Date::now();
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			let now = js_sys::Date::now();
			let dt = (now - last).clamp(0.0, MAX_FRAME_MS);
			last = now;
			if let Some(ref mut c) = *chart_anim.borrow_mut() {
				c.frame(dt);
				render::render(c, &ctx);
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				if let Some(win) = web_sys::window() {
					let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
				}
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let chart_mm = chart.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let rect = canvas.get_bounding_client_rect();
		let (x, y) = (
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		);
		if let Some(ref mut c) = *chart_mm.borrow_mut() {
			let hovered = c.node_at(x, y);
			c.set_hover(hovered);
		}
	};

	let chart_ml = chart.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut c) = *chart_ml.borrow_mut() {
			c.set_hover(None);
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="bubble-chart-canvas"
			on:mousemove=on_mousemove
			on:mouseleave=on_mouseleave
			style="display: block; width: 100%; height: 100%;"
		/>
	}
}

/// Waits for a rotation to end and pins the labels once it has settled. An interrupted
/// rotation leaves the labels to whichever transition replaced it.
fn reveal_labels_after(chart: SharedChart, handle: RotationHandle) {
	leptos::task::spawn_local(async move {
		match handle.await {
			RotationOutcome::Settled => {
				if let Some(ref mut c) = *chart.borrow_mut() {
					c.reveal_labels();
				}
			}
			RotationOutcome::Interrupted => debug!("rotation superseded, labels left hidden"),
		}
	});
}

fn context_2d(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
	canvas.get_context("2d").ok()??.dyn_into().ok()
}

fn step_elements(window: &Window, selector: &str) -> Result<Vec<Element>, ChartError> {
	let missing = || ChartError::MissingAnchor {
		selector: selector.to_string(),
	};
	let document = window.document().ok_or_else(missing)?;
	let list = document.query_selector_all(selector).map_err(|_| missing())?;
	let steps: Vec<Element> = (0..list.length())
		.filter_map(|i| list.item(i))
		.filter_map(|node| node.dyn_into::<Element>().ok())
		.collect();
	if steps.is_empty() {
		return Err(missing());
	}
	Ok(steps)
}

fn window_height(window: &Window) -> f64 {
	window
		.inner_height()
		.ok()
		.and_then(|v| v.as_f64())
		.unwrap_or(0.0)
}

/// Sizes the canvas backing store to its parent and returns the new viewport.
fn fit_canvas(canvas: &HtmlCanvasElement) -> Viewport {
	let (w, h) = canvas
		.parent_element()
		.map(|p| (p.client_width() as f64, p.client_height() as f64))
		.unwrap_or((600.0, 600.0));
	canvas.set_width(w as u32);
	canvas.set_height(h as u32);
	Viewport::new(w, h)
}
