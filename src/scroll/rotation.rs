//! Whole-field rotation, animated on the frame clock.
//!
//! Only one rotation is ever in flight. Starting a new one drops the previous completion
//! sender, so whoever awaits the old handle sees [`RotationOutcome::Interrupted`].

use std::f64::consts::PI;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::channel::oneshot;
use log::debug;

use crate::layout::normalize_angle;

pub fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RotationOutcome {
	Settled,
	/// A newer rotation took over. Not an error.
	Interrupted,
}

/// Resolves once the rotation it was returned for settles or is superseded.
#[must_use = "the handle reports when the rotation ends"]
pub struct RotationHandle {
	generation: u64,
	done: oneshot::Receiver<()>,
}

impl RotationHandle {
	pub fn generation(&self) -> u64 {
		self.generation
	}
}

impl Future for RotationHandle {
	type Output = RotationOutcome;

	fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
		Pin::new(&mut self.done).poll(cx).map(|r| match r {
			Ok(()) => RotationOutcome::Settled,
			Err(oneshot::Canceled) => RotationOutcome::Interrupted,
		})
	}
}

struct ActiveRotation {
	generation: u64,
	from: f64,
	to: f64,
	elapsed: f64,
	duration: f64,
	done: oneshot::Sender<()>,
}

pub struct RotationAnimator {
	angle: f64,
	target: f64,
	generation: u64,
	base_ms: f64,
	extra_ms: f64,
	active: Option<ActiveRotation>,
}

impl RotationAnimator {
	pub fn new(base_ms: f64, extra_ms: f64) -> Self {
		Self {
			angle: 0.0,
			target: 0.0,
			generation: 0,
			base_ms,
			extra_ms,
			active: None,
		}
	}

	/// Angle currently on screen, in radians.
	pub fn angle(&self) -> f64 {
		self.angle
	}

	/// Angle the field is heading to (equal to `angle()` when idle).
	pub fn target(&self) -> f64 {
		self.target
	}

	pub fn is_animating(&self) -> bool {
		self.active.is_some()
	}

	pub fn duration_for(&self, delta: f64) -> f64 {
		if delta.abs() > 3.0 * PI / 4.0 {
			self.base_ms + self.extra_ms
		} else {
			self.base_ms
		}
	}

	/// Starts turning toward `radians`, the short way round. Supersedes any rotation in
	/// flight, which continues from wherever it had got to.
	pub fn rotate_to(&mut self, radians: f64) -> RotationHandle {
		if let Some(old) = self.active.take() {
			debug!("rotation {} interrupted at {:.3}rad", old.generation, self.angle);
		}
		self.generation += 1;
		let (tx, rx) = oneshot::channel();
		let delta = normalize_angle(radians - self.angle);
		self.target = self.angle + delta;

		if delta == 0.0 {
			let _ = tx.send(());
		} else {
			let duration = self.duration_for(delta);
			debug!(
				"rotation {} to {:.3}rad over {duration}ms",
				self.generation, self.target
			);
			self.active = Some(ActiveRotation {
				generation: self.generation,
				from: self.angle,
				to: self.target,
				elapsed: 0.0,
				duration,
				done: tx,
			});
		}
		RotationHandle {
			generation: self.generation,
			done: rx,
		}
	}

	/// Moves the animation forward. Returns `true` on the frame it settles.
	pub fn advance(&mut self, dt_ms: f64) -> bool {
		let Some(active) = self.active.as_mut() else {
			return false;
		};
		active.elapsed += dt_ms;
		let t = (active.elapsed / active.duration).min(1.0);
		self.angle = active.from + (active.to - active.from) * ease_out_cubic(t);
		if t < 1.0 {
			return false;
		}

		let Some(finished) = self.active.take() else {
			return false;
		};
		self.angle = normalize_angle(finished.to);
		self.target = self.angle;
		let _ = finished.done.send(());
		true
	}
}
