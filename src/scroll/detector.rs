use super::steps::{Direction, ScrollStep};

/// Default trigger line, as a fraction of the viewport height from the top.
pub const DEFAULT_OFFSET: f64 = 0.5;

/// Works out which narrative step sits on the trigger line.
///
/// Pure over element geometry, so the page glue only has to measure the step elements.
#[derive(Clone, Debug)]
pub struct StepDetector {
	offset: f64,
	active: Option<usize>,
}

impl Default for StepDetector {
	fn default() -> Self {
		Self::new(DEFAULT_OFFSET)
	}
}

impl StepDetector {
	pub fn new(offset: f64) -> Self {
		Self {
			offset: offset.clamp(0.0, 1.0),
			active: None,
		}
	}

	pub fn active(&self) -> Option<usize> {
		self.active
	}

	/// `tops` are the viewport-relative tops of the step elements, in document order.
	/// Returns an event only when the active step changes.
	pub fn update(&mut self, tops: &[f64], viewport_height: f64) -> Option<ScrollStep> {
		let line = viewport_height * self.offset;
		let current = tops.iter().rposition(|top| *top <= line)?;
		if self.active == Some(current) {
			return None;
		}
		let direction = match self.active {
			Some(previous) if current < previous => Direction::Up,
			_ => Direction::Down,
		};
		self.active = Some(current);
		Some(ScrollStep {
			index: current,
			direction,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn nothing_before_the_first_step_arrives() {
		let mut d = StepDetector::default();
		assert_eq!(d.update(&[600.0, 1400.0], 800.0), None);
		assert_eq!(d.active(), None);
	}

	#[test]
	fn fires_once_per_change() {
		let mut d = StepDetector::default();
		let down = d.update(&[390.0, 1200.0, 2000.0], 800.0);
		assert_eq!(
			down,
			Some(ScrollStep {
				index: 0,
				direction: Direction::Down
			})
		);
		assert_eq!(d.update(&[300.0, 1100.0, 1900.0], 800.0), None);

		let next = d.update(&[-500.0, 350.0, 1100.0], 800.0).unwrap();
		assert_eq!(next.index, 1);
		assert_eq!(next.direction, Direction::Down);

		let back = d.update(&[100.0, 900.0, 1700.0], 800.0).unwrap();
		assert_eq!(back.index, 0);
		assert_eq!(back.direction, Direction::Up);
	}

	#[test]
	fn skipping_steps_reports_the_last_one_passed() {
		let mut d = StepDetector::new(0.25);
		let step = d.update(&[-900.0, -400.0, 150.0, 900.0], 800.0).unwrap();
		assert_eq!(step.index, 2);
	}
}
