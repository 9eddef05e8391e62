//! Continuous scales for mapping data values onto pixels.

/// Smallest and largest value of `values`, ignoring non-finite entries.
pub fn extent(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
	values
		.into_iter()
		.filter(|v| v.is_finite())
		.fold(None, |acc, v| match acc {
			None => Some((v, v)),
			Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
		})
}

/// Linear mapping from `domain` onto `range`. A collapsed domain maps to the range midpoint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearScale {
	domain: (f64, f64),
	range: (f64, f64),
	clamp: bool,
}

impl LinearScale {
	pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
		Self {
			domain,
			range,
			clamp: false,
		}
	}

	pub fn clamped(mut self) -> Self {
		self.clamp = true;
		self
	}

	pub fn range(&self) -> (f64, f64) {
		self.range
	}

	pub fn apply(&self, value: f64) -> f64 {
		let (d0, d1) = self.domain;
		let (r0, r1) = self.range;
		if d1 == d0 {
			return (r0 + r1) / 2.0;
		}
		let mut t = (value - d0) / (d1 - d0);
		if self.clamp {
			t = t.clamp(0.0, 1.0);
		}
		r0 + t * (r1 - r0)
	}
}

/// Square-root scale: area, not radius, grows linearly with the input.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SqrtScale {
	inner: LinearScale,
}

impl SqrtScale {
	/// `domain` must be non-negative. Output is clamped to `range`.
	pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
		Self {
			inner: LinearScale::new((domain.0.max(0.0).sqrt(), domain.1.max(0.0).sqrt()), range)
				.clamped(),
		}
	}

	pub fn apply(&self, value: f64) -> f64 {
		self.inner.apply(value.max(0.0).sqrt())
	}

	pub fn range(&self) -> (f64, f64) {
		self.inner.range()
	}
}
