//! Static inputs: the company list, derived category metadata and the postings summary.

use std::collections::{BTreeMap, HashMap};
use std::f64::consts::PI;

use chrono::NaiveDate;
use log::warn;
use serde::Deserialize;

use crate::error::{ChartError, Result};
use crate::layout::scale::{SqrtScale, extent};
use crate::layout::{Node, Point};

pub const COMPANIES_JSON: &str = include_str!("../data/employer-industries.json");
pub const POSTINGS_JSON: &str = include_str!("../data/postings.json");

/// d3's 11-class Spectral scheme, used as a continuous ramp.
const SPECTRAL: [&str; 11] = [
	"#9e0142", "#d53e4f", "#f46d43", "#fdae61", "#fee08b", "#ffffbf", "#e6f598", "#abdda4",
	"#66c2a5", "#3288bd", "#5e4fa2",
];

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyRecord {
	pub employer: String,
	pub industry: String,
	pub size_text: String,
}

pub fn load_companies(json: &str) -> Result<Vec<CompanyRecord>> {
	Ok(serde_json::from_str(json)?)
}

/// Pulls the first number out of text such as `"1,200+ employees"` or `"51-200 employees"`.
pub fn parse_size_text(text: &str) -> Option<f64> {
	let start = text.find(|c: char| c.is_ascii_digit())?;
	let digits: String = text[start..]
		.chars()
		.take_while(|c| c.is_ascii_digit() || *c == ',')
		.filter(char::is_ascii_digit)
		.collect();
	digits.parse::<f64>().ok().filter(|v| *v > 0.0)
}

#[derive(Clone, Debug, PartialEq)]
pub struct CategoryInfo {
	pub name: String,
	pub count: usize,
	/// Cumulative proportion of all records before this category, in `[0, 1)`.
	pub start: f64,
	pub share: f64,
	/// Position on the color ramp after shuffling, in `[0, 1)`.
	pub color_t: f64,
}

/// Distinct categories, largest first, with their slice of `[0, 1)`.
#[derive(Clone, Debug, Default)]
pub struct CategoryTable {
	categories: Vec<CategoryInfo>,
}

impl CategoryTable {
	pub fn from_records(records: &[CompanyRecord]) -> Self {
		let mut counts: HashMap<&str, usize> = HashMap::new();
		for r in records {
			*counts.entry(r.industry.as_str()).or_default() += 1;
		}
		let mut ordered: Vec<(&str, usize)> = counts.into_iter().collect();
		ordered.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

		let total = records.len().max(1) as f64;
		let n = ordered.len();
		let stride = color_stride(n);
		let mut start = 0.0;
		let categories = ordered
			.into_iter()
			.enumerate()
			.map(|(i, (name, count))| {
				let share = count as f64 / total;
				let info = CategoryInfo {
					name: name.to_string(),
					count,
					start,
					share,
					color_t: ((i * stride) % n.max(1)) as f64 / n.max(1) as f64,
				};
				start += share;
				info
			})
			.collect();
		Self { categories }
	}

	pub fn get(&self, name: &str) -> Option<&CategoryInfo> {
		self.categories.iter().find(|c| c.name == name)
	}

	pub fn iter(&self) -> impl Iterator<Item = &CategoryInfo> {
		self.categories.iter()
	}

	pub fn len(&self) -> usize {
		self.categories.len()
	}

	pub fn is_empty(&self) -> bool {
		self.categories.is_empty()
	}

	/// Hex color for a category; unknown categories get the middle of the ramp.
	pub fn color(&self, name: &str) -> String {
		spectral(self.get(name).map_or(0.5, |c| c.color_t))
	}
}

/// Step through the ramp so neighbouring categories don't get neighbouring colors.
fn color_stride(n: usize) -> usize {
	if n < 3 {
		return 1;
	}
	let mut stride = n / 2;
	while gcd(stride, n) != 1 {
		stride += 1;
	}
	stride
}

fn gcd(a: usize, b: usize) -> usize {
	if b == 0 { a } else { gcd(b, a % b) }
}

fn spectral(t: f64) -> String {
	let t = t.clamp(0.0, 1.0) * (SPECTRAL.len() - 1) as f64;
	let i = (t.floor() as usize).min(SPECTRAL.len() - 2);
	let f = t - i as f64;
	let (a, b) = (hex_rgb(SPECTRAL[i]), hex_rgb(SPECTRAL[i + 1]));
	let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * f).round() as u8;
	format!("#{:02x}{:02x}{:02x}", mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

fn hex_rgb(hex: &str) -> (u8, u8, u8) {
	let v = u32::from_str_radix(hex.trim_start_matches('#'), 16).unwrap_or(0);
	((v >> 16) as u8, (v >> 8) as u8, v as u8)
}

/// Weight extent over the records whose size text parses. Malformed ones stay out of it.
pub fn weight_domain(records: &[CompanyRecord]) -> Option<(f64, f64)> {
	extent(records.iter().filter_map(|r| parse_size_text(&r.size_text)))
}

/// One node per record, seeded on a ring inside its category's angular slice.
pub fn build_nodes(
	records: &[CompanyRecord],
	table: &CategoryTable,
	radius: &SqrtScale,
	seed_radius: f64,
) -> Vec<Node> {
	let fallback = weight_domain(records).map_or(1.0, |(lo, _)| lo);
	let mut seen: HashMap<&str, usize> = HashMap::new();

	records
		.iter()
		.map(|r| {
			let weight = parse_size_text(&r.size_text).unwrap_or_else(|| {
				warn!("unparseable size {:?} for {}", r.size_text, r.employer);
				fallback
			});
			let k = seen.entry(r.industry.as_str()).or_default();
			let position = table.get(&r.industry).map_or(Point::ORIGIN, |c| {
				let t = c.start + c.share * (*k as f64 + 0.5) / c.count as f64;
				let ring = seed_radius * (0.6 + 0.2 * (*k % 3) as f64);
				Point::new(ring, 0.0).rotate(2.0 * PI * t)
			});
			*k += 1;
			Node::new(&r.employer, &r.industry, weight, radius.apply(weight)).at(position)
		})
		.collect()
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyPostings {
	pub date: String,
	pub count: u32,
	pub remote_count: u32,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostingsSummary {
	pub postings: Vec<DailyPostings>,
	/// Industry to fractional change in daily postings.
	pub industry_changes: BTreeMap<String, f64>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PostingPoint {
	pub date: NaiveDate,
	pub count: u32,
	pub remote_count: u32,
}

impl PostingsSummary {
	pub fn load(json: &str) -> Result<Self> {
		Ok(serde_json::from_str(json)?)
	}

	/// Postings in date order.
	pub fn series(&self) -> Result<Vec<PostingPoint>> {
		let mut points = self
			.postings
			.iter()
			.map(|p| {
				let date = NaiveDate::parse_from_str(&p.date, "%Y-%m-%d").map_err(|_| {
					ChartError::InvalidDate {
						value: p.date.clone(),
					}
				})?;
				Ok(PostingPoint {
					date,
					count: p.count,
					remote_count: p.remote_count,
				})
			})
			.collect::<Result<Vec<_>>>()?;
		points.sort_by_key(|p| p.date);
		Ok(points)
	}

	/// Industry changes, most negative first.
	pub fn sorted_changes(&self) -> Vec<(&str, f64)> {
		let mut changes: Vec<(&str, f64)> = self
			.industry_changes
			.iter()
			.map(|(k, v)| (k.as_str(), *v))
			.collect();
		changes.sort_by(|a, b| a.1.total_cmp(&b.1));
		changes
	}
}
