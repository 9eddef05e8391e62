use std::collections::BTreeSet;

use crate::layout::Node;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
	Up,
	Down,
}

/// Fired when the reader scrolls a new narrative step into place.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScrollStep {
	pub index: usize,
	pub direction: Direction,
}

/// A display class toggled on nodes by a predicate over their attributes.
#[derive(Clone, Debug, PartialEq)]
pub enum HighlightClass {
	/// Nodes heavier than the size threshold.
	LargeEmployers,
	Categories(BTreeSet<String>),
}

impl HighlightClass {
	pub fn matches(&self, node: &Node, size_threshold: f64) -> bool {
		match self {
			HighlightClass::LargeEmployers => node.weight() > size_threshold,
			HighlightClass::Categories(set) => set.contains(node.category()),
		}
	}
}

/// What the chart should look like while a step is active.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StepTarget {
	/// Categories pulled to one side of the field; `None` keeps everything centered.
	pub isolate: Option<BTreeSet<String>>,
	/// Regroup large and small employers, letting them ghost through each other.
	pub size_separation: bool,
	pub highlight: Vec<HighlightClass>,
	/// When set, ghosting switches itself off this long after the step is entered.
	/// Otherwise it lasts until a step without size separation.
	pub ghost_restore_delay_ms: Option<f64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StepRule {
	pub index: usize,
	/// `None` matches either direction; a rule with a direction wins over one without.
	pub direction: Option<Direction>,
	pub target: StepTarget,
}

pub fn lookup(rules: &[StepRule], step: ScrollStep) -> Option<&StepTarget> {
	let exact = rules
		.iter()
		.find(|r| r.index == step.index && r.direction == Some(step.direction));
	exact
		.or_else(|| rules.iter().find(|r| r.index == step.index && r.direction.is_none()))
		.map(|r| &r.target)
}

fn set(names: &[&str]) -> BTreeSet<String> {
	names.iter().map(|s| s.to_string()).collect()
}

/// The article's narrative: centered, isolate software, isolate the hardest-hit
/// industries, back to center with large employers marked, then split by size.
pub fn default_narrative() -> Vec<StepRule> {
	let software = set(&["Internet & Software"]);
	let hard_hit = set(&[
		"Aerospace",
		"Hotels & Accommodation",
		"Automotive",
		"Retail",
	]);
	vec![
		StepRule {
			index: 0,
			direction: None,
			target: StepTarget::default(),
		},
		StepRule {
			index: 1,
			direction: None,
			target: StepTarget {
				isolate: Some(software.clone()),
				highlight: vec![HighlightClass::Categories(software)],
				..Default::default()
			},
		},
		StepRule {
			index: 2,
			direction: None,
			target: StepTarget {
				isolate: Some(hard_hit.clone()),
				highlight: vec![HighlightClass::Categories(hard_hit)],
				..Default::default()
			},
		},
		StepRule {
			index: 3,
			direction: None,
			target: StepTarget {
				highlight: vec![HighlightClass::LargeEmployers],
				..Default::default()
			},
		},
		StepRule {
			index: 4,
			direction: None,
			target: StepTarget {
				size_separation: true,
				highlight: vec![HighlightClass::LargeEmployers],
				ghost_restore_delay_ms: Some(1800.0),
				..Default::default()
			},
		},
	]
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn directed_rule_beats_undirected() {
		let up = StepTarget {
			size_separation: true,
			..Default::default()
		};
		let rules = vec![
			StepRule {
				index: 2,
				direction: None,
				target: StepTarget::default(),
			},
			StepRule {
				index: 2,
				direction: Some(Direction::Up),
				target: up.clone(),
			},
		];
		let step = |direction| ScrollStep { index: 2, direction };
		assert_eq!(lookup(&rules, step(Direction::Up)), Some(&up));
		assert_eq!(lookup(&rules, step(Direction::Down)), Some(&StepTarget::default()));
		assert_eq!(
			lookup(&rules, ScrollStep { index: 9, direction: Direction::Down }),
			None
		);
	}

	#[test]
	fn default_narrative_covers_every_step_once() {
		let rules = default_narrative();
		let indices: Vec<usize> = rules.iter().map(|r| r.index).collect();
		assert_eq!(indices, vec![0, 1, 2, 3, 4]);
		assert!(rules[0].target.isolate.is_none());
		assert!(rules.last().unwrap().target.size_separation);
	}

	#[test]
	fn highlight_predicates() {
		let big = Node::new("a", "Retail", 20_000.0, 10.0);
		let small = Node::new("b", "Finance", 40.0, 3.0);
		assert!(HighlightClass::LargeEmployers.matches(&big, 1000.0));
		assert!(!HighlightClass::LargeEmployers.matches(&small, 1000.0));
		let retail = HighlightClass::Categories(set(&["Retail"]));
		assert!(retail.matches(&big, 1000.0));
		assert!(!retail.matches(&small, 1000.0));
	}
}
