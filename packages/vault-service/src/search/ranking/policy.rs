use std::cmp::Ordering;

use serde::Serialize;

use super::grouping::DocumentGroup;

/// One comparator in the ranking chain. Stages run in order; the first non-equal result wins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RankStage {
	RecencyPriority,
	Relevance,
	RecencyTiebreak,
	SourcePresence,
	ContentTypePreference,
}

#[derive(Clone, Debug)]
pub struct RankPolicy<'a> {
	/// Only documents of this type survive when set.
	pub content_type: Option<&'a str>,
	/// Dates decide before relevance.
	pub date_priority: bool,
	pub relevance_tolerance: f32,
	pub primary: &'a str,
	pub secondary: &'a str,
}
impl RankPolicy<'_> {
	pub fn stages(&self) -> Vec<RankStage> {
		if self.date_priority {
			vec![
				RankStage::RecencyPriority,
				RankStage::Relevance,
				RankStage::SourcePresence,
				RankStage::ContentTypePreference,
			]
		} else {
			vec![
				RankStage::Relevance,
				RankStage::RecencyTiebreak,
				RankStage::SourcePresence,
				RankStage::ContentTypePreference,
			]
		}
	}

	pub fn compare_stage(
		&self,
		stage: RankStage,
		lhs: &DocumentGroup,
		rhs: &DocumentGroup,
	) -> Ordering {
		match stage {
			RankStage::RecencyPriority | RankStage::RecencyTiebreak =>
				cmp_date_desc(lhs.timestamp, rhs.timestamp),
			RankStage::Relevance =>
				cmp_relevance(lhs.best_distance, rhs.best_distance, self.relevance_tolerance),
			RankStage::SourcePresence => rhs.has_source().cmp(&lhs.has_source()),
			RankStage::ContentTypePreference => self.cmp_partition(lhs, rhs),
		}
	}

	pub fn compare(
		&self,
		stages: &[RankStage],
		lhs: &DocumentGroup,
		rhs: &DocumentGroup,
	) -> Ordering {
		for stage in stages {
			let ordering = self.compare_stage(*stage, lhs, rhs);

			if ordering != Ordering::Equal {
				return ordering;
			}
		}

		Ordering::Equal
	}

	fn cmp_partition(&self, lhs: &DocumentGroup, rhs: &DocumentGroup) -> Ordering {
		let lhs_type = lhs.metadata.content_type.as_str();
		let rhs_type = rhs.metadata.content_type.as_str();

		if lhs_type == self.primary && rhs_type == self.secondary {
			Ordering::Less
		} else if lhs_type == self.secondary && rhs_type == self.primary {
			Ordering::Greater
		} else {
			Ordering::Equal
		}
	}
}

/// Newest first; undated documents after every dated one.
pub fn cmp_date_desc(lhs: Option<i64>, rhs: Option<i64>) -> Ordering {
	match (lhs, rhs) {
		(Some(lhs), Some(rhs)) => rhs.cmp(&lhs),
		(Some(_), None) => Ordering::Less,
		(None, Some(_)) => Ordering::Greater,
		(None, None) => Ordering::Equal,
	}
}

/// Ascending adjusted distance; differences inside the tolerance band tie.
pub fn cmp_relevance(lhs: f32, rhs: f32, tolerance: f32) -> Ordering {
	if (lhs - rhs).abs() < tolerance {
		return Ordering::Equal;
	}

	lhs.partial_cmp(&rhs).unwrap_or(Ordering::Equal)
}

/// Filters, orders, and truncates document groups.
///
/// The tolerance band makes the comparator non-transitive, so ordering uses a stable insertion
/// sort that never needs a total order.
pub fn rank_groups(
	groups: Vec<DocumentGroup>,
	policy: &RankPolicy<'_>,
	limit: usize,
) -> Vec<DocumentGroup> {
	let mut ranked: Vec<DocumentGroup> = match policy.content_type {
		Some(content_type) =>
			groups.into_iter().filter(|group| group.metadata.content_type == content_type).collect(),
		None => groups,
	};
	let stages = policy.stages();

	for i in 1..ranked.len() {
		let mut j = i;

		while j > 0 && policy.compare(&stages, &ranked[j - 1], &ranked[j]) == Ordering::Greater {
			ranked.swap(j - 1, j);

			j -= 1;
		}
	}

	ranked.truncate(limit);

	ranked
}
