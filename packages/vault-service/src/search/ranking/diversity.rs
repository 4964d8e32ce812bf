use std::collections::HashSet;

use serde::Serialize;

use vault_domain::similarity;

use super::grouping::DocumentGroup;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupRule {
	SourcePresence,
	PrimaryPartition,
}
impl DedupRule {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::SourcePresence => "source_presence",
			Self::PrimaryPartition => "primary_partition",
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DedupDecision {
	pub kept: String,
	pub dropped: String,
	pub similarity: f32,
	pub rule: DedupRule,
}

/// Which of two near-duplicates survives, as `(keep_lhs, rule)`. `None` keeps both.
fn precedence(
	lhs: &DocumentGroup,
	rhs: &DocumentGroup,
	primary: &str,
) -> Option<(bool, DedupRule)> {
	match (lhs.has_source(), rhs.has_source()) {
		(true, false) => return Some((true, DedupRule::SourcePresence)),
		(false, true) => return Some((false, DedupRule::SourcePresence)),
		_ => {},
	}

	let lhs_primary = lhs.metadata.content_type == primary;
	let rhs_primary = rhs.metadata.content_type == primary;

	match (lhs_primary, rhs_primary) {
		(true, false) => Some((true, DedupRule::PrimaryPartition)),
		(false, true) => Some((false, DedupRule::PrimaryPartition)),
		_ => None,
	}
}

/// Drops near-duplicate documents by title similarity.
///
/// Every pair is judged on its own, so the survivors do not depend on input order.
pub fn dedupe_groups(
	groups: Vec<DocumentGroup>,
	primary: &str,
	threshold: f32,
) -> (Vec<DocumentGroup>, Vec<DedupDecision>) {
	let mut decisions = Vec::new();
	let mut dropped: HashSet<usize> = HashSet::new();

	for i in 0..groups.len() {
		for j in (i + 1)..groups.len() {
			let lhs = &groups[i];
			let rhs = &groups[j];
			let similarity = similarity::title_similarity(&lhs.document_key, &rhs.document_key);

			if similarity <= threshold {
				continue;
			}

			let Some((keep_lhs, rule)) = precedence(lhs, rhs, primary) else {
				tracing::debug!(
					lhs = %lhs.document_key,
					rhs = %rhs.document_key,
					similarity,
					"Near-duplicate pair is ambiguous; keeping both."
				);

				continue;
			};
			let (kept, lost) = if keep_lhs { (i, j) } else { (j, i) };

			dropped.insert(lost);
			decisions.push(DedupDecision {
				kept: groups[kept].document_key.clone(),
				dropped: groups[lost].document_key.clone(),
				similarity,
				rule,
			});
		}
	}

	for decision in &decisions {
		tracing::debug!(
			kept = %decision.kept,
			dropped = %decision.dropped,
			similarity = decision.similarity,
			rule = decision.rule.as_str(),
			"Near-duplicate document dropped."
		);
	}

	let survivors = groups
		.into_iter()
		.enumerate()
		.filter(|(idx, _)| !dropped.contains(idx))
		.map(|(_, group)| group)
		.collect();

	(survivors, decisions)
}
