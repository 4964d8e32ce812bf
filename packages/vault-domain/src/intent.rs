use regex::Regex;
use serde::{Deserialize, Serialize};

const RECENCY_TERMS: [&str; 3] = ["recent", "latest", "newest"];
const RECENCY_PATTERNS: [&str; 2] = [r"\d+\s*(most|top)", r"last\s+\d+"];
const SAVED_TERMS: [&str; 2] = ["clipping", "saved"];
const SAVED_PATTERNS: [&str; 1] = [r"articles?\s+(i'?ve\s+)?(saved|clipped)"];
const AUTHORED_TERMS: [&str; 3] = ["blog", "wrote", "published"];

/// Corpus partition a query asks to be restricted to.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentTypeIntent {
	#[default]
	None,
	/// Things the owner saved or clipped from elsewhere.
	Saved,
	/// Things the owner wrote or published.
	Authored,
}
impl ContentTypeIntent {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::None => "none",
			Self::Saved => "saved",
			Self::Authored => "authored",
		}
	}

	pub fn is_set(self) -> bool {
		!matches!(self, Self::None)
	}
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct QueryIntent {
	pub recency: bool,
	pub content_type: ContentTypeIntent,
}
impl QueryIntent {
	/// Both a recency signal and a concrete partition are present.
	pub fn wants_recent_partition(&self) -> bool {
		self.recency && self.content_type.is_set()
	}
}

/// Infers ranking intent from the raw query text.
///
/// Classification is advisory and never fails. A query without any signal yields
/// `QueryIntent::default()`.
pub fn classify_query(query: &str) -> QueryIntent {
	let lower = query.to_lowercase();
	let recency = RECENCY_TERMS.iter().any(|term| lower.contains(term))
		|| RECENCY_PATTERNS.iter().any(|pattern| matches_pattern(pattern, &lower));
	let saved = SAVED_TERMS.iter().any(|term| lower.contains(term))
		|| SAVED_PATTERNS.iter().any(|pattern| matches_pattern(pattern, &lower));
	let authored = AUTHORED_TERMS.iter().any(|term| lower.contains(term));
	// Saved wins when both partitions are named.
	let content_type = if saved {
		ContentTypeIntent::Saved
	} else if authored {
		ContentTypeIntent::Authored
	} else {
		ContentTypeIntent::None
	};

	QueryIntent { recency, content_type }
}

fn matches_pattern(pattern: &str, text: &str) -> bool {
	Regex::new(pattern).map(|re| re.is_match(text)).unwrap_or(false)
}
