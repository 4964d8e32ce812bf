use regex::Regex;

use vault_config::Ranking;

#[derive(Clone, Copy, Debug)]
pub struct BoostWeights {
	pub min_term_chars: usize,
	pub body_term: f32,
	pub title_term: f32,
	pub title_pair_bonus: f32,
	pub title_comprehensive_bonus: f32,
}
impl From<&Ranking> for BoostWeights {
	fn from(cfg: &Ranking) -> Self {
		Self {
			min_term_chars: cfg.min_term_chars as usize,
			body_term: cfg.body_term_weight,
			title_term: cfg.title_term_weight,
			title_pair_bonus: cfg.title_pair_bonus,
			title_comprehensive_bonus: cfg.title_comprehensive_bonus,
		}
	}
}

/// Compiled query terms, reused across every candidate of one request.
pub struct QueryTerms {
	terms: Vec<(String, Regex)>,
}
impl QueryTerms {
	pub fn new(query: &str, min_term_chars: usize) -> Self {
		let terms = tokenize_query(query, min_term_chars)
			.into_iter()
			.filter_map(|term| {
				let pattern = format!(r"\b{}\b", regex::escape(&term));

				Regex::new(&pattern).ok().map(|re| (term, re))
			})
			.collect();

		Self { terms }
	}

	pub fn is_empty(&self) -> bool {
		self.terms.is_empty()
	}

	pub fn len(&self) -> usize {
		self.terms.len()
	}
}

/// Lower-cased, de-duplicated whitespace tokens with edge punctuation stripped.
pub fn tokenize_query(query: &str, min_term_chars: usize) -> Vec<String> {
	let mut out: Vec<String> = Vec::new();

	for raw in query.split_whitespace() {
		let token = raw.trim_matches(|ch: char| !ch.is_alphanumeric()).to_lowercase();

		if token.chars().count() < min_term_chars || out.contains(&token) {
			continue;
		}

		out.push(token);
	}

	out
}

/// Document keys are file stems; separators read as spaces.
pub fn title_text(document_key: &str) -> String {
	document_key.replace(['-', '_'], " ").to_lowercase()
}

/// Lexical boost of one chunk. Never negative.
pub fn keyword_boost(
	body: &str,
	document_key: &str,
	terms: &QueryTerms,
	weights: &BoostWeights,
) -> f32 {
	if terms.is_empty() {
		return 0.0;
	}

	let body = body.to_lowercase();
	let title = title_text(document_key);
	let mut boost = 0.0_f32;
	let mut title_terms = 0_usize;

	for (term, re) in &terms.terms {
		let body_hits = re.find_iter(&body).count();
		let title_hits = re.find_iter(&title).count();

		boost += body_hits as f32 * weights.body_term;
		boost += title_hits as f32 * weights.title_term;

		if title.contains(term.as_str()) {
			title_terms += 1;
		}
	}

	if title_terms >= 3 {
		boost += weights.title_comprehensive_bonus;
	} else if title_terms >= 2 {
		boost += weights.title_pair_bonus;
	}

	boost
}
