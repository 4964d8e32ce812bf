use vault_storage::models::Chunk;

use super::{
	grouping::{DocumentGroup, ScoredChunk},
	policy,
	text::{self, BoostWeights, QueryTerms},
};

/// Boosts each chunk against the query terms, keeping store order as the retrieval rank.
pub fn score_chunks(
	chunks: Vec<Chunk>,
	terms: &QueryTerms,
	weights: &BoostWeights,
) -> Vec<ScoredChunk> {
	chunks
		.into_iter()
		.enumerate()
		.map(|(rank, chunk)| {
			let boost = text::keyword_boost(&chunk.text, &chunk.document_key, terms, weights);

			ScoredChunk::new(chunk, boost, rank)
		})
		.collect()
}

/// Newest first, unparsable dates last, first-seen order among equal dates.
pub fn sort_by_date(mut groups: Vec<DocumentGroup>) -> Vec<DocumentGroup> {
	groups.sort_by(|lhs, rhs| policy::cmp_date_desc(lhs.timestamp, rhs.timestamp));

	groups
}
