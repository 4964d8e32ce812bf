use std::collections::HashMap;

use vault_domain::date;
use vault_storage::models::{Chunk, ChunkMetadata};

/// A chunk after lexical boosting.
#[derive(Clone, Debug)]
pub struct ScoredChunk {
	pub chunk: Chunk,
	pub boost: f32,
	/// `chunk.distance - boost`; may be negative.
	pub adjusted_distance: f32,
	/// Zero-based position in the store response.
	pub retrieval_rank: usize,
}
impl ScoredChunk {
	pub fn new(chunk: Chunk, boost: f32, retrieval_rank: usize) -> Self {
		let adjusted_distance = chunk.distance - boost;

		Self { chunk, boost, adjusted_distance, retrieval_rank }
	}

	/// Lower adjusted distance wins; ties go to the earlier retrieval.
	fn beats(&self, other: &Self) -> bool {
		self.adjusted_distance < other.adjusted_distance
			|| (self.adjusted_distance == other.adjusted_distance
				&& self.retrieval_rank < other.retrieval_rank)
	}
}

#[derive(Clone, Debug)]
pub struct DocumentGroup {
	pub document_key: String,
	/// Members ordered by raw distance; the first is the best raw match.
	pub chunks: Vec<ScoredChunk>,
	/// Index into `chunks` of the lowest adjusted distance.
	pub representative: usize,
	pub best_distance: f32,
	pub best_boost: f32,
	/// Metadata of the representative chunk.
	pub metadata: ChunkMetadata,
	/// Parsed `metadata.date`; unparsable dates are absent.
	pub timestamp: Option<i64>,
}
impl DocumentGroup {
	fn new(first: ScoredChunk) -> Self {
		let metadata = first.chunk.metadata.clone();
		let timestamp = date::document_timestamp(metadata.date.as_deref());

		Self {
			document_key: first.chunk.document_key.clone(),
			best_distance: first.adjusted_distance,
			best_boost: first.boost,
			representative: 0,
			chunks: vec![first],
			metadata,
			timestamp,
		}
	}

	pub fn representative_chunk(&self) -> &ScoredChunk {
		&self.chunks[self.representative]
	}

	pub fn has_source(&self) -> bool {
		self.metadata.has_source()
	}

	fn absorb(&mut self, chunk: ScoredChunk) {
		self.chunks.push(chunk);

		let idx = self.chunks.len() - 1;

		if self.chunks[idx].beats(&self.chunks[self.representative]) {
			self.representative = idx;
			self.best_distance = self.chunks[idx].adjusted_distance;
			self.best_boost = self.chunks[idx].boost;
			self.metadata = self.chunks[idx].chunk.metadata.clone();
			self.timestamp = date::document_timestamp(self.metadata.date.as_deref());
		}
	}

	fn order_members(&mut self) {
		let representative_rank = self.chunks[self.representative].retrieval_rank;

		self.chunks.sort_by(|a, b| {
			a.chunk
				.distance
				.total_cmp(&b.chunk.distance)
				.then_with(|| a.retrieval_rank.cmp(&b.retrieval_rank))
		});
		self.representative = self
			.chunks
			.iter()
			.position(|chunk| chunk.retrieval_rank == representative_rank)
			.unwrap_or(0);
	}
}

/// Folds chunks into one group per document key, in first-seen order.
pub fn group_by_document(chunks: Vec<ScoredChunk>) -> Vec<DocumentGroup> {
	let mut groups: Vec<DocumentGroup> = Vec::new();
	let mut index: HashMap<String, usize> = HashMap::new();

	for chunk in chunks {
		match index.get(&chunk.chunk.document_key) {
			Some(&idx) => groups[idx].absorb(chunk),
			None => {
				index.insert(chunk.chunk.document_key.clone(), groups.len());
				groups.push(DocumentGroup::new(chunk));
			},
		}
	}

	for group in &mut groups {
		group.order_members();
	}

	groups
}
