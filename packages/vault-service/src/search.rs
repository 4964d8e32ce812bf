pub mod ranking;

use serde::{Deserialize, Serialize};

use crate::{Error, Result, VaultService};
use ranking::{BoostWeights, DocumentGroup, QueryTerms, RankPolicy};
use vault_config::ContentTypes;
use vault_domain::intent::{self, ContentTypeIntent, QueryIntent};
use vault_storage::models::{ChunkFilter, ChunkMetadata};

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct SearchRequest {
	pub query: String,
	/// Defaults to `search.default_profile`.
	#[serde(default)]
	pub profile: Option<String>,
	/// Defaults to `search.max_results`.
	#[serde(default)]
	pub limit: Option<u32>,
	/// Apply date priority even without a recency signal in the query.
	#[serde(default)]
	pub sort_by_date: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalPath {
	Similarity,
	RecencyDirect,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RankedResult {
	pub document_key: String,
	pub chunk_id: String,
	pub text: String,
	pub metadata: ChunkMetadata,
	/// `1 - adjusted_distance`.
	pub similarity: f32,
	pub distance: f32,
	pub adjusted_distance: f32,
	pub boost: f32,
}
impl RankedResult {
	fn from_group(group: DocumentGroup) -> Self {
		let DocumentGroup {
			document_key,
			mut chunks,
			representative,
			best_distance,
			best_boost,
			metadata,
			..
		} = group;
		let best = chunks.swap_remove(representative);

		Self {
			document_key,
			chunk_id: best.chunk.id,
			text: best.chunk.text,
			metadata,
			similarity: 1.0 - best_distance,
			distance: best.chunk.distance,
			adjusted_distance: best_distance,
			boost: best_boost,
		}
	}
}

#[derive(Clone, Debug, Serialize)]
pub struct SearchResponse {
	pub query: String,
	pub intent: QueryIntent,
	pub path: RetrievalPath,
	pub items: Vec<RankedResult>,
}

/// Configured partition name for a content-type intent.
pub fn partition_name(intent: ContentTypeIntent, content_types: &ContentTypes) -> Option<&str> {
	match intent {
		ContentTypeIntent::None => None,
		ContentTypeIntent::Saved => Some(content_types.secondary.as_str()),
		ContentTypeIntent::Authored => Some(content_types.primary.as_str()),
	}
}

impl VaultService {
	pub async fn search(&self, req: SearchRequest) -> Result<SearchResponse> {
		let query = req.query.trim();

		if query.is_empty() {
			return Err(Error::InvalidRequest { message: "query must not be empty.".to_string() });
		}

		let limit = req.limit.unwrap_or(self.cfg.search.max_results);

		if limit == 0 {
			return Err(Error::InvalidRequest {
				message: "limit must be greater than zero.".to_string(),
			});
		}

		let profile = req
			.profile
			.as_deref()
			.map(str::trim)
			.filter(|profile| !profile.is_empty())
			.unwrap_or(self.cfg.search.default_profile.as_str());

		self.ensure_ready()?;

		let intent = intent::classify_query(query);
		let content_type = partition_name(intent.content_type, &self.cfg.content_types);

		tracing::info!(
			profile,
			limit,
			recency = intent.recency,
			content_type = intent.content_type.as_str(),
			"Query classified."
		);

		let (path, items) = match content_type {
			Some(content_type) if intent.wants_recent_partition() => (
				RetrievalPath::RecencyDirect,
				self.recent_by_type(profile, content_type, limit).await?,
			),
			_ => (
				RetrievalPath::Similarity,
				self.similarity_search(query, profile, limit, &intent, req.sort_by_date).await?,
			),
		};

		tracing::info!(path = ?path, results = items.len(), "Search finished.");

		Ok(SearchResponse { query: query.to_string(), intent, path, items })
	}

	fn ensure_ready(&self) -> Result<()> {
		if !self.providers.embedding.is_ready() {
			return Err(Error::NotReady { component: "Embedding provider".to_string() });
		}
		if !self.providers.store.is_ready() {
			return Err(Error::NotReady { component: "Vector store".to_string() });
		}

		Ok(())
	}

	async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
		let cfg = &self.cfg.providers.embedding;
		let input = vec![text.to_string()];
		let mut vectors = self.providers.embedding.embed(cfg, &input).await?;
		let Some(vector) = vectors.pop() else {
			return Err(Error::Provider {
				message: "Embedding provider returned no vectors.".to_string(),
			});
		};

		if vector.len() != self.cfg.storage.qdrant.vector_dim as usize {
			return Err(Error::Provider {
				message: format!(
					"Embedding has {} dimensions; expected {}.",
					vector.len(),
					self.cfg.storage.qdrant.vector_dim
				),
			});
		}

		Ok(vector)
	}

	async fn similarity_search(
		&self,
		query: &str,
		profile: &str,
		limit: u32,
		intent: &QueryIntent,
		sort_by_date: bool,
	) -> Result<Vec<RankedResult>> {
		let ranking_cfg = &self.cfg.ranking;
		let content_types = &self.cfg.content_types;
		let vector = self.embed_query(query).await?;
		let filter = ChunkFilter::for_profile(profile);
		let fetch_limit = limit.saturating_mul(self.cfg.search.overfetch_factor);
		let chunks = self.providers.store.query(vector, &filter, fetch_limit).await?;
		let weights = BoostWeights::from(ranking_cfg);
		let terms = QueryTerms::new(query, weights.min_term_chars);
		let candidate_count = chunks.len();
		let scored = ranking::score_chunks(chunks, &terms, &weights);
		let groups = ranking::group_by_document(scored);
		let group_count = groups.len();
		let (groups, decisions) = ranking::dedupe_groups(
			groups,
			content_types.primary.as_str(),
			ranking_cfg.title_similarity_threshold,
		);
		let policy = RankPolicy {
			content_type: partition_name(intent.content_type, content_types),
			date_priority: intent.recency || sort_by_date,
			relevance_tolerance: ranking_cfg.relevance_tolerance,
			primary: content_types.primary.as_str(),
			secondary: content_types.secondary.as_str(),
		};
		let ranked = ranking::rank_groups(groups, &policy, limit as usize);

		tracing::debug!(
			fetch_limit,
			candidates = candidate_count,
			terms = terms.len(),
			documents = group_count,
			dropped = decisions.len(),
			ranked = ranked.len(),
			"Similarity retrieval ranked."
		);

		Ok(ranked.into_iter().map(RankedResult::from_group).collect())
	}

	async fn recent_by_type(
		&self,
		profile: &str,
		content_type: &str,
		limit: u32,
	) -> Result<Vec<RankedResult>> {
		let probe = format!("recent {content_type} articles");
		let vector = self.embed_query(&probe).await?;
		let filter = ChunkFilter::for_profile(profile).with_content_type(content_type).with_date();
		let chunks =
			self.providers.store.query(vector, &filter, self.cfg.search.recency_scan_limit).await?;
		let candidate_count = chunks.len();
		let scored = chunks
			.into_iter()
			.enumerate()
			.map(|(rank, chunk)| ranking::ScoredChunk::new(chunk, 0.0, rank))
			.collect();
		let mut groups = ranking::sort_by_date(ranking::group_by_document(scored));
		let keep = limit.saturating_mul(self.cfg.search.recency_result_factor) as usize;

		groups.truncate(keep);

		tracing::debug!(
			content_type,
			candidates = candidate_count,
			documents = groups.len(),
			"Recency-direct retrieval sorted by date."
		);

		Ok(groups.into_iter().map(RankedResult::from_group).collect())
	}
}
