use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	pub search: Search,
	pub ranking: Ranking,
	pub content_types: ContentTypes,
	pub session: Session,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub qdrant: Qdrant,
}

#[derive(Debug, Deserialize)]
pub struct Qdrant {
	pub url: String,
	pub collection: String,
	pub vector_dim: u32,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct Search {
	/// Visibility profile applied when a request does not name one.
	#[serde(default = "default_profile")]
	pub default_profile: String,
	/// Ranked results emitted per page.
	pub page_size: u32,
	/// Length of the ranked list produced for one fresh query.
	pub max_results: u32,
	/// Raw neighbors requested per ranked result on the similarity path.
	pub overfetch_factor: u32,
	/// Upper bound on chunks scanned by the recency-direct path.
	pub recency_scan_limit: u32,
	/// The recency-direct path returns `limit * recency_result_factor` documents.
	pub recency_result_factor: u32,
}

#[derive(Debug, Deserialize)]
pub struct Ranking {
	pub min_term_chars: u32,
	pub body_term_weight: f32,
	pub title_term_weight: f32,
	/// Flat bonus when at least two distinct query terms appear in the title.
	pub title_pair_bonus: f32,
	/// Flat bonus when at least three distinct query terms appear in the title.
	pub title_comprehensive_bonus: f32,
	/// Adjusted distances closer than this are ranked as ties.
	pub relevance_tolerance: f32,
	pub title_similarity_threshold: f32,
}

#[derive(Debug, Deserialize)]
pub struct ContentTypes {
	/// Partition holding originally authored material.
	pub primary: String,
	/// Partition holding saved or clipped material.
	pub secondary: String,
}

#[derive(Debug, Deserialize)]
pub struct Session {
	pub ttl_seconds: u64,
	pub sweep_interval_seconds: u64,
}

fn default_profile() -> String {
	"public".to_string()
}
