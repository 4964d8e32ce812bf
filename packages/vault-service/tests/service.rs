use std::{
	sync::{
		Arc, Mutex,
		atomic::{AtomicU32, Ordering},
	},
	time::{Duration, Instant},
};

use serde_json::Map;

use vault_config::{
	Config, ContentTypes, EmbeddingProviderConfig, Providers as ProviderSection, Qdrant, Ranking,
	Search, Service, Session, Storage,
};
use vault_service::{
	BoxFuture, EmbeddingProvider, Error, Providers, RetrievalPath, SearchRequest, TurnKind,
	TurnRequest, TurnResponse, VaultService, VectorStore,
};
use vault_storage::models::{Chunk, ChunkFilter, ChunkMetadata};

const DIM: u32 = 4;

struct FakeEmbedding {
	ready: bool,
	dim: usize,
	inputs: Mutex<Vec<String>>,
}
impl FakeEmbedding {
	fn new() -> Self {
		Self { ready: true, dim: DIM as usize, inputs: Mutex::new(Vec::new()) }
	}

	fn inputs(&self) -> Vec<String> {
		self.inputs.lock().expect("lock poisoned").clone()
	}
}
impl EmbeddingProvider for FakeEmbedding {
	fn embed<'a>(
		&'a self,
		_cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		self.inputs.lock().expect("lock poisoned").extend(texts.iter().cloned());

		let vectors = vec![vec![0.5; self.dim]; texts.len()];

		Box::pin(async move { Ok(vectors) })
	}

	fn is_ready(&self) -> bool {
		self.ready
	}
}

/// Returns matching chunks in ascending distance, keeping insertion order among equals.
struct MemoryStore {
	ready: bool,
	chunks: Vec<Chunk>,
	last_limit: AtomicU32,
	last_filter: Mutex<Option<ChunkFilter>>,
}
impl MemoryStore {
	fn new(chunks: Vec<Chunk>) -> Self {
		Self { ready: true, chunks, last_limit: AtomicU32::new(0), last_filter: Mutex::new(None) }
	}

	fn last_filter(&self) -> Option<ChunkFilter> {
		self.last_filter.lock().expect("lock poisoned").clone()
	}
}
impl VectorStore for MemoryStore {
	fn query<'a>(
		&'a self,
		_vector: Vec<f32>,
		filter: &'a ChunkFilter,
		limit: u32,
	) -> BoxFuture<'a, vault_storage::Result<Vec<Chunk>>> {
		self.last_limit.store(limit, Ordering::SeqCst);
		*self.last_filter.lock().expect("lock poisoned") = Some(filter.clone());

		let mut hits: Vec<Chunk> =
			self.chunks.iter().filter(|chunk| filter.matches(&chunk.metadata)).cloned().collect();

		hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
		hits.truncate(limit as usize);

		Box::pin(async move { Ok(hits) })
	}

	fn is_ready(&self) -> bool {
		self.ready
	}
}

fn test_config() -> Config {
	Config {
		service: Service { log_level: "info".to_string() },
		storage: Storage {
			qdrant: Qdrant {
				url: "http://127.0.0.1:6334".to_string(),
				collection: "vault_chunks".to_string(),
				vector_dim: DIM,
			},
		},
		providers: ProviderSection {
			embedding: EmbeddingProviderConfig {
				provider_id: "test".to_string(),
				api_base: "http://127.0.0.1:1".to_string(),
				api_key: "test-key".to_string(),
				path: "/embeddings".to_string(),
				model: "test".to_string(),
				dimensions: DIM,
				timeout_ms: 1_000,
				default_headers: Map::new(),
			},
		},
		search: Search {
			default_profile: "public".to_string(),
			page_size: 5,
			max_results: 20,
			overfetch_factor: 10,
			recency_scan_limit: 2_000,
			recency_result_factor: 4,
		},
		ranking: Ranking {
			min_term_chars: 3,
			body_term_weight: 0.2,
			title_term_weight: 0.5,
			title_pair_bonus: 0.5,
			title_comprehensive_bonus: 1.0,
			relevance_tolerance: 0.1,
			title_similarity_threshold: 0.8,
		},
		content_types: ContentTypes {
			primary: "blog".to_string(),
			secondary: "clippings".to_string(),
		},
		session: Session { ttl_seconds: 600, sweep_interval_seconds: 60 },
	}
}

struct Doc<'a> {
	key: &'a str,
	content_type: &'a str,
	date: Option<&'a str>,
	source: Option<&'a str>,
	distance: f32,
}
impl<'a> Doc<'a> {
	fn new(key: &'a str, content_type: &'a str, distance: f32) -> Self {
		Self { key, content_type, date: None, source: None, distance }
	}

	fn dated(mut self, date: &'a str) -> Self {
		self.date = Some(date);

		self
	}

	fn sourced(mut self, source: &'a str) -> Self {
		self.source = Some(source);

		self
	}

	fn chunk(&self) -> Chunk {
		Chunk {
			id: format!("{}#0", self.key),
			text: "Plain passage.".to_string(),
			document_key: self.key.to_string(),
			distance: self.distance,
			metadata: ChunkMetadata {
				content_type: self.content_type.to_string(),
				source: self.source.map(str::to_string),
				date: self.date.map(str::to_string),
				directory: self.content_type.to_string(),
				file_path: format!("{}/{}.md", self.content_type, self.key),
				profile: "public".to_string(),
			},
		}
	}
}

struct Harness {
	service: VaultService,
	embedding: Arc<FakeEmbedding>,
	store: Arc<MemoryStore>,
}

fn harness_with(embedding: FakeEmbedding, store: MemoryStore) -> Harness {
	let embedding = Arc::new(embedding);
	let store = Arc::new(store);
	let providers = Providers::new(embedding.clone(), store.clone());

	Harness { service: VaultService::with_providers(test_config(), providers), embedding, store }
}

fn harness(docs: &[Doc<'_>]) -> Harness {
	harness_with(FakeEmbedding::new(), MemoryStore::new(docs.iter().map(Doc::chunk).collect()))
}

fn search(query: &str) -> SearchRequest {
	SearchRequest { query: query.to_string(), ..Default::default() }
}

fn turn(session_id: &str, message: &str) -> TurnRequest {
	TurnRequest { session_id: session_id.to_string(), message: message.to_string(), profile: None }
}

fn keys(items: &[vault_service::RankedResult]) -> Vec<String> {
	items.iter().map(|item| item.document_key.clone()).collect()
}

const TWELVE: [&str; 12] = [
	"apple", "bridge", "canyon", "dolphin", "ember", "falcon", "glacier", "harbor", "island",
	"jungle", "kettle", "lantern",
];

fn twelve_documents() -> Vec<Doc<'static>> {
	TWELVE.iter().enumerate().map(|(idx, key)| Doc::new(key, "blog", 0.01 * idx as f32)).collect()
}

#[tokio::test]
async fn recent_blog_posts_are_ordered_by_date_alone() {
	let h = harness(&[
		Doc::new("blog-roundup", "blog", 0.05).dated("2025-01-01"),
		Doc::new("gardening-blog", "blog", 0.90).dated("2025-03-01"),
		Doc::new("kubernetes-notes", "blog", 0.40).dated("2025-02-01"),
		Doc::new("saved-recipe", "clippings", 0.01).dated("2025-04-01"),
	]);
	let response = h.service.search(search("recent blog posts")).await.expect("search failed");

	assert_eq!(response.path, RetrievalPath::RecencyDirect);
	assert_eq!(keys(&response.items), vec!["gardening-blog", "kubernetes-notes", "blog-roundup"]);
	assert_eq!(h.embedding.inputs(), vec!["recent blog articles".to_string()]);
	assert_eq!(
		h.store.last_filter(),
		Some(ChunkFilter::for_profile("public").with_content_type("blog").with_date())
	);
	assert_eq!(h.store.last_limit.load(Ordering::SeqCst), 2_000);
}

#[tokio::test]
async fn near_duplicate_keeps_the_sourced_document() {
	let docs = [
		Doc::new("AI and the Future of Work", "clippings", 0.2),
		Doc::new("AI and the Future of Work ", "blog", 0.2).sourced("https://example.com/ai-work"),
	];
	let h = harness(&docs);
	let response = h.service.search(search("future of work")).await.expect("search failed");

	assert_eq!(keys(&response.items), vec!["AI and the Future of Work "]);
}

#[tokio::test]
async fn dedup_survivor_does_not_depend_on_discovery_order() {
	let forward = harness(&[
		Doc::new("rust-ownership", "clippings", 0.2),
		Doc::new("rust-ownership!", "blog", 0.2),
	]);
	let backward = harness(&[
		Doc::new("rust-ownership!", "blog", 0.2),
		Doc::new("rust-ownership", "clippings", 0.2),
	]);
	let lhs = forward.service.search(search("ownership")).await.expect("search failed");
	let rhs = backward.service.search(search("ownership")).await.expect("search failed");

	assert_eq!(keys(&lhs.items), vec!["rust-ownership!"]);
	assert_eq!(keys(&lhs.items), keys(&rhs.items));
}

#[tokio::test]
async fn content_type_intent_never_returns_other_types() {
	let h = harness(&[
		Doc::new("espresso-guide", "blog", 0.05),
		Doc::new("espresso-ratios", "clippings", 0.30),
		Doc::new("espresso-grinders", "clippings", 0.35),
		Doc::new("espresso-journal", "notes", 0.10),
	]);
	let response =
		h.service.search(search("clippings about espresso")).await.expect("search failed");

	assert_eq!(response.path, RetrievalPath::Similarity);
	assert!(!response.items.is_empty());
	assert!(response.items.iter().all(|item| item.metadata.content_type == "clippings"));
}

#[tokio::test]
async fn similarity_path_overfetches_and_truncates() {
	let h = harness(&twelve_documents());
	let response = h
		.service
		.search(SearchRequest { limit: Some(3), ..search("anything at all") })
		.await
		.expect("search failed");

	assert_eq!(h.store.last_limit.load(Ordering::SeqCst), 30);
	assert_eq!(response.items.len(), 3);
	assert_eq!(h.store.last_filter(), Some(ChunkFilter::for_profile("public")));
}

#[tokio::test]
async fn forced_date_sort_overrides_relevance() {
	let h = harness(&[
		Doc::new("alpha", "blog", 0.05).dated("2024-01-01"),
		Doc::new("omega", "blog", 0.90).dated("2025-01-01"),
	]);
	let relevance = h.service.search(search("something")).await.expect("search failed");
	let dated = h
		.service
		.search(SearchRequest { sort_by_date: true, ..search("something") })
		.await
		.expect("search failed");

	assert_eq!(keys(&relevance.items), vec!["alpha", "omega"]);
	assert_eq!(keys(&dated.items), vec!["omega", "alpha"]);
}

#[tokio::test]
async fn title_matches_lift_adjusted_similarity() {
	let h = harness(&[
		Doc::new("notes", "blog", 0.30),
		Doc::new("sourdough-starter", "blog", 0.45),
	]);
	let response =
		h.service.search(search("sourdough starter tips")).await.expect("search failed");

	assert_eq!(keys(&response.items), vec!["sourdough-starter", "notes"]);

	let top = &response.items[0];

	assert!(top.boost > 0.0);
	assert!((top.adjusted_distance - (top.distance - top.boost)).abs() < 1e-6);
	assert!((top.similarity - (1.0 - top.adjusted_distance)).abs() < 1e-6);
}

#[tokio::test]
async fn pages_of_five_cover_twelve_documents_once() {
	let h = harness(&twelve_documents());
	let ranked = h.service.search(search("tell me about places")).await.expect("search failed");
	let first = h.service.turn(turn("s1", "tell me about places")).await.expect("turn failed");

	assert_eq!(first.kind, TurnKind::Fresh);
	assert_eq!((first.items.len(), first.remaining_count, first.more_available), (5, 7, true));

	let second = h.service.turn(turn("s1", "yes")).await.expect("turn failed");

	assert_eq!(second.kind, TurnKind::Continuation);
	assert_eq!(second.query, "tell me about places");
	assert_eq!((second.items.len(), second.remaining_count), (5, 2));

	let third = h.service.turn(turn("s1", "show more")).await.expect("turn failed");

	assert_eq!((third.items.len(), third.remaining_count, third.more_available), (2, 0, false));
	assert!(!h.service.sessions.contains("s1"));

	let served: Vec<String> = [&first, &second, &third]
		.iter()
		.flat_map(|page: &&TurnResponse| keys(&page.items))
		.collect();

	assert_eq!(served, keys(&ranked.items));
}

#[tokio::test]
async fn negative_reply_discards_remainder() {
	let h = harness(&twelve_documents());

	h.service.turn(turn("s1", "tell me about places")).await.expect("turn failed");

	let declined = h.service.turn(turn("s1", "no thanks")).await.expect("turn failed");

	assert_eq!(declined.kind, TurnKind::Declined);
	assert!(declined.items.is_empty());
	assert!(!declined.more_available);
	assert!(!h.service.sessions.contains("s1"));

	let after = h.service.turn(turn("s1", "yes")).await.expect("turn failed");

	assert_eq!(after.kind, TurnKind::Fresh);
	assert_eq!(after.query, "yes");
}

#[tokio::test]
async fn continuation_without_session_is_a_fresh_query() {
	let h = harness(&twelve_documents());
	let response = h.service.turn(turn("unknown", "sure")).await.expect("turn failed");

	assert_eq!(response.kind, TurnKind::Fresh);
	assert_eq!(response.query, "sure");
	assert_eq!(response.items.len(), 5);
}

#[tokio::test]
async fn sessions_are_isolated_per_identifier() {
	let h = harness(&twelve_documents());

	h.service.turn(turn("a", "tell me about places")).await.expect("turn failed");
	h.service.turn(turn("b", "tell me about places")).await.expect("turn failed");
	h.service.turn(turn("a", "no")).await.expect("turn failed");

	let other = h.service.turn(turn("b", "yes")).await.expect("turn failed");

	assert_eq!(other.kind, TurnKind::Continuation);
	assert_eq!(other.remaining_count, 2);
}

#[tokio::test]
async fn single_page_query_clears_prior_session() {
	let mut docs = twelve_documents();

	docs.push(Doc::new("mushroom-foraging", "clippings", 0.5));

	let h = harness(&docs);

	h.service.turn(turn("s1", "tell me about places")).await.expect("turn failed");

	let small =
		h.service.turn(turn("s1", "saved mushroom clippings")).await.expect("turn failed");

	assert_eq!(small.kind, TurnKind::Fresh);
	assert_eq!(keys(&small.items), vec!["mushroom-foraging"]);
	assert!(!small.more_available);
	assert!(!h.service.sessions.contains("s1"));
}

#[tokio::test]
async fn empty_results_are_not_an_error() {
	let h = harness(&[]);
	let response = h.service.turn(turn("s1", "anything here")).await.expect("turn failed");

	assert!(response.items.is_empty());
	assert!(!response.more_available);
	assert_eq!(response.remaining_count, 0);
}

#[tokio::test]
async fn expired_sessions_are_swept() {
	let h = harness(&twelve_documents());

	h.service.turn(turn("s1", "tell me about places")).await.expect("turn failed");

	let ttl = h.service.sessions.ttl();

	assert_eq!(h.service.sessions.purge_expired(Instant::now() + ttl - Duration::from_secs(5)), 0);
	assert!(h.service.sessions.contains("s1"));
	assert_eq!(h.service.sessions.purge_expired(Instant::now() + ttl + Duration::from_secs(5)), 1);

	let after = h.service.turn(turn("s1", "yes")).await.expect("turn failed");

	assert_eq!(after.kind, TurnKind::Fresh);
}

#[tokio::test]
async fn stale_session_is_neither_continued_nor_declined() {
	let h = harness(&twelve_documents());
	let ranked = h.service.search(search("tell me about places")).await.expect("search failed");
	let stale_at = Instant::now()
		.checked_sub(h.service.sessions.ttl() + Duration::from_secs(1))
		.expect("clock too early");

	h.service.sessions.replace("s1", "old query", ranked.items.clone(), stale_at);
	h.service.sessions.replace("s2", "old query", ranked.items, stale_at);

	assert_eq!(h.service.health().active_sessions, 0);

	let declined = h.service.turn(turn("s1", "no")).await.expect("turn failed");

	assert_eq!(declined.kind, TurnKind::Fresh);
	assert_eq!(declined.query, "no");

	let continued = h.service.turn(turn("s2", "yes")).await.expect("turn failed");

	assert_eq!(continued.kind, TurnKind::Fresh);
	assert_eq!(continued.query, "yes");
}

#[tokio::test]
async fn unready_collaborators_are_reported_distinctly() {
	let store_down = harness_with(
		FakeEmbedding::new(),
		MemoryStore { ready: false, ..MemoryStore::new(Vec::new()) },
	);
	let embedding_down = harness_with(
		FakeEmbedding { ready: false, ..FakeEmbedding::new() },
		MemoryStore::new(Vec::new()),
	);

	for h in [store_down, embedding_down] {
		let err = h.service.search(search("anything")).await.expect_err("expected not ready");

		assert!(matches!(err, Error::NotReady { .. }), "unexpected error: {err}");
		assert!(h.embedding.inputs().is_empty());
	}
}

#[tokio::test]
async fn wrong_embedding_dimension_is_a_provider_error() {
	let h = harness_with(
		FakeEmbedding { dim: 3, ..FakeEmbedding::new() },
		MemoryStore::new(Vec::new()),
	);
	let err = h.service.search(search("anything")).await.expect_err("expected failure");

	assert!(matches!(err, Error::Provider { .. }), "unexpected error: {err}");
}

#[tokio::test]
async fn rejects_empty_query_and_zero_limit() {
	let h = harness(&[]);
	let empty = h.service.search(search("   ")).await.expect_err("expected invalid request");
	let zero = h
		.service
		.search(SearchRequest { limit: Some(0), ..search("anything") })
		.await
		.expect_err("expected invalid request");

	assert!(matches!(empty, Error::InvalidRequest { .. }));
	assert!(matches!(zero, Error::InvalidRequest { .. }));
}

#[tokio::test]
async fn health_reports_readiness_and_sessions() {
	let h = harness(&twelve_documents());

	h.service.turn(turn("s1", "tell me about places")).await.expect("turn failed");

	let health = h.service.health();

	assert!(health.embedding_ready && health.store_ready);
	assert_eq!(health.default_profile, "public");
	assert_eq!((health.page_size, health.max_results, health.active_sessions), (5, 20, 1));
}
