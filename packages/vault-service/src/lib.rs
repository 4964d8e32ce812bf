pub mod conversation;
pub mod pagination;
pub mod search;

mod error;

use std::{future::Future, pin::Pin, sync::Arc, time::Duration};

use serde::Serialize;
use tokio::task::JoinHandle;

pub use conversation::{TurnKind, TurnRequest, TurnResponse};
pub use error::{Error, Result};
pub use pagination::{Page, PaginationSession, SessionStore};
pub use search::{RankedResult, RetrievalPath, SearchRequest, SearchResponse};
use vault_config::{Config, EmbeddingProviderConfig};
use vault_providers::embedding;
use vault_storage::{
	models::{Chunk, ChunkFilter},
	qdrant::QdrantStore,
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>>;

	fn is_ready(&self) -> bool {
		true
	}
}

pub trait VectorStore
where
	Self: Send + Sync,
{
	fn query<'a>(
		&'a self,
		vector: Vec<f32>,
		filter: &'a ChunkFilter,
		limit: u32,
	) -> BoxFuture<'a, vault_storage::Result<Vec<Chunk>>>;

	fn is_ready(&self) -> bool;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub store: Arc<dyn VectorStore>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Health {
	pub embedding_ready: bool,
	pub store_ready: bool,
	pub default_profile: String,
	pub page_size: u32,
	pub max_results: u32,
	pub active_sessions: usize,
}

/// Explicit context for every query and conversation turn.
pub struct VaultService {
	pub cfg: Config,
	pub providers: Providers,
	pub sessions: Arc<SessionStore>,
}

struct DefaultProviders;

impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		Box::pin(embedding::embed(cfg, texts))
	}
}

impl VectorStore for QdrantStore {
	fn query<'a>(
		&'a self,
		vector: Vec<f32>,
		filter: &'a ChunkFilter,
		limit: u32,
	) -> BoxFuture<'a, vault_storage::Result<Vec<Chunk>>> {
		Box::pin(QdrantStore::query(self, vector, filter, limit))
	}

	fn is_ready(&self) -> bool {
		QdrantStore::is_ready(self)
	}
}

impl Providers {
	pub fn new(embedding: Arc<dyn EmbeddingProvider>, store: Arc<dyn VectorStore>) -> Self {
		Self { embedding, store }
	}

	/// HTTP embeddings in front of the given store.
	pub fn with_store(store: Arc<dyn VectorStore>) -> Self {
		Self { embedding: Arc::new(DefaultProviders), store }
	}
}

impl VaultService {
	pub fn new(cfg: Config, store: QdrantStore) -> Self {
		let providers = Providers::with_store(Arc::new(store));

		Self::with_providers(cfg, providers)
	}

	pub fn with_providers(cfg: Config, providers: Providers) -> Self {
		let ttl = Duration::from_secs(cfg.session.ttl_seconds);

		Self { cfg, providers, sessions: Arc::new(SessionStore::new(ttl)) }
	}

	pub fn health(&self) -> Health {
		Health {
			embedding_ready: self.providers.embedding.is_ready(),
			store_ready: self.providers.store.is_ready(),
			default_profile: self.cfg.search.default_profile.clone(),
			page_size: self.cfg.search.page_size,
			max_results: self.cfg.search.max_results,
			active_sessions: self.sessions.len(),
		}
	}

	/// Starts the periodic expiry sweep on the current tokio runtime.
	pub fn spawn_sweeper(&self) -> JoinHandle<()> {
		let period = Duration::from_secs(self.cfg.session.sweep_interval_seconds);

		pagination::spawn_sweeper(self.sessions.clone(), period)
	}
}
