pub const DENSE_VECTOR_NAME: &str = "dense";

use std::{
	collections::HashMap,
	sync::atomic::{AtomicBool, Ordering},
};

use qdrant_client::qdrant::{
	Condition, Filter, PointId, Query, QueryPointsBuilder, ScoredPoint, Value,
	point_id::PointIdOptions, value::Kind,
};

use crate::{
	Error, Result,
	models::{Chunk, ChunkFilter, ChunkMetadata},
};

pub struct QdrantStore {
	pub client: qdrant_client::Qdrant,
	pub collection: String,
	pub vector_dim: u32,
	ready: AtomicBool,
}
impl QdrantStore {
	pub fn new(cfg: &vault_config::Qdrant) -> Result<Self> {
		let client = qdrant_client::Qdrant::from_url(&cfg.url).build()?;

		Ok(Self {
			client,
			collection: cfg.collection.clone(),
			vector_dim: cfg.vector_dim,
			ready: AtomicBool::new(false),
		})
	}

	/// Checks that the collection exists and marks the store ready.
	pub async fn ensure_ready(&self) -> Result<()> {
		let exists = self.client.collection_exists(&self.collection).await?;

		self.ready.store(exists, Ordering::Release);

		if !exists {
			return Err(Error::NotReady(format!(
				"Qdrant collection {:?} does not exist.",
				self.collection
			)));
		}

		tracing::info!(collection = %self.collection, "Vector store ready.");

		Ok(())
	}

	pub fn is_ready(&self) -> bool {
		self.ready.load(Ordering::Acquire)
	}

	/// Nearest-neighbour query. Returned chunks carry `distance = 1 - cosine score`.
	pub async fn query(
		&self,
		vector: Vec<f32>,
		filter: &ChunkFilter,
		limit: u32,
	) -> Result<Vec<Chunk>> {
		if !self.is_ready() {
			return Err(Error::NotReady("Vector store is not initialized.".to_string()));
		}
		if vector.len() != self.vector_dim as usize {
			return Err(Error::InvalidPayload(format!(
				"Query vector has {} dimensions; collection expects {}.",
				vector.len(),
				self.vector_dim
			)));
		}

		let search = QueryPointsBuilder::new(self.collection.clone())
			.query(Query::new_nearest(vector))
			.using(DENSE_VECTOR_NAME)
			.filter(build_filter(filter))
			.with_payload(true)
			.limit(limit as u64);
		let response = self.client.query(search).await?;

		Ok(decode_points(&response.result))
	}
}

pub fn build_filter(filter: &ChunkFilter) -> Filter {
	let mut must = vec![Condition::matches("profile", filter.profile.clone())];

	if let Some(content_type) = filter.content_type.as_ref() {
		must.push(Condition::matches("content_type", content_type.clone()));
	}

	let must_not = if filter.require_date {
		vec![
			Condition::matches("date", String::new()),
			Condition::is_empty("date"),
			Condition::is_null("date"),
		]
	} else {
		Vec::new()
	};

	Filter { must, should: Vec::new(), must_not, min_should: None }
}

/// Converts scored points into chunks, skipping points that lack a document key or text.
pub fn decode_points(points: &[ScoredPoint]) -> Vec<Chunk> {
	let mut out = Vec::with_capacity(points.len());

	for point in points {
		let id = point
			.id
			.as_ref()
			.and_then(point_id_to_string)
			.or_else(|| payload_string(&point.payload, "id"))
			.unwrap_or_default();
		let Some(document_key) = payload_string(&point.payload, "file") else {
			tracing::warn!(chunk_id = %id, "Chunk missing file.");

			continue;
		};
		let Some(text) = payload_string(&point.payload, "text") else {
			tracing::warn!(chunk_id = %id, "Chunk missing text.");

			continue;
		};
		let metadata = ChunkMetadata {
			content_type: payload_string(&point.payload, "content_type").unwrap_or_default(),
			source: payload_string(&point.payload, "source").filter(|s| !s.is_empty()),
			date: payload_string(&point.payload, "date").filter(|s| !s.is_empty()),
			directory: payload_string(&point.payload, "directory").unwrap_or_default(),
			file_path: payload_string(&point.payload, "file_path").unwrap_or_default(),
			profile: payload_string(&point.payload, "profile").unwrap_or_default(),
		};

		out.push(Chunk { id, text, document_key, distance: 1.0 - point.score, metadata });
	}

	out
}

pub fn point_id_to_string(point_id: &PointId) -> Option<String> {
	match &point_id.point_id_options {
		Some(PointIdOptions::Uuid(id)) => Some(id.clone()),
		Some(PointIdOptions::Num(id)) => Some(id.to_string()),
		None => None,
	}
}

pub fn payload_string(payload: &HashMap<String, Value>, key: &str) -> Option<String> {
	let value = payload.get(key)?;

	match &value.kind {
		Some(Kind::StringValue(text)) => Some(text.to_string()),
		_ => None,
	}
}
