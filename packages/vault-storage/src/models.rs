use serde::{Deserialize, Serialize};

/// Metadata copied onto every chunk of a document at ingestion time.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ChunkMetadata {
	pub content_type: String,
	/// Canonical URL of the original material, when the document names one.
	pub source: Option<String>,
	/// Raw front-matter date; may be unparsable.
	pub date: Option<String>,
	pub directory: String,
	pub file_path: String,
	/// Visibility profile the document belongs to.
	pub profile: String,
}
impl ChunkMetadata {
	pub fn has_source(&self) -> bool {
		self.source.as_deref().map(|source| !source.trim().is_empty()).unwrap_or(false)
	}

	pub fn has_date(&self) -> bool {
		self.date.as_deref().map(|date| !date.is_empty()).unwrap_or(false)
	}
}

/// One retrieved passage. `distance` is lower for closer matches.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Chunk {
	pub id: String,
	pub text: String,
	/// Source file name without extension; the unit of grouping and ranking.
	pub document_key: String,
	pub distance: f32,
	pub metadata: ChunkMetadata,
}

/// Conjunction of equality tests applied by the vector store.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ChunkFilter {
	pub profile: String,
	pub content_type: Option<String>,
	/// Only chunks with a non-empty date string.
	pub require_date: bool,
}
impl ChunkFilter {
	pub fn for_profile(profile: impl Into<String>) -> Self {
		Self { profile: profile.into(), content_type: None, require_date: false }
	}

	pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
		self.content_type = Some(content_type.into());

		self
	}

	pub fn with_date(mut self) -> Self {
		self.require_date = true;

		self
	}

	pub fn matches(&self, metadata: &ChunkMetadata) -> bool {
		if metadata.profile != self.profile {
			return false;
		}
		if let Some(content_type) = self.content_type.as_deref()
			&& metadata.content_type != content_type
		{
			return false;
		}

		!self.require_date || metadata.has_date()
	}
}
