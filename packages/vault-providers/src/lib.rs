pub mod embedding;

use color_eyre::{Result, eyre};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};

use vault_config::EmbeddingProviderConfig;

/// Bearer token plus the configured `default_headers`. Configured entries may override
/// `authorization`.
pub fn request_headers(cfg: &EmbeddingProviderConfig) -> Result<HeaderMap> {
	let mut headers = HeaderMap::with_capacity(cfg.default_headers.len() + 1);

	headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", cfg.api_key))?);

	for (name, value) in &cfg.default_headers {
		let Some(value) = value.as_str() else {
			return Err(eyre::eyre!("providers.embedding.default_headers.{name} must be a string."));
		};

		headers.insert(HeaderName::from_bytes(name.as_bytes())?, HeaderValue::from_str(value)?);
	}

	Ok(headers)
}
