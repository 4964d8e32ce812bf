use std::time::Duration;

use color_eyre::{Result, eyre};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use vault_config::EmbeddingProviderConfig;

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
	model: &'a str,
	input: &'a [String],
	dimensions: u32,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
	data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
	/// Some providers omit it; position in `data` is used instead.
	#[serde(default)]
	index: Option<usize>,
	embedding: Vec<f32>,
}

/// Embeds `texts` through an OpenAI-compatible endpoint. Vectors come back in input order, one
/// per text.
pub async fn embed(cfg: &EmbeddingProviderConfig, texts: &[String]) -> Result<Vec<Vec<f32>>> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let request = EmbeddingRequest { model: &cfg.model, input: texts, dimensions: cfg.dimensions };
	let response = client
		.post(format!("{}{}", cfg.api_base, cfg.path))
		.headers(crate::request_headers(cfg)?)
		.json(&request)
		.send()
		.await?
		.error_for_status()?;
	let body: serde_json::Value = response.json().await?;

	into_vectors(body, texts.len())
}

fn into_vectors(body: serde_json::Value, expected: usize) -> Result<Vec<Vec<f32>>> {
	let decoded: EmbeddingResponse = serde_json::from_value(body)
		.map_err(|err| eyre::eyre!("Malformed embedding response: {err}."))?;
	let mut slots: Vec<Option<Vec<f32>>> = vec![None; expected];

	for (position, item) in decoded.data.into_iter().enumerate() {
		let index = item.index.unwrap_or(position);
		let Some(slot) = slots.get_mut(index) else {
			return Err(eyre::eyre!(
				"Embedding index {index} is out of range for {expected} inputs."
			));
		};

		if slot.replace(item.embedding).is_some() {
			return Err(eyre::eyre!("Embedding index {index} was returned twice."));
		}
	}

	slots
		.into_iter()
		.enumerate()
		.map(|(index, slot)| {
			slot.ok_or_else(|| eyre::eyre!("Embedding for input {index} is missing."))
		})
		.collect()
}
