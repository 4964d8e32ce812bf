mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, ContentTypes, EmbeddingProviderConfig, Providers, Qdrant, Ranking, Search, Service,
	Session, Storage,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	parse(&raw).map_err(|err| match err {
		Error::ParseConfig { source, .. } => Error::ParseConfig { path: path.to_path_buf(), source },
		other => other,
	})
}

pub fn parse(raw: &str) -> Result<Config> {
	let mut cfg: Config = toml::from_str(raw)
		.map_err(|err| Error::ParseConfig { path: Default::default(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.storage.qdrant.collection.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.qdrant.collection must be non-empty.".to_string(),
		});
	}
	if cfg.storage.qdrant.vector_dim == 0 {
		return Err(Error::Validation {
			message: "storage.qdrant.vector_dim must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions != cfg.storage.qdrant.vector_dim {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must match storage.qdrant.vector_dim."
				.to_string(),
		});
	}
	if cfg.providers.embedding.api_key.trim().is_empty() {
		return Err(Error::Validation {
			message: "Provider embedding api_key must be non-empty.".to_string(),
		});
	}
	if cfg.search.default_profile.is_empty() {
		return Err(Error::Validation {
			message: "search.default_profile must be non-empty.".to_string(),
		});
	}
	if cfg.search.page_size == 0 {
		return Err(Error::Validation {
			message: "search.page_size must be greater than zero.".to_string(),
		});
	}
	if cfg.search.max_results < cfg.search.page_size {
		return Err(Error::Validation {
			message: "search.max_results must be at least search.page_size.".to_string(),
		});
	}
	if cfg.search.overfetch_factor < 10 {
		return Err(Error::Validation {
			message: "search.overfetch_factor must be 10 or greater.".to_string(),
		});
	}
	if cfg.search.recency_scan_limit == 0 {
		return Err(Error::Validation {
			message: "search.recency_scan_limit must be greater than zero.".to_string(),
		});
	}
	if cfg.search.recency_result_factor == 0 {
		return Err(Error::Validation {
			message: "search.recency_result_factor must be greater than zero.".to_string(),
		});
	}
	if cfg.ranking.min_term_chars == 0 {
		return Err(Error::Validation {
			message: "ranking.min_term_chars must be greater than zero.".to_string(),
		});
	}

	for (label, weight) in [
		("ranking.body_term_weight", cfg.ranking.body_term_weight),
		("ranking.title_term_weight", cfg.ranking.title_term_weight),
		("ranking.title_pair_bonus", cfg.ranking.title_pair_bonus),
		("ranking.title_comprehensive_bonus", cfg.ranking.title_comprehensive_bonus),
		("ranking.relevance_tolerance", cfg.ranking.relevance_tolerance),
	] {
		if !weight.is_finite() {
			return Err(Error::Validation { message: format!("{label} must be a finite number.") });
		}
		if weight < 0.0 {
			return Err(Error::Validation { message: format!("{label} must be zero or greater.") });
		}
	}

	let threshold = cfg.ranking.title_similarity_threshold;

	if !threshold.is_finite() || threshold <= 0.0 || threshold > 1.0 {
		return Err(Error::Validation {
			message: "ranking.title_similarity_threshold must be in the range (0.0, 1.0]."
				.to_string(),
		});
	}
	if cfg.content_types.primary.is_empty() || cfg.content_types.secondary.is_empty() {
		return Err(Error::Validation {
			message: "content_types.primary and content_types.secondary must be non-empty."
				.to_string(),
		});
	}
	if cfg.content_types.primary == cfg.content_types.secondary {
		return Err(Error::Validation {
			message: "content_types.primary and content_types.secondary must differ.".to_string(),
		});
	}
	if cfg.session.ttl_seconds == 0 {
		return Err(Error::Validation {
			message: "session.ttl_seconds must be greater than zero.".to_string(),
		});
	}
	if cfg.session.sweep_interval_seconds == 0 {
		return Err(Error::Validation {
			message: "session.sweep_interval_seconds must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.search.default_profile = cfg.search.default_profile.trim().to_string();
	cfg.content_types.primary = cfg.content_types.primary.trim().to_string();
	cfg.content_types.secondary = cfg.content_types.secondary.trim().to_string();
}
