use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Failed to read vault config at {path:?}.")]
	ReadConfig { path: PathBuf, source: std::io::Error },
	#[error("Failed to parse vault config at {path:?}.")]
	ParseConfig { path: PathBuf, source: toml::de::Error },
	#[error("Invalid vault config: {message}")]
	Validation { message: String },
}
