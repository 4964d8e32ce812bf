pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("{component} is not initialized.")]
	NotReady { component: String },
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Store error: {message}")]
	Store { message: String },
}
impl From<vault_storage::Error> for Error {
	fn from(err: vault_storage::Error) -> Self {
		match err {
			vault_storage::Error::Qdrant(inner) => Self::Store { message: inner.to_string() },
			vault_storage::Error::InvalidPayload(message) => Self::Store { message },
			vault_storage::Error::NotReady(_) =>
				Self::NotReady { component: "Vector store".to_string() },
		}
	}
}

impl From<color_eyre::Report> for Error {
	fn from(err: color_eyre::Report) -> Self {
		Self::Provider { message: err.to_string() }
	}
}
