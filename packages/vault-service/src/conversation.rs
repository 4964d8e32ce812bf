use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::{
	Result, VaultService, pagination,
	search::{RankedResult, SearchRequest},
};
use vault_domain::continuation::{self, ContinuationSignal};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TurnRequest {
	/// Opaque conversation identifier; compared for equality only.
	pub session_id: String,
	pub message: String,
	#[serde(default)]
	pub profile: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnKind {
	/// The message was searched as a new query.
	Fresh,
	/// The next page of a pending remainder.
	Continuation,
	/// The pending remainder was discarded.
	Declined,
}

#[derive(Clone, Debug, Serialize)]
pub struct TurnResponse {
	pub kind: TurnKind,
	pub query: String,
	pub items: Vec<RankedResult>,
	pub more_available: bool,
	pub remaining_count: usize,
}

impl VaultService {
	/// Handles one user message. Short yes/no replies act on a pending remainder; anything else,
	/// or a reply with no live session, runs a fresh search.
	pub async fn turn(&self, req: TurnRequest) -> Result<TurnResponse> {
		let session_id = req.session_id.as_str();

		match continuation::detect_continuation(&req.message) {
			Some(ContinuationSignal::Affirmative) => {
				let page_size = self.cfg.search.page_size as usize;

				if let Some(page) = self.sessions.take_page(session_id, page_size, Instant::now()) {
					return Ok(TurnResponse {
						kind: TurnKind::Continuation,
						more_available: page.more_available(),
						remaining_count: page.remaining_count,
						query: page.query,
						items: page.items,
					});
				}

				tracing::debug!(session_id, "Continuation without a live session; searching.");
			},
			Some(ContinuationSignal::Negative) => {
				if let Some(session) = self.sessions.decline(session_id, Instant::now()) {
					tracing::info!(
						session_id,
						discarded = session.remaining.len(),
						"Pagination session declined."
					);

					return Ok(TurnResponse {
						kind: TurnKind::Declined,
						query: session.query,
						items: Vec::new(),
						more_available: false,
						remaining_count: 0,
					});
				}

				tracing::debug!(session_id, "Decline without a live session; searching.");
			},
			None => {},
		}

		self.fresh_turn(req).await
	}

	async fn fresh_turn(&self, req: TurnRequest) -> Result<TurnResponse> {
		let TurnRequest { session_id, message, profile } = req;
		let response = self
			.search(SearchRequest { query: message, profile, limit: None, sort_by_date: false })
			.await?;
		let page_size = self.cfg.search.page_size as usize;
		let (items, remainder) = pagination::split_first_page(response.items, page_size);
		let remaining_count = remainder.len();

		self.sessions.replace(&session_id, &response.query, remainder, Instant::now());

		Ok(TurnResponse {
			kind: TurnKind::Fresh,
			query: response.query,
			items,
			more_available: remaining_count > 0,
			remaining_count,
		})
	}
}
