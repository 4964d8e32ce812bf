use std::{
	collections::{HashMap, VecDeque},
	sync::{Arc, Mutex, MutexGuard},
	time::{Duration, Instant},
};

use serde::Serialize;
use tokio::{task::JoinHandle, time::MissedTickBehavior};

use crate::search::RankedResult;

/// Unserved remainder of one ranked list, keyed by session identifier.
#[derive(Clone, Debug)]
pub struct PaginationSession {
	pub query: String,
	pub remaining: VecDeque<RankedResult>,
	pub touched_at: Instant,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Page {
	pub query: String,
	pub items: Vec<RankedResult>,
	pub remaining_count: usize,
}
impl Page {
	pub fn more_available(&self) -> bool {
		self.remaining_count > 0
	}
}

/// Session map behind one lock. Every read-modify-write happens inside a single critical
/// section, including the sweep.
pub struct SessionStore {
	ttl: Duration,
	sessions: Mutex<HashMap<String, PaginationSession>>,
}
impl SessionStore {
	pub fn new(ttl: Duration) -> Self {
		Self { ttl, sessions: Mutex::new(HashMap::new()) }
	}

	pub fn ttl(&self) -> Duration {
		self.ttl
	}

	fn lock(&self) -> MutexGuard<'_, HashMap<String, PaginationSession>> {
		self.sessions.lock().unwrap_or_else(|err| err.into_inner())
	}

	fn is_expired(&self, session: &PaginationSession, now: Instant) -> bool {
		now.saturating_duration_since(session.touched_at) > self.ttl
	}

	/// Stores a new remainder, discarding any prior session for the identifier. An empty
	/// remainder only clears.
	pub fn replace(
		&self,
		session_id: &str,
		query: &str,
		remaining: Vec<RankedResult>,
		now: Instant,
	) {
		let mut sessions = self.lock();

		if remaining.is_empty() {
			sessions.remove(session_id);

			return;
		}

		tracing::info!(session_id, remaining = remaining.len(), "Pagination session stored.");

		sessions.insert(
			session_id.to_string(),
			PaginationSession {
				query: query.to_string(),
				remaining: remaining.into(),
				touched_at: now,
			},
		);
	}

	/// Pops the next page. The session is deleted once drained and refreshed otherwise.
	/// Returns `None` when no live session exists.
	pub fn take_page(&self, session_id: &str, page_size: usize, now: Instant) -> Option<Page> {
		let mut sessions = self.lock();
		let session = sessions.get_mut(session_id)?;

		if self.is_expired(session, now) {
			sessions.remove(session_id);

			return None;
		}

		let take = page_size.min(session.remaining.len());
		let items: Vec<RankedResult> = session.remaining.drain(..take).collect();
		let remaining_count = session.remaining.len();
		let query = session.query.clone();

		if remaining_count == 0 {
			sessions.remove(session_id);
		} else {
			session.touched_at = now;
		}

		tracing::info!(session_id, served = items.len(), remaining_count, "Pagination page served.");

		Some(Page { query, items, remaining_count })
	}

	pub fn remove(&self, session_id: &str) -> Option<PaginationSession> {
		self.lock().remove(session_id)
	}

	/// Discards the pending remainder. A session idle past the TTL is dropped as well but
	/// reported as `None`, the same as an unknown identifier.
	pub fn decline(&self, session_id: &str, now: Instant) -> Option<PaginationSession> {
		let session = self.lock().remove(session_id)?;

		if self.is_expired(&session, now) {
			return None;
		}

		Some(session)
	}

	/// Whether a live session exists; sessions past the TTL do not count.
	pub fn contains(&self, session_id: &str) -> bool {
		let now = Instant::now();

		self.lock().get(session_id).is_some_and(|session| !self.is_expired(session, now))
	}

	/// Deletes every session idle for longer than the TTL as of `now`.
	pub fn purge_expired(&self, now: Instant) -> usize {
		let mut sessions = self.lock();
		let before = sessions.len();

		sessions.retain(|_, session| !self.is_expired(session, now));

		before - sessions.len()
	}

	/// Live sessions as of now. Entries past the TTL awaiting the sweep are excluded.
	pub fn len(&self) -> usize {
		let now = Instant::now();

		self.lock().values().filter(|session| !self.is_expired(session, now)).count()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

/// Splits a ranked list into the first page and the remainder.
pub fn split_first_page(
	mut results: Vec<RankedResult>,
	page_size: usize,
) -> (Vec<RankedResult>, Vec<RankedResult>) {
	let remainder = results.split_off(page_size.min(results.len()));

	(results, remainder)
}

pub fn spawn_sweeper(store: Arc<SessionStore>, period: Duration) -> JoinHandle<()> {
	tokio::spawn(async move {
		let mut ticker = tokio::time::interval(period);

		ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

		loop {
			ticker.tick().await;

			let purged = store.purge_expired(tokio::time::Instant::now().into_std());

			if purged > 0 {
				tracing::info!(purged, live = store.len(), "Expired pagination sessions purged.");
			}
		}
	})
}
