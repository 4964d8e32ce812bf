use serde::{Deserialize, Serialize};

const AFFIRMATIVE: [&str; 9] =
	["yes", "yeah", "yep", "sure", "ok", "show", "more", "see them", "please"];
const NEGATIVE: [&str; 6] = ["no", "nope", "nah", "don't", "not now", "skip"];
const MAX_SIGNAL_CHARS: usize = 20;

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContinuationSignal {
	Affirmative,
	Negative,
}

/// Reads a short reply to a pending "show more" offer.
///
/// Returns `None` for long messages and for messages that match both lexicons or neither; the
/// caller then treats the message as a new query.
pub fn detect_continuation(message: &str) -> Option<ContinuationSignal> {
	let lower = message.trim().to_lowercase();

	if lower.chars().count() >= MAX_SIGNAL_CHARS {
		return None;
	}

	let affirmative = AFFIRMATIVE.iter().any(|pattern| lower.contains(pattern));
	let negative = NEGATIVE.iter().any(|pattern| lower.contains(pattern));

	match (affirmative, negative) {
		(true, false) => Some(ContinuationSignal::Affirmative),
		(false, true) => Some(ContinuationSignal::Negative),
		_ => None,
	}
}
