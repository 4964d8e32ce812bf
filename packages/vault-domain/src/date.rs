use time::{
	Date, OffsetDateTime, PrimitiveDateTime,
	format_description::{BorrowedFormatItem, well_known::Rfc3339},
	macros::format_description,
};

/// Parses the free-form date string stored in document front matter.
///
/// Accepts RFC 3339 timestamps, `YYYY-MM-DD` and `YYYY/MM/DD` (month and day may drop the
/// leading zero), and `YYYY-MM-DD[ T]HH:MM[:SS]` (read as UTC). Quotes and surrounding whitespace are ignored. Anything else is `None`, which
/// ranks as "no date".
pub fn parse_document_date(raw: &str) -> Option<OffsetDateTime> {
	let trimmed = raw.trim().trim_matches(|ch: char| ch == '"' || ch == '\'').trim();

	if trimmed.is_empty() {
		return None;
	}
	if let Ok(parsed) = OffsetDateTime::parse(trimmed, &Rfc3339) {
		return Some(parsed);
	}

	let date_formats: [&[BorrowedFormatItem<'_>]; 4] = [
		format_description!("[year]-[month]-[day]"),
		format_description!("[year]/[month]/[day]"),
		format_description!("[year]-[month padding:none]-[day padding:none]"),
		format_description!("[year]/[month padding:none]/[day padding:none]"),
	];

	for format in date_formats {
		if let Ok(date) = Date::parse(trimmed, format) {
			return Some(date.midnight().assume_utc());
		}
	}

	let datetime_formats: [&[BorrowedFormatItem<'_>]; 4] = [
		format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
		format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
		format_description!("[year]-[month]-[day] [hour]:[minute]"),
		format_description!("[year]-[month]-[day]T[hour]:[minute]"),
	];

	for format in datetime_formats {
		if let Ok(datetime) = PrimitiveDateTime::parse(trimmed, format) {
			return Some(datetime.assume_utc());
		}
	}

	None
}

/// Unix timestamp of a parsed document date, used as a sort key.
pub fn document_timestamp(raw: Option<&str>) -> Option<i64> {
	raw.and_then(parse_document_date).map(OffsetDateTime::unix_timestamp)
}
