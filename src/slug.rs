use chrono::{DateTime, Utc};
use uuid::Uuid;

/// The maximum length of a base slug, before any suffix.
pub const MAX_LENGTH: usize = 80;

/// Derives a URL-safe slug from free text.
///
/// The result only contains lowercase ASCII letters, digits and single
/// hyphens, never starts or ends with a hyphen and is at most
/// [`MAX_LENGTH`] characters long.
pub fn slugify(text: &str) -> String {
	let mut slug = String::with_capacity(text.len().min(MAX_LENGTH));
	let mut pending_hyphen = false;

	for c in text.chars().flat_map(char::to_lowercase) {
		if c.is_ascii_alphanumeric() {
			if pending_hyphen && !slug.is_empty() {
				if slug.len() + 1 >= MAX_LENGTH {
					break;
				}

				slug.push('-');
			}

			if slug.len() >= MAX_LENGTH {
				break;
			}

			slug.push(c);
			pending_hyphen = false;
		} else if c.is_whitespace() || c == '-' || c == '_' {
			pending_hyphen = true;
		}
	}

	slug
}

/// Derives a slug and appends a timestamp so repeated topics never collide.
pub fn unique(text: &str, now: DateTime<Utc>) -> String {
	let base = slugify(text);
	let suffix = now.timestamp_millis();

	if base.is_empty() {
		format!("post-{suffix}")
	} else {
		format!("{base}-{suffix}")
	}
}

/// Like [`unique`], with a short form of `id` appended so rows handled in
/// the same millisecond never share a slug.
pub fn unique_for(text: &str, now: DateTime<Utc>, id: Uuid) -> String {
	let id = id.simple().to_string();

	format!("{}-{}", unique(text, now), &id[..8])
}
