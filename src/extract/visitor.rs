use std::convert::Infallible;

use aide::OperationInput;
use axum::{
	extract::FromRequestParts,
	http::{header, request, HeaderMap, HeaderName},
};

/// The longest header value kept for analytics.
const MAX_LENGTH: usize = 512;

/// The client details recorded with a post view.
///
/// ```rust
/// async fn route(visitor: Visitor) {
///   println!("{:?}", visitor.referrer);
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Visitor {
	pub referrer: Option<String>,
	pub user_agent: Option<String>,
}

fn header_value(headers: &HeaderMap, name: HeaderName) -> Option<String> {
	let value = headers.get(name)?.to_str().ok()?.trim();

	if value.is_empty() {
		return None;
	}

	Some(match value.char_indices().nth(MAX_LENGTH) {
		Some((index, _)) => value[..index].to_string(),
		None => value.to_string(),
	})
}

impl Visitor {
	pub fn from_headers(headers: &HeaderMap) -> Self {
		Self {
			referrer: header_value(headers, header::REFERER),
			user_agent: header_value(headers, header::USER_AGENT),
		}
	}
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Visitor
where
	S: Sync + Send,
{
	type Rejection = Infallible;

	async fn from_request_parts(
		parts: &mut request::Parts,
		_state: &S,
	) -> Result<Self, Self::Rejection> {
		Ok(Self::from_headers(&parts.headers))
	}
}

impl OperationInput for Visitor {}
