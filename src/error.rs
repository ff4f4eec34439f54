use std::borrow::Cow;

use axum::{
	body::Body,
	extract::rejection,
	http::{Response, StatusCode},
	response::IntoResponse,
	Json,
};
use schemars::JsonSchema;
use serde::Serialize;

use crate::store;

pub type Map = serde_json::Map<String, serde_json::Value>;

/// A single error message presented to the client.
#[derive(Debug, Serialize, JsonSchema)]
pub struct Message<'a> {
	/// A machine-readable code, such as `unknown_post`.
	pub code: Cow<'a, str>,
	/// A human-readable description of the error.
	pub content: Cow<'a, str>,
	/// The input field that caused the error, if any.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub field: Option<Cow<'a, str>>,
	/// Additional structured details.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<Cow<'a, Map>>,
}

impl<'a> Message<'a> {
	pub fn new(code: impl Into<Cow<'a, str>>) -> Self {
		let code = code.into();

		Self {
			content: code.clone(),
			code,
			field: None,
			details: None,
		}
	}

	#[must_use]
	pub fn content(mut self, content: impl Into<Cow<'a, str>>) -> Self {
		self.content = content.into();
		self
	}

	#[must_use]
	pub fn field(mut self, field: impl Into<Cow<'a, str>>) -> Self {
		self.field = Some(field.into());
		self
	}

	#[must_use]
	pub fn detail(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
		self.details
			.get_or_insert_with(|| Cow::Owned(Map::new()))
			.to_mut()
			.insert(key.into(), value.into());
		self
	}

	pub fn into_vec(self) -> Vec<Self> {
		vec![self]
	}
}

/// The body of every error response.
///
/// `error` repeats the first message so simple clients can show it directly.
#[derive(Debug, Serialize, JsonSchema)]
pub struct ErrorBody {
	pub error: String,
	pub errors: Vec<Message<'static>>,
}

impl ErrorBody {
	pub fn new(errors: Vec<Message<'static>>) -> Self {
		Self {
			error: errors
				.first()
				.map_or_else(|| "unknown error".into(), |m| m.content.to_string()),
			errors,
		}
	}
}

/// Implemented by every route-level error enum.
///
/// The messages are sent to the client, so they should not contain
/// sensitive information.
pub trait ErrorShape: std::error::Error {
	fn status(&self) -> StatusCode;

	fn into_errors(self) -> Vec<Message<'static>>;
}

/// Errors shared by every route.
///
/// The Display trait is not sent to the client, so it can show
/// sensitive information.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
	#[error("validation error: {0}")]
	Validation(#[from] validator::ValidationErrors),
	#[error("invalid request body: {errors:?}")]
	Body {
		status: StatusCode,
		errors: Vec<Message<'static>>,
	},
	#[error("query error: {0}")]
	Query(#[from] rejection::QueryRejection),
	#[error("path error: {0}")]
	Path(#[from] rejection::PathRejection),
	#[error("store error: {0}")]
	Store(#[from] store::Error),
	#[error("rate limit error: {0}")]
	RateLimit(#[from] tower_governor::GovernorError),
}

impl IntoResponse for AppError {
	fn into_response(self) -> Response<Body> {
		let (status, errors) = match self {
			Self::Validation(errors) => (
				StatusCode::BAD_REQUEST,
				errors
					.field_errors()
					.into_iter()
					.flat_map(|(field, errors)| {
						errors.iter().map(move |error| {
							let content = error
								.message
								.as_ref()
								.map_or_else(|| format!("{field} is invalid"), ToString::to_string);

							Message::new(error.code.to_string())
								.content(content)
								.field(field)
						})
					})
					.collect(),
			),
			Self::Body { status, errors } => (status, errors),
			Self::Query(rejection) => (
				StatusCode::BAD_REQUEST,
				Message::new("invalid_query")
					.content(rejection.body_text())
					.into_vec(),
			),
			Self::Path(rejection) => (
				StatusCode::BAD_REQUEST,
				Message::new("invalid_path")
					.content(rejection.body_text())
					.into_vec(),
			),
			Self::Store(store::Error::Conflict(what)) => (
				StatusCode::CONFLICT,
				Message::new("conflict")
					.content(format!("{what} already exists"))
					.into_vec(),
			),
			Self::Store(error) => {
				tracing::error!(%error, "store error");

				(
					StatusCode::INTERNAL_SERVER_ERROR,
					Message::new("internal_error")
						.content("Internal server error")
						.into_vec(),
				)
			}
			Self::RateLimit(error) => {
				return match error {
					tower_governor::GovernorError::TooManyRequests { headers, .. } => {
						let body = ErrorBody::new(
							Message::new("too_many_requests")
								.content("Too many requests, please slow down.")
								.into_vec(),
						);

						let mut response =
							(StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();

						if let Some(headers) = headers {
							response.headers_mut().extend(headers);
						}

						response
					}
					error => {
						tracing::error!(%error, "rate limiter error");

						(
							StatusCode::INTERNAL_SERVER_ERROR,
							Json(ErrorBody::new(
								Message::new("internal_error")
									.content("Internal server error")
									.into_vec(),
							)),
						)
							.into_response()
					}
				}
			}
		};

		(status, Json(ErrorBody::new(errors))).into_response()
	}
}

/// The error returned from a route, either a shared [`AppError`]
/// or one specific to the route's resource.
#[derive(Debug)]
pub enum RouteError<T> {
	App(AppError),
	Route(T),
}

impl<T: ErrorShape> From<T> for RouteError<T> {
	fn from(error: T) -> Self {
		Self::Route(error)
	}
}

impl<T> From<AppError> for RouteError<T> {
	fn from(error: AppError) -> Self {
		Self::App(error)
	}
}

impl<T> From<store::Error> for RouteError<T> {
	fn from(error: store::Error) -> Self {
		Self::App(error.into())
	}
}

impl<T: ErrorShape> IntoResponse for RouteError<T> {
	fn into_response(self) -> Response<Body> {
		match self {
			Self::App(error) => error.into_response(),
			Self::Route(error) => {
				let status = error.status();

				if status.is_server_error() {
					tracing::error!(%error, "route error");
				}

				(status, Json(ErrorBody::new(error.into_errors()))).into_response()
			}
		}
	}
}

impl<T: ErrorShape> aide::OperationOutput for RouteError<T> {
	type Inner = Self;
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_message_builder() {
		let message = Message::new("unknown_post")
			.content("The post does not exist.")
			.detail("post", "abc");

		assert_eq!(message.code, "unknown_post");
		assert_eq!(message.content, "The post does not exist.");
		assert_eq!(
			message.details.unwrap().get("post"),
			Some(&serde_json::json!("abc"))
		);
	}

	#[test]
	fn test_error_body_repeats_first_message() {
		let body = ErrorBody::new(vec![
			Message::new("a").content("first"),
			Message::new("b").content("second"),
		]);

		assert_eq!(body.error, "first");
		assert_eq!(body.errors.len(), 2);
	}
}
