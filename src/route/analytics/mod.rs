use aide::axum::{routing::get_with, ApiRouter};
use axum::http::StatusCode;

use crate::{error, AppState};

pub mod model;
pub mod route;

/// Analytics has no failures of its own beyond the shared ones.
#[derive(Debug)]
pub enum Error {}

impl std::fmt::Display for Error {
	fn fmt(&self, _: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match *self {}
	}
}

impl std::error::Error for Error {}

pub type RouteError = error::RouteError<Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new().api_route("/", get_with(get_summary, get_summary_docs))
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match *self {}
	}

	fn into_errors(self) -> Vec<error::Message<'static>> {
		match self {}
	}
}
