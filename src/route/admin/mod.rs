use aide::axum::{routing::post_with, ApiRouter};
use argon2::Argon2;
use axum::http::StatusCode;
use uuid::Uuid;

use crate::{error, route::post, AppState};

pub mod model;
pub mod route;

pub const KEY_LENGTH: usize = 32;

/// An error that can occur during admin authentication or setup.
///
/// Note that the messages are presented to the client, so they should not contain
/// sensitive information.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("missing admin credentials")]
	MissingCredentials,
	#[error("invalid admin credentials")]
	InvalidCredentials,
	#[error("an admin account already exists")]
	AdminExists,
	#[error("password hashing error")]
	Argon(#[from] argon2::Error),
}

pub type RouteError = error::RouteError<Error>;

/// Hashes a password with Argon2, using the account's id as a salt.
pub fn hash_password(
	hasher: &Argon2,
	password: &str,
	id: &Uuid,
) -> Result<[u8; KEY_LENGTH], argon2::Error> {
	let mut hash = [0; KEY_LENGTH];

	hasher.hash_password_into(password.as_bytes(), id.as_bytes(), &mut hash)?;
	Ok(hash)
}

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route("/bootstrap", post_with(bootstrap, bootstrap_docs))
		.nest("/posts", post::admin_routes())
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::MissingCredentials | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
			Self::AdminExists => StatusCode::FORBIDDEN,
			Self::Argon(..) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	fn into_errors(self) -> Vec<error::Message<'static>> {
		let (code, content) = match self {
			Self::MissingCredentials => (
				"missing_credentials",
				"Provide an admin API key or admin account credentials.",
			),
			Self::InvalidCredentials => ("invalid_credentials", "The admin credentials are invalid."),
			Self::AdminExists => (
				"admin_exists",
				"An admin account already exists. Bootstrap can only run once.",
			),
			Self::Argon(..) => ("internal_error", "Internal server error"),
		};

		error::Message::new(code).content(content).into_vec()
	}
}
