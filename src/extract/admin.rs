use std::sync::Arc;

use aide::OperationInput;
use argon2::Argon2;
use axum::{
	extract::{FromRef, FromRequestParts},
	http::{header, request},
};
use base64::{engine::general_purpose::STANDARD, Engine};
use uuid::Uuid;

use crate::{
	config::Config,
	error::RouteError,
	openapi::{SECURITY_SCHEME_ADMIN_KEY, SECURITY_SCHEME_BASIC},
	route::admin::{self, Error},
	store::AdminStore,
	Database,
};

pub const BEARER_PREFIX: &str = "Bearer ";
pub const BASIC_PREFIX: &str = "Basic ";

/// How the caller proved it is an administrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Principal {
	/// The shared `ADMIN_API_KEY`, used by schedulers and scripts.
	ApiKey,
	/// An admin account, by id.
	Account(Uuid),
}

/// Requires an administrator, authenticated with either
/// `Authorization: Bearer <ADMIN_API_KEY>` or HTTP Basic credentials of
/// an admin account.
///
/// ```rust
/// async fn route(admin: AdminAuth) {
///   println!("{:?}", admin.principal);
/// }
/// ```
#[derive(Debug)]
pub struct AdminAuth {
	pub principal: Principal,
}

/// Compares two secrets without short-circuiting on the first mismatch.
fn same_secret(a: &[u8], b: &[u8]) -> bool {
	a.len() == b.len() && a.iter().zip(b).fold(0, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AdminAuth
where
	Database: FromRef<S>,
	Arc<Config>: FromRef<S>,
	Argon2<'static>: FromRef<S>,
	S: Sync + Send,
{
	type Rejection = RouteError<Error>;

	async fn from_request_parts(
		parts: &mut request::Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		let header = parts
			.headers
			.get(header::AUTHORIZATION)
			.ok_or(Error::MissingCredentials)?
			.to_str()
			.map_err(|_| Error::InvalidCredentials)?;

		if let Some(key) = header.strip_prefix(BEARER_PREFIX) {
			let config = Arc::<Config>::from_ref(state);
			let expected = config
				.admin_api_key
				.as_deref()
				.ok_or(Error::InvalidCredentials)?;

			if !same_secret(key.trim().as_bytes(), expected.as_bytes()) {
				return Err(Error::InvalidCredentials.into());
			}

			return Ok(Self {
				principal: Principal::ApiKey,
			});
		}

		let encoded = header
			.strip_prefix(BASIC_PREFIX)
			.ok_or(Error::InvalidCredentials)?;
		let decoded = STANDARD
			.decode(encoded.trim())
			.ok()
			.and_then(|bytes| String::from_utf8(bytes).ok())
			.ok_or(Error::InvalidCredentials)?;
		let (email, password) = decoded.split_once(':').ok_or(Error::InvalidCredentials)?;

		let database = Database::from_ref(state);
		let account = database
			.admin_by_email(&email.to_lowercase())
			.await?
			.ok_or(Error::InvalidCredentials)?;

		let hasher = Argon2::from_ref(state);
		let hashed = admin::hash_password(&hasher, password, &account.id).map_err(Error::Argon)?;

		if !same_secret(&account.password, &hashed) {
			return Err(Error::InvalidCredentials.into());
		}

		Ok(Self {
			principal: Principal::Account(account.id),
		})
	}
}

impl OperationInput for AdminAuth {
	/// Adds the admin key and basic credential requirements to the `OpenAPI` operation.
	fn operation_input(_ctx: &mut aide::gen::GenContext, operation: &mut aide::openapi::Operation) {
		operation.security.extend([
			[(SECURITY_SCHEME_ADMIN_KEY.to_string(), Vec::new())]
				.into_iter()
				.collect(),
			[(SECURITY_SCHEME_BASIC.to_string(), Vec::new())]
				.into_iter()
				.collect(),
		]);
	}
}

#[cfg(test)]
mod test {
	use super::same_secret;

	#[test]
	fn test_same_secret() {
		assert!(same_secret(b"secret", b"secret"));
		assert!(!same_secret(b"secret", b"secreT"));
		assert!(!same_secret(b"secret", b"secrets"));
		assert!(same_secret(b"", b""));
	}
}
