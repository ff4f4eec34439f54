use axum::extract::State;
use macros::route;
use uuid::Uuid;

use crate::{extract::Json, openapi::tag, store::AdminStore, AppState};

use super::{hash_password, model, Error, RouteError};

/// Bootstrap admin
/// Creates the first admin account. Refuses to run once any admin account exists.
#[route(tag = tag::ADMIN, response(status = 200, description = "Admin account created.", shape = "Json<model::Admin>"), response(status = 403, description = "An admin account already exists."))]
pub async fn bootstrap(
	State(state): State<AppState>,
	Json(input): Json<model::BootstrapInput>,
) -> Result<Json<model::Admin>, RouteError> {
	let id = Uuid::new_v4();
	let hashed = hash_password(&state.hasher, &input.password, &id).map_err(Error::Argon)?;

	let admin = state
		.database
		.create_first_admin(id, &input.email.to_lowercase(), &hashed)
		.await?
		.ok_or(Error::AdminExists)?;

	tracing::info!(id = %admin.id, "created first admin account");

	Ok(Json(admin))
}
