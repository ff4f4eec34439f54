use aide::OperationIo;
use axum::{
	body::Body,
	extract::{FromRequest, FromRequestParts, Request},
	http::{request::Parts, Response, StatusCode},
	response::IntoResponse,
};
use axum_jsonschema::JsonSchemaRejection;
use schemars::JsonSchema;
use serde::{de::DeserializeOwned, Serialize};
use validator::Validate;

use crate::error::{AppError, Message};

fn validated<T: Validate>(input: T) -> Result<T, AppError> {
	input.validate()?;
	Ok(input)
}

/// Converts a rejected JSON body into the shared error shape.
///
/// Syntax errors keep axum's status. Bodies that break the schema or fail to
/// deserialize list one message per problem, with the offending field when
/// it is not the document root.
fn body_rejection(rejection: JsonSchemaRejection) -> AppError {
	let (status, errors) = match rejection {
		JsonSchemaRejection::Json(rejection) => (
			rejection.status(),
			Message::new("invalid_json")
				.content(rejection.body_text())
				.into_vec(),
		),
		JsonSchemaRejection::Serde(error) => {
			let path = error.path().to_string();
			let message = Message::new("invalid_body").content(error.inner().to_string());

			(
				StatusCode::BAD_REQUEST,
				if path == "." {
					message
				} else {
					message.field(path)
				}
				.into_vec(),
			)
		}
		JsonSchemaRejection::Schema(units) => (
			StatusCode::BAD_REQUEST,
			units
				.into_iter()
				.map(|unit| {
					let message =
						Message::new("invalid_body").content(unit.error_description().to_string());
					let location = unit.instance_location().to_string();

					match location.trim_start_matches('/') {
						"" => message,
						field => message.field(field.replace('/', ".")),
					}
				})
				.collect(),
		),
	};

	AppError::Body { status, errors }
}

/// A JSON body, checked against its schema and then validated.
///
/// Responses use the same wrapper so handlers document their output.
#[derive(OperationIo)]
#[aide(
	input_with = "axum_jsonschema::Json<T>",
	output_with = "axum_jsonschema::Json<T>",
	json_schema
)]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
	fn into_response(self) -> Response<Body> {
		axum::Json(self.0).into_response()
	}
}

#[axum::async_trait]
impl<T, S> FromRequest<S> for Json<T>
where
	T: DeserializeOwned + Validate + JsonSchema + 'static,
	S: Send + Sync,
{
	type Rejection = AppError;

	async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
		let axum_jsonschema::Json(input) = axum_jsonschema::Json::<T>::from_request(req, state)
			.await
			.map_err(body_rejection)?;

		validated(input).map(Self)
	}
}

/// A validated query string, such as [`Paginate`](crate::route::model::Paginate).
#[derive(OperationIo)]
#[aide(input_with = "axum::extract::Query<T>", json_schema)]
pub struct Query<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequestParts<S> for Query<T>
where
	T: DeserializeOwned + Validate,
	S: Send + Sync,
{
	type Rejection = AppError;

	async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
		let axum::extract::Query(input) =
			axum::extract::Query::<T>::from_request_parts(parts, state).await?;

		validated(input).map(Self)
	}
}

/// Path parameters. Ids and slugs need no validation beyond parsing.
#[derive(OperationIo)]
#[aide(input_with = "axum::extract::Path<T>", json_schema)]
pub struct Path<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequestParts<S> for Path<T>
where
	T: DeserializeOwned + Send,
	S: Send + Sync,
{
	type Rejection = AppError;

	async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
		let axum::extract::Path(input) =
			axum::extract::Path::<T>::from_request_parts(parts, state).await?;

		Ok(Self(input))
	}
}
