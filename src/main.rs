#![warn(clippy::pedantic)]

mod analytics;
mod catalog;
mod config;
mod error;
mod extract;
mod gateway;
mod generate;
mod model;
mod openapi;
mod processor;
mod ratelimit;
mod rotator;
mod route;
mod slug;
mod social;
mod status;
mod storage;
mod store;
mod trace;

use std::sync::Arc;

use aide::openapi::OpenApi;
use argon2::Argon2;
use axum::{http::HeaderName, Extension, Router};
use tower::{Layer, ServiceBuilder};
use tower_governor::GovernorLayer;
use tower_http::{
	compression::CompressionLayer,
	cors::CorsLayer,
	normalize_path::NormalizePathLayer,
	request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
	trace::TraceLayer,
};

use crate::{
	config::Config,
	gateway::{Gateway, HttpGateway},
	generate::{Generate, Generator},
	ratelimit::Limits,
	social::{HttpSocial, Social},
	storage::{HttpObjectStore, ObjectStore},
};

pub type Database = Arc<dyn store::Store>;
pub type AppState = State;

const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// The shared application state.
///
/// External services sit behind traits so they can be swapped for stubs.
#[derive(Clone, axum::extract::FromRef)]
pub struct State {
	pub database: Database,
	pub gateway: Arc<dyn Gateway>,
	pub generator: Arc<dyn Generate>,
	pub storage: Arc<dyn ObjectStore>,
	pub social: Arc<dyn Social>,
	pub config: Arc<Config>,
	pub hasher: Argon2<'static>,
}

/// Builds the application router. Rate limits are only applied when
/// `limits` is set, since they key on the peer address.
pub fn app(state: State, limits: Option<&Limits>) -> Router {
	let mut api = OpenApi::default();

	let mut generate = route::generate::routes();
	let mut social = route::social::routes();

	if let Some(limits) = limits {
		generate = generate.layer(GovernorLayer {
			config: limits.generation.clone(),
		});
		social = social.layer(GovernorLayer {
			config: limits.generation.clone(),
		});
	}

	let router = aide::axum::ApiRouter::new()
		.nest("/schedule", route::schedule::routes())
		.nest("/generate", generate)
		.nest("/social", social)
		.nest("/admin", route::admin::routes())
		.nest("/posts", route::post::routes())
		.nest("/analytics", route::analytics::routes())
		.nest("/docs", route::docs::routes())
		.finish_api_with(&mut api, openapi::docs)
		.layer(Extension(Arc::new(api)))
		.layer(
			ServiceBuilder::new()
				.layer(SetRequestIdLayer::new(REQUEST_ID_HEADER, MakeRequestUuid))
				.layer(TraceLayer::new_for_http())
				.layer(PropagateRequestIdLayer::new(REQUEST_ID_HEADER))
				.layer(CorsLayer::permissive())
				.layer(CompressionLayer::new()),
		)
		.with_state(state);

	let router = match limits {
		Some(limits) => router.layer(GovernorLayer {
			config: limits.default.clone(),
		}),
		None => router,
	};

	// Trailing slashes are trimmed before routing.
	Router::new().fallback_service(NormalizePathLayer::trim_trailing_slash().layer(router))
}

#[tokio::main]
async fn main() {
	dotenvy::dotenv().ok();

	let config = Config::from_env().expect("invalid configuration");
	let _guard = trace::init_tracing_subscriber(config.otlp_endpoint.as_deref())
		.expect("failed to initialize tracing");

	let client = reqwest::Client::builder()
		.user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
		.build()
		.expect("failed to build http client");

	let gateway: Arc<dyn Gateway> = Arc::new(HttpGateway::new(client.clone(), config.gateway.clone()));

	if let Err(error) = gateway.check() {
		tracing::warn!(%error, "generation endpoints will fail until the AI gateway is configured");
	}

	let state = State {
		database: Arc::new(
			store::PgStore::connect(&config.database_url)
				.await
				.expect("failed to connect to database"),
		),
		generator: Arc::new(Generator::new(gateway.clone())),
		gateway,
		storage: Arc::new(HttpObjectStore::new(client.clone(), config.storage.clone())),
		social: Arc::new(HttpSocial::new(client, config.social.clone())),
		hasher: Argon2::default(),
		config: Arc::new(config),
	};

	let port = state.config.port;
	let limits = Limits::new();
	let app = app(state, Some(&limits));

	let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
		.await
		.expect("failed to bind to port");

	tracing::info!("listening on port {}", port);

	axum::serve(
		listener,
		app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
	)
	.await
	.expect("server error");
}
