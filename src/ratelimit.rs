use std::{sync::Arc, time::Duration};

use axum::{
	body::Body,
	response::{IntoResponse, Response},
};
use governor::{
	clock::QuantaInstant,
	middleware::{RateLimitingMiddleware, StateInformationMiddleware},
};
use tower_governor::{
	governor::{GovernorConfig, GovernorConfigBuilder},
	key_extractor::{KeyExtractor, PeerIpKeyExtractor},
	GovernorError,
};

pub type Config = Arc<GovernorConfig<PeerIpKeyExtractor, StateInformationMiddleware>>;

/// The limit for every route.
pub fn default() -> Config {
	Arc::new(
		GovernorConfigBuilder::default()
			.per_second(10)
			.burst_size(50)
			.use_headers()
			.error_handler(error_handler)
			.finish()
			.expect("default rate limit has a non-zero period and burst"),
	)
}

/// The limit for routes that call the AI gateway, one request every six
/// seconds with a small burst.
pub fn generation() -> Config {
	Arc::new(
		GovernorConfigBuilder::default()
			.per_second(6)
			.burst_size(5)
			.use_headers()
			.error_handler(error_handler)
			.finish()
			.expect("generation rate limit has a non-zero period and burst"),
	)
}

fn error_handler(error: GovernorError) -> Response<Body> {
	crate::error::AppError::from(error).into_response()
}

/// Periodically drops limiter state for clients that have gone quiet.
pub fn cleanup_old_limits<T, M>(configs: &[&Arc<GovernorConfig<T, M>>])
where
	T: KeyExtractor,
	<T as KeyExtractor>::Key: Send + Sync + 'static,
	M: RateLimitingMiddleware<QuantaInstant> + Send + Sync + 'static,
{
	let limiters = configs
		.iter()
		.map(|config| config.limiter().clone())
		.collect::<Vec<_>>();
	let interval = Duration::from_secs(60);

	std::thread::spawn(move || loop {
		std::thread::sleep(interval);

		for limiter in &limiters {
			tracing::debug!("rate limiting storage size: {}", limiter.len());

			limiter.retain_recent();
		}
	});
}

/// The limiters applied in production.
pub struct Limits {
	pub default: Config,
	pub generation: Config,
}

impl Limits {
	pub fn new() -> Self {
		let limits = Self {
			default: default(),
			generation: generation(),
		};

		cleanup_old_limits(&[&limits.default, &limits.generation]);
		limits
	}
}
