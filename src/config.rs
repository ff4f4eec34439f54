use chrono::{FixedOffset, Offset, Utc};

pub const DEFAULT_GATEWAY_URL: &str = "https://ai.gateway.lovable.dev/v1";
pub const DEFAULT_TEXT_MODEL: &str = "google/gemini-2.5-flash";
pub const DEFAULT_IMAGE_MODEL: &str = "google/gemini-2.5-flash-image-preview";
/// India Standard Time.
pub const DEFAULT_OFFSET_MINUTES: i32 = 330;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("{0} must be set")]
	Missing(&'static str),
	#[error("{name} has an invalid value {value:?}")]
	Invalid { name: &'static str, value: String },
}

/// Runtime configuration, read from the environment.
///
/// Credentials for external services are optional so the service can start
/// without them; calls that need a missing credential fail at call time.
#[derive(Debug, Clone)]
pub struct Config {
	pub database_url: String,
	pub port: u16,
	pub admin_api_key: Option<String>,
	pub gateway: Gateway,
	pub storage: Storage,
	pub social: Social,
	pub site: Site,
	pub otlp_endpoint: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Gateway {
	pub url: String,
	pub key: Option<String>,
	pub text_model: String,
	pub image_model: String,
}

#[derive(Debug, Clone)]
pub struct Storage {
	pub url: Option<String>,
	pub key: Option<String>,
	pub bucket: String,
}

#[derive(Debug, Clone)]
pub struct Social {
	pub url: Option<String>,
	pub key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Site {
	/// Default website used for internal links.
	pub website_url: String,
	/// Author of generated drafts.
	pub author: String,
	/// Offset used to compute calendar days.
	pub offset: FixedOffset,
}

impl Default for Site {
	fn default() -> Self {
		Self {
			website_url: "https://example.com".into(),
			author: "Editorial Team".into(),
			offset: FixedOffset::east_opt(DEFAULT_OFFSET_MINUTES * 60).unwrap_or_else(|| Utc.fix()),
		}
	}
}

impl Config {
	pub fn from_env() -> Result<Self, Error> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Builds the configuration from an arbitrary variable lookup.
	pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
		let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

		let port = match var("PORT") {
			Some(port) => port.parse().map_err(|_| Error::Invalid {
				name: "PORT",
				value: port,
			})?,
			None => 3000,
		};

		let offset = match var("SITE_UTC_OFFSET_MINUTES") {
			Some(minutes) => minutes
				.parse::<i32>()
				.ok()
				.and_then(|m| m.checked_mul(60))
				.and_then(FixedOffset::east_opt)
				.ok_or(Error::Invalid {
					name: "SITE_UTC_OFFSET_MINUTES",
					value: minutes,
				})?,
			None => Site::default().offset,
		};

		Ok(Self {
			database_url: var("DATABASE_URL").ok_or(Error::Missing("DATABASE_URL"))?,
			port,
			admin_api_key: var("ADMIN_API_KEY"),
			gateway: Gateway {
				url: var("AI_GATEWAY_URL").unwrap_or_else(|| DEFAULT_GATEWAY_URL.into()),
				key: var("AI_GATEWAY_KEY"),
				text_model: var("AI_TEXT_MODEL").unwrap_or_else(|| DEFAULT_TEXT_MODEL.into()),
				image_model: var("AI_IMAGE_MODEL").unwrap_or_else(|| DEFAULT_IMAGE_MODEL.into()),
			},
			storage: Storage {
				url: var("STORAGE_URL"),
				key: var("STORAGE_KEY"),
				bucket: var("STORAGE_BUCKET").unwrap_or_else(|| "blog-images".into()),
			},
			social: Social {
				url: var("SOCIAL_API_URL"),
				key: var("SOCIAL_API_KEY"),
			},
			site: Site {
				website_url: var("WEBSITE_URL").unwrap_or_else(|| Site::default().website_url),
				author: var("DEFAULT_AUTHOR").unwrap_or_else(|| Site::default().author),
				offset,
			},
			otlp_endpoint: var("OTEL_EXPORTER_OTLP_ENDPOINT"),
		})
	}
}
