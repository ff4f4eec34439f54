pub use crate::{
	model::ScheduledPost,
	processor::BatchReport,
	rotator::Scheduled,
	route::model::Paginate,
};

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::catalog::{self, SERVICES};

fn known_service(id: &str) -> Result<(), ValidationError> {
	if catalog::find(SERVICES, id).is_none() {
		let mut error = ValidationError::new("unknown_service");

		error.message = Some(format!("{id} is not a known service").into());
		return Err(error);
	}

	Ok(())
}

#[inline]
fn yes() -> bool {
	true
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct CreateScheduledInput {
	/// The title of the generated post. Defaults to the topic.
	#[validate(length(min = 3, max = 200))]
	pub title: Option<String>,
	/// The subject to write about.
	#[validate(length(min = 3, max = 300))]
	pub topic: String,
	/// The service the post promotes.
	#[validate(custom(function = "known_service"))]
	pub service_id: String,
	/// When the post becomes due for generation.
	pub scheduled_at: DateTime<Utc>,
	/// Whether to append links to the agency's service pages.
	#[serde(default = "yes")]
	pub include_internal_links: bool,
	/// The website the internal links point to. Defaults to the configured site.
	#[validate(url)]
	pub website_url: Option<String>,
	/// Directives appended to the generation prompt.
	#[validate(length(max = 2000))]
	pub custom_instructions: Option<String>,
}
