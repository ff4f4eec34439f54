pub use crate::{
	generate::{image::Image, Style},
	social::Profile,
};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::route::generate::model::not_blank;

#[derive(Deserialize, Validate, JsonSchema)]
pub struct PublishInput {
	/// The profiles to publish to.
	#[validate(length(min = 1, max = 20))]
	pub profile_ids: Vec<String>,
	/// The text of the post.
	#[validate(length(max = 5000), custom(function = "not_blank"))]
	pub text: String,
	/// A public image URL to attach.
	#[validate(url)]
	pub image_url: Option<String>,
}

/// The outcome of publishing to one profile.
#[derive(Debug, Serialize, JsonSchema)]
pub struct ProfileResult {
	pub profile_id: String,
	pub success: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub post_id: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub url: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
}

#[derive(Debug, PartialEq, Eq, Serialize, JsonSchema)]
pub struct PublishSummary {
	pub total: usize,
	pub succeeded: usize,
	pub failed: usize,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct PublishOutput {
	pub results: Vec<ProfileResult>,
	pub summary: PublishSummary,
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct SocialImageInput {
	/// What the image should show.
	#[validate(length(max = 1000), custom(function = "not_blank"))]
	pub prompt: String,
	#[serde(default)]
	pub style: Style,
}
