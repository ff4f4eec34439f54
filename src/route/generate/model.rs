pub use crate::generate::{image::Image, Request, Size, Style};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Rejects text that is empty after trimming.
pub fn not_blank(text: &str) -> Result<(), ValidationError> {
	if text.trim().is_empty() {
		let mut error = ValidationError::new("required");

		error.message = Some("must not be empty".into());
		return Err(error);
	}

	Ok(())
}

#[derive(Serialize, JsonSchema)]
pub struct ContentOutput {
	/// The generated text.
	pub content: String,
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct ImageInput {
	/// What the image should show.
	#[validate(length(max = 1000), custom(function = "not_blank"))]
	pub prompt: String,
	#[serde(default)]
	pub style: Style,
	#[serde(default)]
	pub size: Size,
}
