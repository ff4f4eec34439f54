pub use crate::analytics::Summary;

use schemars::JsonSchema;
use serde::Deserialize;
use validator::Validate;

use crate::analytics::DEFAULT_DAYS;

#[inline]
fn default_days() -> u32 {
	DEFAULT_DAYS
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct RangeInput {
	/// The number of calendar days to cover, ending today. At most 365.
	#[validate(range(min = 1, max = 365))]
	#[serde(default = "default_days")]
	pub days: u32,
}
