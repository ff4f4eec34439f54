use schemars::JsonSchema;
use serde::Deserialize;
use validator::Validate;

#[inline]
fn first_page() -> i64 {
	1
}

/// Matches the blog grid, three cards across.
#[inline]
fn page_size() -> i64 {
	12
}

/// Page selection for list endpoints.
#[derive(Deserialize, Validate, JsonSchema)]
pub struct Paginate {
	/// The page number to return (1-indexed).
	#[validate(range(min = 1, max = 1000))]
	#[serde(default = "first_page")]
	pub page: i64,
	/// The number of items to return per page.
	#[validate(range(min = 1, max = 100))]
	#[serde(default = "page_size")]
	pub size: i64,
}

impl Paginate {
	pub fn offset(&self) -> i64 {
		(self.page - 1) * self.size
	}

	pub fn limit(&self) -> i64 {
		self.size
	}
}
