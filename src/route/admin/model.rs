pub use crate::model::Admin;

use schemars::JsonSchema;
use serde::Deserialize;
use validator::Validate;

#[derive(Deserialize, Validate, JsonSchema)]
pub struct BootstrapInput {
	/// The email of the first admin account.
	#[validate(email)]
	pub email: String,
	/// The password of the first admin account.
	#[validate(length(min = 8, max = 128))]
	pub password: String,
}
