use aide::{
	openapi::{SecurityScheme, Tag},
	transform::TransformOpenApi,
};

use crate::{error, extract::Json};

pub const SECURITY_SCHEME_ADMIN_KEY: &str = "Admin Key";
pub const SECURITY_SCHEME_BASIC: &str = "Admin Account";

pub mod tag {
	pub const SCHEDULE: &str = "Schedule";
	pub const GENERATE: &str = "Generate";
	pub const SOCIAL: &str = "Social";
	pub const ADMIN: &str = "Admin";
	pub const POST: &str = "Post";
	pub const ANALYTICS: &str = "Analytics";
}

fn tag(name: &str, description: &str) -> Tag {
	Tag {
		name: name.into(),
		description: Some(description.into()),
		..Default::default()
	}
}

pub fn docs(api: TransformOpenApi) -> TransformOpenApi {
	api.title("Agency CMS API")
		.summary("Blog CMS and content automation for a marketing agency")
		.description(include_str!("../README.md"))
		.tag(tag(tag::SCHEDULE, "Scheduled post automation"))
		.tag(tag(tag::GENERATE, "AI content and image generation"))
		.tag(tag(tag::SOCIAL, "Social media publishing"))
		.tag(tag(tag::ADMIN, "Administration and post management"))
		.tag(tag(tag::POST, "Published blog posts"))
		.tag(tag(tag::ANALYTICS, "Blog view analytics"))
		.security_scheme(
			SECURITY_SCHEME_ADMIN_KEY,
			SecurityScheme::Http {
				scheme: "bearer".into(),
				bearer_format: None,
				description: Some("The shared admin API key".into()),
				extensions: Default::default(),
			},
		)
		.security_scheme(
			SECURITY_SCHEME_BASIC,
			SecurityScheme::Http {
				scheme: "basic".into(),
				bearer_format: None,
				description: Some("The email and password of an admin account".into()),
				extensions: Default::default(),
			},
		)
		.default_response_with::<Json<error::ErrorBody>, _>(|res| {
			res.example(error::ErrorBody::new(
				error::Message::new("unknown_post")
					.content("The post you requested does not exist.")
					.detail("post", "0b7e1a3c-5f8e-4d3a-9c1e-2a6b4c8d0e1f")
					.into_vec(),
			))
		})
}
