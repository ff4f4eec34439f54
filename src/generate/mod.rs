//! Text generation on top of the AI [`Gateway`].

pub mod image;
pub mod prompt;

use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::gateway::{self, Gateway};

/// The kind of text to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Kind {
	FullContent,
	TitleOptions,
	Excerpt,
	Outline,
	TagList,
	ContentImprovement,
	SeoAnalysis,
	SocialPost,
}

impl Kind {
	/// Kinds that transform existing content rather than a topic.
	pub fn requires_content(self) -> bool {
		matches!(self, Self::ContentImprovement | Self::SeoAnalysis)
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Length {
	Short,
	#[default]
	Medium,
	Long,
}

/// The visual style of a generated image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Style {
	#[default]
	Realistic,
	Illustration,
	Minimal,
	Vibrant,
	Corporate,
}

/// The dimensions of a generated image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Size {
	#[default]
	#[serde(rename = "1024x1024")]
	Square,
	#[serde(rename = "1792x1024")]
	Landscape,
	#[serde(rename = "1024x1792")]
	Portrait,
}

fn required(code: &'static str, message: &'static str) -> ValidationError {
	let mut error = ValidationError::new(code);

	error.message = Some(message.into());
	error
}

fn validate_request(request: &Request) -> Result<(), ValidationError> {
	let blank = |value: Option<&str>| value.map_or(true, |v| v.trim().is_empty());

	if request.kind.requires_content() {
		if blank(request.content.as_deref()) {
			return Err(required(
				"content_required",
				"content is required for this generation type",
			));
		}
	} else if blank(Some(&request.topic)) {
		return Err(required(
			"topic_required",
			"topic is required for this generation type",
		));
	}

	Ok(())
}

/// A single generation request.
#[derive(Debug, Clone, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_request"))]
pub struct Request {
	/// What to generate.
	#[serde(rename = "type")]
	pub kind: Kind,
	/// The subject of the post.
	#[serde(default)]
	#[validate(length(max = 300))]
	pub topic: String,
	/// Comma-separated keywords to target.
	pub keywords: Option<String>,
	/// The voice of the text, such as `professional` or `friendly`.
	#[validate(length(max = 50))]
	pub tone: Option<String>,
	pub length: Option<Length>,
	/// Existing content, for kinds that transform or summarize it.
	pub content: Option<String>,
	/// Existing excerpt, used for social posts.
	pub excerpt: Option<String>,
	/// Free-form directives appended to the prompt.
	pub additional_instructions: Option<String>,
}

impl Request {
	pub fn new(kind: Kind, topic: impl Into<String>) -> Self {
		Self {
			kind,
			topic: topic.into(),
			keywords: None,
			tone: None,
			length: None,
			content: None,
			excerpt: None,
			additional_instructions: None,
		}
	}
}

/// Everything needed to generate one blog post.
#[derive(Debug, Clone, Default)]
pub struct Brief {
	pub topic: String,
	pub keywords: Option<String>,
	pub tone: Option<String>,
	pub length: Option<Length>,
	/// Used as the fallback tag.
	pub category: String,
	pub instructions: String,
}

/// A generated post payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
	pub content: String,
	pub excerpt: String,
	pub tags: Vec<String>,
}

pub const MAX_TAGS: usize = 8;

/// Parses a comma or newline separated tag list, falling back to the
/// category when nothing usable remains.
pub fn parse_tags(text: &str, fallback: &str) -> Vec<String> {
	let mut tags = Vec::<String>::new();

	for tag in text.split([',', '\n']) {
		let tag = tag.trim().trim_start_matches('#').trim();

		if tag.is_empty() || tags.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
			continue;
		}

		tags.push(tag.to_string());

		if tags.len() == MAX_TAGS {
			break;
		}
	}

	if tags.is_empty() && !fallback.is_empty() {
		tags.push(fallback.to_string());
	}

	tags
}

/// Produces text for a [`Request`].
#[axum::async_trait]
pub trait Generate: Send + Sync {
	async fn generate(&self, request: &Request) -> Result<String, gateway::Error>;

	/// Generates a full post with three independent requests.
	///
	/// The content is required, so its failure fails the whole post. The
	/// excerpt and tags are best-effort and fall back to an empty excerpt
	/// and the category as the only tag.
	async fn compose(&self, brief: &Brief) -> Result<Draft, gateway::Error> {
		let content = self
			.generate(&Request {
				kind: Kind::FullContent,
				topic: brief.topic.clone(),
				keywords: brief.keywords.clone(),
				tone: brief.tone.clone(),
				length: brief.length,
				content: None,
				excerpt: None,
				additional_instructions: Some(brief.instructions.clone())
					.filter(|i| !i.is_empty()),
			})
			.await?;

		let excerpt = self
			.generate(&Request {
				content: Some(content.clone()),
				..Request::new(Kind::Excerpt, brief.topic.clone())
			})
			.await
			.unwrap_or_else(|error| {
				tracing::warn!(%error, topic = %brief.topic, "excerpt generation failed");
				String::new()
			});

		let tags = self
			.generate(&Request {
				content: Some(content.clone()),
				..Request::new(Kind::TagList, brief.topic.clone())
			})
			.await
			.unwrap_or_else(|error| {
				tracing::warn!(%error, topic = %brief.topic, "tag generation failed");
				String::new()
			});

		Ok(Draft {
			content,
			excerpt: excerpt.trim().to_string(),
			tags: parse_tags(&tags, &brief.category),
		})
	}
}

/// A [`Generate`] implementation that prompts the AI gateway.
pub struct Generator {
	gateway: Arc<dyn Gateway>,
}

impl Generator {
	pub fn new(gateway: Arc<dyn Gateway>) -> Self {
		Self { gateway }
	}
}

#[axum::async_trait]
impl Generate for Generator {
	#[tracing::instrument(skip_all, fields(kind = ?request.kind))]
	async fn generate(&self, request: &Request) -> Result<String, gateway::Error> {
		let text = self.gateway.complete(&prompt::messages(request)).await?;
		let text = prompt::strip_fences(&text);

		if text.is_empty() {
			return Err(gateway::Error::Empty);
		}

		Ok(text.to_string())
	}
}
