use std::fmt::Write;

use super::{Kind, Length, Request, Size, Style};
use crate::gateway::ChatMessage;

const SYSTEM: &str = "You are an expert content writer and SEO strategist for a digital \
marketing agency in Guntur, Andhra Pradesh. You write clear, engaging and accurate content \
for small and medium businesses. Never invent statistics or client names.";

pub const DEFAULT_TONE: &str = "professional";

impl Length {
	fn words(self) -> &'static str {
		match self {
			Self::Short => "about 600 words",
			Self::Medium => "about 1200 words",
			Self::Long => "about 2000 words",
		}
	}
}

/// Builds the chat messages for a generation request.
pub fn messages(request: &Request) -> Vec<ChatMessage> {
	let topic = request.topic.trim();
	let tone = request.tone.as_deref().unwrap_or(DEFAULT_TONE);
	let content = request.content.as_deref().unwrap_or_default();

	let mut prompt = match request.kind {
		Kind::FullContent => format!(
			"Write a complete blog post about \"{topic}\" in a {tone} tone, {}.\n\
			Return only HTML using <h2>, <h3>, <p>, <ul>, <li> and <strong> tags. \
			Do not include <html>, <head>, <body> or an <h1> title. \
			End with a short call to action.",
			request.length.unwrap_or_default().words(),
		),
		Kind::TitleOptions => format!(
			"Suggest 5 compelling, SEO-friendly blog post titles about \"{topic}\". \
			Return one title per line with no numbering or quotes."
		),
		Kind::Excerpt => format!(
			"Write a meta description style excerpt of at most 160 characters for a blog post \
			about \"{topic}\". Return plain text only.\n\nPost:\n{}",
			truncate(content, 4000)
		),
		Kind::Outline => format!(
			"Create a detailed outline for a blog post about \"{topic}\" with an introduction, \
			4 to 6 sections with bullet points, and a conclusion. Return HTML using <h2>, <h3>, \
			<ul> and <li> tags."
		),
		Kind::TagList => format!(
			"Suggest 5 to 8 short tags for a blog post about \"{topic}\". \
			Return them as a single comma-separated line with no hashtags.\n\nPost:\n{}",
			truncate(content, 4000)
		),
		Kind::ContentImprovement => format!(
			"Improve the following blog content for readability, flow and SEO while keeping \
			its meaning and HTML structure. Use a {tone} tone. Return only the improved HTML.\n\n{content}"
		),
		Kind::SeoAnalysis => format!(
			"Analyse the following blog content for SEO. Give a score out of 100, then list \
			concrete improvements for keywords, headings, readability, meta description and \
			internal linking. Return HTML using <h3>, <p>, <ul> and <li> tags.\n\n{content}"
		),
		Kind::SocialPost => format!(
			"Write an engaging social media post promoting a blog post about \"{topic}\" \
			in a {tone} tone. Keep it under 280 characters and add 3 relevant hashtags.\n\n{}",
			request.excerpt.as_deref().unwrap_or(truncate(content, 1000))
		),
	};

	if let Some(keywords) = request.keywords.as_deref().filter(|k| !k.trim().is_empty()) {
		let _ = write!(prompt, "\n\nTarget keywords: {}.", keywords.trim());
	}

	if let Some(instructions) = request
		.additional_instructions
		.as_deref()
		.filter(|i| !i.trim().is_empty())
	{
		let _ = write!(prompt, "\n\nAdditional instructions:\n{}", instructions.trim());
	}

	vec![ChatMessage::system(SYSTEM), ChatMessage::user(prompt)]
}

impl Style {
	fn describe(self) -> &'static str {
		match self {
			Self::Realistic => "a photorealistic, high quality photograph",
			Self::Illustration => "a clean digital illustration",
			Self::Minimal => "a minimal, flat design with plenty of negative space",
			Self::Vibrant => "a vibrant, colorful and eye-catching image",
			Self::Corporate => "a polished corporate image suitable for a business website",
		}
	}
}

impl Size {
	fn describe(self) -> &'static str {
		match self {
			Self::Square => "square (1024x1024)",
			Self::Landscape => "landscape (1792x1024)",
			Self::Portrait => "portrait (1024x1792)",
		}
	}
}

/// Builds the prompt for an image request.
pub fn image(prompt: &str, style: Style, size: Size) -> String {
	format!(
		"Create {} in {} format for a marketing blog: {}. Do not include any text or logos in the image.",
		style.describe(),
		size.describe(),
		prompt.trim()
	)
}

/// Removes a surrounding Markdown code fence, which models often add
/// around HTML despite being asked not to.
pub fn strip_fences(text: &str) -> &str {
	let trimmed = text.trim();

	let Some(rest) = trimmed.strip_prefix("```") else {
		return trimmed;
	};

	// Drop the language tag on the opening line.
	let rest = rest.split_once('\n').map_or("", |(_, body)| body);

	rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn truncate(text: &str, max: usize) -> &str {
	match text.char_indices().nth(max) {
		Some((index, _)) => &text[..index],
		None => text,
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::gateway::Role;

	fn request(kind: Kind) -> Request {
		Request {
			kind,
			topic: "Local SEO".into(),
			keywords: Some("seo guntur".into()),
			tone: None,
			length: Some(Length::Long),
			content: Some("<p>body</p>".into()),
			excerpt: None,
			additional_instructions: Some("Link to the services page.".into()),
		}
	}

	#[test]
	fn test_full_content_prompt() {
		let messages = messages(&request(Kind::FullContent));

		assert_eq!(messages.len(), 2);
		assert_eq!(messages[0].role, Role::System);

		let prompt = &messages[1].content;

		assert!(prompt.contains("\"Local SEO\""));
		assert!(prompt.contains("professional tone"));
		assert!(prompt.contains("about 2000 words"));
		assert!(prompt.contains("Target keywords: seo guntur."));
		assert!(prompt.ends_with("Link to the services page."));
	}

	#[test]
	fn test_content_prompts_embed_content() {
		for kind in [Kind::Excerpt, Kind::TagList, Kind::ContentImprovement, Kind::SeoAnalysis] {
			assert!(messages(&request(kind))[1].content.contains("<p>body</p>"));
		}
	}

	#[test]
	fn test_image_prompt() {
		let prompt = image("  a team planning a campaign ", Style::Minimal, Size::Landscape);

		assert!(prompt.starts_with("Create a minimal, flat design"));
		assert!(prompt.contains("landscape (1792x1024)"));
		assert!(prompt.contains("blog: a team planning a campaign."));
	}

	#[test]
	fn test_strip_fences() {
		assert_eq!(strip_fences("```html\n<p>hi</p>\n```"), "<p>hi</p>");
		assert_eq!(strip_fences("```\n<p>hi</p>```"), "<p>hi</p>");
		assert_eq!(strip_fences("  <p>hi</p>\n"), "<p>hi</p>");
	}

	#[test]
	fn test_truncate_respects_chars() {
		assert_eq!(truncate("héllo", 2), "hé");
		assert_eq!(truncate("hi", 10), "hi");
	}
}
