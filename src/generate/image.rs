//! Image generation with persistent storage of the result.

use schemars::JsonSchema;
use serde::Serialize;
use uuid::Uuid;

use super::{prompt, Size, Style};
use crate::{
	gateway::{self, Gateway},
	storage::{self, DataUrl, ObjectStore},
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Gateway(#[from] gateway::Error),
	#[error("failed to store image: {0}")]
	Storage(#[from] storage::Error),
}

/// A generated image.
#[derive(Debug, Serialize, JsonSchema)]
pub struct Image {
	/// The public URL of the stored image.
	pub url: String,
	/// The image inline, as a base64 `data:` URL.
	pub preview: String,
}

/// Generates an image and uploads it to object storage under a random name.
#[tracing::instrument(skip(gateway, storage))]
pub async fn render(
	gateway: &dyn Gateway,
	storage: &dyn ObjectStore,
	description: &str,
	style: Style,
	size: Size,
) -> Result<Image, Error> {
	let preview = gateway
		.image(&prompt::image(description, style, size))
		.await?;
	let data = DataUrl::parse(&preview)?;
	let path = format!("{}.{}", Uuid::new_v4(), data.extension());

	let url = storage.put(&path, &data.content_type, data.bytes).await?;

	tracing::info!(monotonic_counter.images_generated = 1, %url);

	Ok(Image { url, preview })
}

#[cfg(test)]
mod test {
	use std::sync::Mutex;

	use super::*;
	use crate::gateway::ChatMessage;

	struct Painter(&'static str);

	#[axum::async_trait]
	impl Gateway for Painter {
		async fn complete(&self, _: &[ChatMessage]) -> Result<String, gateway::Error> {
			Err(gateway::Error::Empty)
		}

		async fn image(&self, _: &str) -> Result<String, gateway::Error> {
			Ok(self.0.into())
		}
	}

	#[derive(Default)]
	struct Bucket(Mutex<Vec<(String, String, Vec<u8>)>>);

	#[axum::async_trait]
	impl ObjectStore for Bucket {
		async fn put(&self, path: &str, content_type: &str, bytes: Vec<u8>) -> Result<String, storage::Error> {
			self.0
				.lock()
				.unwrap()
				.push((path.into(), content_type.into(), bytes));

			Ok(format!("https://cdn.example/{path}"))
		}
	}

	#[tokio::test]
	async fn test_render_uploads_decoded_image() {
		let bucket = Bucket::default();
		let image = render(
			&Painter("data:image/png;base64,aGVsbG8="),
			&bucket,
			"a storefront",
			Style::Vibrant,
			Size::Square,
		)
		.await
		.unwrap();

		let uploads = bucket.0.lock().unwrap();
		let (path, content_type, bytes) = &uploads[0];

		assert!(path.ends_with(".png"));
		assert_eq!(content_type, "image/png");
		assert_eq!(bytes, b"hello");
		assert_eq!(image.url, format!("https://cdn.example/{path}"));
		assert_eq!(image.preview, "data:image/png;base64,aGVsbG8=");
	}

	#[tokio::test]
	async fn test_render_rejects_non_data_url() {
		let bucket = Bucket::default();
		let result = render(
			&Painter("https://example.com/image.png"),
			&bucket,
			"a storefront",
			Style::default(),
			Size::default(),
		)
		.await;

		assert!(matches!(result, Err(Error::Storage(storage::Error::InvalidDataUrl))));
		assert!(bucket.0.lock().unwrap().is_empty());
	}
}
