pub use crate::{
	model::{BlogPost, CreateBlogPost, NewBlogPost, UpdateBlogPost},
	route::model::Paginate,
};

impl NewBlogPost {
	/// A draft from admin input, with the given unique slug.
	pub fn from_input(input: CreateBlogPost, slug: String) -> Self {
		Self {
			title: input.title,
			slug,
			content: input.content,
			excerpt: input.excerpt,
			tags: input.tags,
			category: input.category,
			author: input.author,
			cover_image: input.cover_image,
		}
	}
}
