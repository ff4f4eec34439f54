mod model;
mod route;

use proc_macro::TokenStream;

/// Generates `<handler>_docs`, the aide transform for a route handler.
///
/// The first line of the handler's doc comment becomes the operation summary
/// and the remaining lines its description. `tag` and `response(status, shape,
/// description)` arguments are added to the operation.
#[proc_macro_attribute]
pub fn route(args: TokenStream, input: TokenStream) -> TokenStream {
	route::from_input(args, input)
}

/// Generates `CreateX` and `UpdateX` input structs next to the model `X`.
///
/// Fields marked `#[serde(skip)]` or `#[serde(skip_deserializing)]` are left out
/// of both. The remaining fields keep their attributes; in `UpdateX` each one is
/// wrapped in an `Option` so omitted fields are left unchanged.
#[proc_macro_attribute]
pub fn model(_args: TokenStream, input: TokenStream) -> TokenStream {
	model::from_input(input)
}
