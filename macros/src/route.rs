use darling::{ast, FromMeta};
use proc_macro::TokenStream;
use quote::{format_ident, quote};

#[derive(FromMeta)]
struct RouteArgs {
	#[darling(multiple)]
	tag: Vec<syn::Expr>,
	#[darling(multiple)]
	response: Vec<ResponseArgs>,
}

#[derive(FromMeta)]
struct ResponseArgs {
	status: syn::LitInt,
	shape: Option<syn::Type>,
	description: Option<String>,
}

pub fn from_input(args: TokenStream, input: TokenStream) -> TokenStream {
	let args = match ast::NestedMeta::parse_meta_list(args.into()) {
		Ok(args) => args,
		Err(error) => return error.into_compile_error().into(),
	};

	let args = match RouteArgs::from_list(&args) {
		Ok(args) => args,
		Err(error) => return error.write_errors().into(),
	};

	let function = syn::parse_macro_input!(input as syn::ItemFn);

	let Some(Docs {
		summary,
		description,
	}) = Docs::from_attrs(&function.attrs)
	else {
		return syn::Error::new(
			function.sig.ident.span(),
			"route handlers need a doc comment, its first line is the operation summary",
		)
		.into_compile_error()
		.into();
	};

	let docs_ident = format_ident!("{}_docs", function.sig.ident);
	let vis = &function.vis;

	let description = description.map(|description| quote!(.description(#description)));
	let tags = args.tag.iter();
	let responses = args.response.into_iter().map(|response| {
		let status = response.status;
		let shape = response
			.shape
			.map_or_else(|| quote!(()), |shape| quote!(#shape));

		match response.description {
			Some(description) => quote! {
				.response_with::<#status, #shape, _>(|res| res.description(#description))
			},
			None => quote! {
				.response::<#status, #shape>()
			},
		}
	});

	quote! {
		#function

		#vis fn #docs_ident(op: aide::transform::TransformOperation) -> aide::transform::TransformOperation {
			op.summary(#summary)
				#description
				#(.tag(#tags))*
				#(#responses)*
		}
	}
	.into()
}

/// The operation text taken from a handler's doc comment.
struct Docs {
	summary: String,
	description: Option<String>,
}

impl Docs {
	fn from_attrs(attrs: &[syn::Attribute]) -> Option<Self> {
		let lines = attrs
			.iter()
			.filter_map(|attr| {
				let syn::Meta::NameValue(meta) = &attr.meta else {
					return None;
				};

				if !meta.path.is_ident("doc") {
					return None;
				}

				match &meta.value {
					syn::Expr::Lit(syn::ExprLit {
						lit: syn::Lit::Str(literal),
						..
					}) => Some(literal.value().trim().to_owned()),
					_ => None,
				}
			})
			.collect::<Vec<_>>();

		let mut lines = lines.iter().skip_while(|line| line.is_empty());
		let summary = lines.next()?.clone();

		// The description keeps paragraph breaks but joins wrapped lines.
		let description = lines
			.map(String::as_str)
			.collect::<Vec<_>>()
			.join("\n")
			.trim()
			.split("\n\n")
			.map(|paragraph| paragraph.replace('\n', " "))
			.collect::<Vec<_>>()
			.join("\n\n");

		Some(Self {
			summary,
			description: (!description.is_empty()).then_some(description),
		})
	}
}
