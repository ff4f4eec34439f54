use darling::{ast, FromDeriveInput, FromField};
use proc_macro2::TokenTree;
use quote::{format_ident, quote, ToTokens};
use syn::{punctuated::Punctuated, Meta, Token};

#[derive(Debug, FromDeriveInput)]
#[darling(supports(struct_named), forward_attrs)]
struct ModelReceiver {
	ident: syn::Ident,
	generics: syn::Generics,
	data: ast::Data<(), FieldReceiver>,
	attrs: Vec<syn::Attribute>,
}

#[derive(Debug, FromField)]
#[darling(forward_attrs)]
struct FieldReceiver {
	ident: Option<syn::Ident>,
	ty: syn::Type,
	vis: syn::Visibility,
	attrs: Vec<syn::Attribute>,
}

/// Derives that only make sense on the stored model.
const MODEL_ONLY_DERIVES: &[&str] = &["FromRow"];

pub fn from_input(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
	let input = syn::parse_macro_input!(input as syn::DeriveInput);
	let receiver = match ModelReceiver::from_derive_input(&input) {
		Ok(receiver) => receiver,
		Err(error) => return error.write_errors().into(),
	};

	let ident = &receiver.ident;
	let vis = &input.vis;
	let generics = &receiver.generics;
	let create_ident = format_ident!("Create{}", ident);
	let update_ident = format_ident!("Update{}", ident);
	let create_doc = format!("The fields accepted when creating a [`{ident}`].");
	let update_doc =
		format!("The fields accepted when updating a [`{ident}`]. Omitted fields are unchanged.");

	let attrs = receiver
		.attrs
		.iter()
		.filter(|attr| !attr.path().is_ident("doc"))
		.map(input_attr)
		.collect::<Vec<_>>();

	let Some(fields) = receiver.data.take_struct() else {
		return syn::Error::new(ident.span(), "#[model] only supports structs with named fields")
			.into_compile_error()
			.into();
	};

	let fields = fields
		.iter()
		.filter(|field| !field.attrs.iter().any(is_serde_skip))
		.filter_map(|field| Some((field, field.ident.as_ref()?)))
		.collect::<Vec<_>>();

	let create_fields = fields.iter().map(|(field, ident)| {
		let FieldReceiver { ty, vis, attrs, .. } = field;

		quote! {
			#(#attrs)*
			#vis #ident: #ty,
		}
	});

	let update_fields = fields.iter().map(|(field, ident)| {
		let FieldReceiver { ty, vis, attrs, .. } = field;

		// Optional fields are already optional in an update.
		let ty = if is_option(ty) {
			quote!(#ty)
		} else {
			quote!(Option<#ty>)
		};

		quote! {
			#(#attrs)*
			#vis #ident: #ty,
		}
	});

	quote! {
		#input

		#[doc = #create_doc]
		#(#attrs)*
		#vis struct #create_ident #generics {
			#(#create_fields)*
		}

		#[doc = #update_doc]
		#(#attrs)*
		#vis struct #update_ident #generics {
			#(#update_fields)*
		}
	}
	.into()
}

/// Whether a field carries `#[serde(skip)]` or `#[serde(skip_deserializing)]`.
fn is_serde_skip(attr: &syn::Attribute) -> bool {
	let Meta::List(ref list) = attr.meta else {
		return false;
	};

	list.path.is_ident("serde")
		&& list.tokens.to_token_stream().into_iter().any(|token| {
			matches!(token, TokenTree::Ident(ref ident) if ident == "skip" || ident == "skip_deserializing")
		})
}

fn is_option(ty: &syn::Type) -> bool {
	let syn::Type::Path(path) = ty else {
		return false;
	};

	path.qself.is_none()
		&& path
			.path
			.segments
			.last()
			.is_some_and(|segment| segment.ident == "Option")
}

/// Copies a struct attribute onto the input structs, dropping derives
/// that only apply to the stored model.
fn input_attr(attr: &syn::Attribute) -> proc_macro2::TokenStream {
	if !attr.path().is_ident("derive") {
		return attr.to_token_stream();
	}

	let Ok(paths) = attr.parse_args_with(Punctuated::<syn::Path, Token![,]>::parse_terminated)
	else {
		return attr.to_token_stream();
	};

	let paths = paths.into_iter().filter(|path| {
		path.segments
			.last()
			.map_or(true, |segment| !MODEL_ONLY_DERIVES.iter().any(|name| segment.ident == name))
	});

	quote!(#[derive(#(#paths),*)])
}
