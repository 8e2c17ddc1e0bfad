use darling::{FromDeriveInput, FromField, ast};
use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::{ToTokens, quote};
use syn::{Attribute, DeriveInput, Expr, Lit, LitStr, Meta, Type, parse_macro_input};

/// A struct deriving `Configure`. Only structs with named fields are accepted.
#[derive(FromDeriveInput)]
#[darling(supports(struct_named), forward_attrs(doc))]
struct ConfigStruct {
    ident: syn::Ident,
    generics: syn::Generics,
    data: ast::Data<(), ConfigField>,
    attrs: Vec<Attribute>,
}

/// A field with its forwarded `#[config("...")]` and doc attributes.
#[derive(FromField)]
#[darling(forward_attrs(config, doc))]
struct ConfigField {
    ident: Option<syn::Ident>,
    ty: syn::Type,
    attrs: Vec<Attribute>,
}

#[proc_macro_derive(Configure, attributes(config))]
pub fn derive_configure(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.write_errors().into(),
    }
}

fn expand(input: &DeriveInput) -> darling::Result<proc_macro2::TokenStream> {
    let parsed = ConfigStruct::from_derive_input(input)?;
    let name = &parsed.ident;
    let (impl_generics, ty_generics, where_clause) = parsed.generics.split_for_impl();
    let struct_doc_tokens = doc_option_tokens(doc_from_attrs(&parsed.attrs));

    let fields = parsed
        .data
        .take_struct()
        .expect("shape checked by darling")
        .fields;

    let mut errors = darling::Error::accumulator();
    let mut field_specs = Vec::new();
    let mut accessor_arms = Vec::new();

    for (index, f) in fields.iter().enumerate() {
        let ident = f.ident.as_ref().expect("named fields only");
        let fname = LitStr::new(&ident.to_string(), Span::call_site());
        let tag = errors
            .handle(tag_from_attrs(&f.attrs))
            .flatten()
            .unwrap_or_else(|| LitStr::new("", Span::call_site()));
        let doc_tokens = doc_option_tokens(doc_from_attrs(&f.attrs));

        let (kind, variant) = match field_kind(&f.ty) {
            FieldKind::String => (quote! { ::configure::Kind::String }, Some(quote! { String })),
            FieldKind::Bool => (quote! { ::configure::Kind::Bool }, Some(quote! { Bool })),
            FieldKind::Float => (quote! { ::configure::Kind::Float }, Some(quote! { Float })),
            FieldKind::Unsupported(type_name) => {
                let type_lit = LitStr::new(&type_name, Span::call_site());
                (quote! { ::configure::Kind::Unsupported(#type_lit) }, None)
            }
        };

        field_specs.push(quote! {
            ::configure::FieldSpec {
                name: #fname,
                tag: #tag,
                kind: #kind,
                doc: #doc_tokens,
            }
        });

        if let Some(variant) = variant {
            accessor_arms.push(quote! {
                #index => ::core::option::Option::Some(::configure::FieldMut::#variant(&mut self.#ident)),
            });
        }
    }
    errors.finish()?;

    Ok(quote! {
        impl #impl_generics ::configure::Configure for #name #ty_generics #where_clause {
            fn fields() -> &'static [::configure::FieldSpec] {
                const FIELDS: &[::configure::FieldSpec] = &[#(#field_specs),*];
                FIELDS
            }

            fn field_mut(&mut self, index: usize) -> ::core::option::Option<::configure::FieldMut<'_>> {
                match index {
                    #(#accessor_arms)*
                    _ => ::core::option::Option::None,
                }
            }

            fn doc() -> ::core::option::Option<&'static str> {
                #struct_doc_tokens
            }
        }

        impl #impl_generics #name #ty_generics #where_clause {
            /// Bind this config from the process arguments.
            pub fn configure(&mut self) -> ::core::result::Result<(), ::configure::ConfigureError> {
                ::configure::configure(self)
            }

            /// Bind this config from `args` (program name excluded).
            pub fn configure_from<I, S>(&mut self, args: I) -> ::core::result::Result<(), ::configure::ConfigureError>
            where
                I: ::core::iter::IntoIterator<Item = S>,
                S: ::core::convert::Into<::std::string::String>,
            {
                ::configure::configure_from(self, args)
            }

            /// Generated help text listing every config flag.
            pub fn usage() -> ::core::result::Result<::std::string::String, ::configure::ConfigureError> {
                ::configure::usage::<Self>()
            }
        }
    })
}

// ---------- helpers ----------

enum FieldKind {
    String,
    Bool,
    Float,
    Unsupported(String),
}

fn field_kind(ty: &Type) -> FieldKind {
    if is_ident(ty, &["String"]) {
        FieldKind::String
    } else if is_ident(ty, &["bool"]) {
        FieldKind::Bool
    } else if is_ident(ty, &["f64"]) {
        FieldKind::Float
    } else {
        FieldKind::Unsupported(ty.to_token_stream().to_string().replace(' ', ""))
    }
}

/// Matches plain (argument-free) paths whose last segment is one of `names`.
fn is_ident(ty: &Type, names: &[&str]) -> bool {
    if let Type::Path(tp) = ty {
        if tp.qself.is_none() {
            if let Some(seg) = tp.path.segments.last() {
                return seg.arguments.is_empty() && names.iter().any(|n| seg.ident == *n);
            }
        }
    }
    false
}

/// Extract the tag literal from `#[config("name,required")]`.
fn tag_from_attrs(attrs: &[Attribute]) -> darling::Result<Option<LitStr>> {
    let mut found: Option<LitStr> = None;
    for attr in attrs.iter().filter(|a| a.path().is_ident("config")) {
        let lit: LitStr = attr.parse_args().map_err(darling::Error::from)?;
        if found.is_some() {
            return Err(darling::Error::custom("duplicate `config` attribute").with_span(attr));
        }
        found = Some(lit);
    }
    Ok(found)
}

fn doc_from_attrs(attrs: &[Attribute]) -> Option<String> {
    let mut docs = Vec::new();
    for attr in attrs {
        if let Meta::NameValue(nv) = &attr.meta {
            if nv.path.is_ident("doc") {
                if let Expr::Lit(expr_lit) = &nv.value {
                    if let Lit::Str(lit_str) = &expr_lit.lit {
                        let line = lit_str.value().trim().to_string();
                        if !line.is_empty() {
                            docs.push(line);
                        }
                    }
                }
            }
        }
    }
    if docs.is_empty() {
        None
    } else {
        Some(docs.join("\n"))
    }
}

fn doc_option_tokens(doc: Option<String>) -> proc_macro2::TokenStream {
    match doc {
        Some(text) => {
            let lit = LitStr::new(&text, Span::call_site());
            quote! { ::core::option::Option::Some(#lit) }
        }
        None => quote! { ::core::option::Option::None },
    }
}
