use fxhash::FxHashSet;
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{Attribute, Data, DeriveInput, Field, Fields, Ident, Type, Variant};

const CONTEXT_FIELD: &str = "context";
const INTERNAL_VARIANT: &str = "Internal";

/// A single variant of an annotated error enum, reduced to what code generation needs.
struct ErrorVariant<'a> {
    ident: &'a Ident,
    source: Option<(&'a Ident, &'a Type)>,
    has_context: bool,
    cfgs: Vec<&'a Attribute>,
}

impl<'a> ErrorVariant<'a> {
    fn parse(variant: &'a Variant) -> syn::Result<Self> {
        let Fields::Named(fields) = &variant.fields else {
            return Err(syn::Error::new_spanned(
                &variant.ident,
                "sapp_error variants must use named fields (`Variant { .. }`)",
            ));
        };

        let mut has_context = false;
        let mut source = None;

        for field in &fields.named {
            let Some(ident) = field.ident.as_ref() else { continue };

            if ident == CONTEXT_FIELD {
                if !is_context_type(&field.ty) {
                    return Err(syn::Error::new_spanned(
                        &field.ty,
                        "context field must be Option<Cow<'static, str>>",
                    ));
                }
                has_context = true;
            } else if source.is_none() && is_source_field(ident, field) {
                source = Some((ident, &field.ty));
            }
        }

        if source.is_some() && !has_context {
            return Err(syn::Error::new_spanned(
                &variant.ident,
                "sapp_error variants with a source need a `context: Option<Cow<'static, str>>` field",
            ));
        }

        let cfgs = variant.attrs.iter().filter(|attr| attr.path().is_ident("cfg")).collect();

        Ok(Self { ident: &variant.ident, source, has_context, cfgs })
    }

    fn is_internal(&self) -> bool {
        self.ident == INTERNAL_VARIANT
    }

    fn context_arm(&self, name: &Ident) -> Option<TokenStream> {
        if !self.has_context {
            return None;
        }
        let (cfgs, ident) = (&self.cfgs, self.ident);

        Some(quote! {
            #(#cfgs)* #name::#ident { context: slot, .. } => *slot = Some(context.into()),
        })
    }

    /// `From<Source>` plus a context adapter for `Result<T, Source>`.
    fn source_impls(&self, name: &Ident, ext: &Ident) -> Option<TokenStream> {
        if self.is_internal() {
            return None;
        }
        let (field, ty) = self.source?;
        let (cfgs, ident) = (&self.cfgs, self.ident);

        Some(quote! {
            #(#cfgs)*
            #[automatically_derived]
            impl ::core::convert::From<#ty> for #name {
                #[inline]
                fn from(#field: #ty) -> Self {
                    Self::#ident { #field, context: None }
                }
            }

            #(#cfgs)*
            #[automatically_derived]
            impl<T> #ext<T> for ::core::result::Result<T, #ty> {
                #[inline]
                fn context(
                    self,
                    context: impl Into<::std::borrow::Cow<'static, str>>,
                ) -> ::core::result::Result<T, #name> {
                    self.map_err(|#field| #name::#ident { #field, context: Some(context.into()) })
                }
            }
        })
    }

    fn internal_impls(&self, name: &Ident) -> TokenStream {
        let cfgs = &self.cfgs;

        quote! {
            #(#cfgs)*
            #[automatically_derived]
            impl ::core::convert::From<&'static str> for #name {
                #[inline]
                fn from(message: &'static str) -> Self {
                    Self::Internal { message: ::std::borrow::Cow::Borrowed(message), context: None }
                }
            }

            #(#cfgs)*
            #[automatically_derived]
            impl ::core::convert::From<String> for #name {
                #[inline]
                fn from(message: String) -> Self {
                    Self::Internal { message: ::std::borrow::Cow::Owned(message), context: None }
                }
            }
        }
    }
}

pub fn expand_derive(input: DeriveInput) -> TokenStream {
    expand(&input).unwrap_or_else(syn::Error::into_compile_error)
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream> {
    let Data::Enum(data) = &input.data else {
        return Err(syn::Error::new_spanned(&input.ident, "sapp_error can only be applied to enums"));
    };

    let name = &input.ident;
    let vis = &input.vis;
    let ext = format_ident!("{name}Ext");

    let variants =
        data.variants.iter().map(ErrorVariant::parse).collect::<syn::Result<Vec<_>>>()?;

    let derives = missing_derives(input);
    let context_arms = variants.iter().filter_map(|v| v.context_arm(name));
    let source_impls = variants.iter().filter_map(|v| v.source_impls(name, &ext));
    let internal_impls = variants.iter().find(|v| v.is_internal()).map(|v| v.internal_impls(name));

    Ok(quote! {
        #derives
        #input

        /// Attaches a human-readable context to the error of a failing result.
        #vis trait #ext<T> {
            fn context(
                self,
                context: impl Into<::std::borrow::Cow<'static, str>>,
            ) -> ::core::result::Result<T, #name>;
        }

        #[automatically_derived]
        impl<T> #ext<T> for ::core::result::Result<T, #name> {
            #[inline]
            fn context(self, context: impl Into<::std::borrow::Cow<'static, str>>) -> Self {
                self.map_err(|mut err| {
                    match &mut err {
                        #(#context_arms)*
                        _ => {},
                    }
                    err
                })
            }
        }

        #(#source_impls)*
        #internal_impls

        #[allow(dead_code, clippy::ref_option)]
        fn format_context(
            context: &Option<::std::borrow::Cow<'static, str>>,
        ) -> ::std::borrow::Cow<'static, str> {
            context.as_ref().map_or(::std::borrow::Cow::Borrowed(""), |c| {
                ::std::borrow::Cow::Owned(format!(" ({c})"))
            })
        }
    })
}

/// `Debug` and `thiserror::Error`, unless the enum already derives them.
fn missing_derives(input: &DeriveInput) -> TokenStream {
    let mut present = FxHashSet::default();

    for attr in input.attrs.iter().filter(|attr| attr.path().is_ident("derive")) {
        let _ = attr.parse_nested_meta(|meta| {
            if let Some(segment) = meta.path.segments.last() {
                present.insert(segment.ident.to_string());
            }
            Ok(())
        });
    }

    let mut missing = Vec::with_capacity(2);
    if !present.contains("Debug") {
        missing.push(quote! { Debug });
    }
    if !present.contains("Error") {
        missing.push(quote! { ::thiserror::Error });
    }

    if missing.is_empty() { quote! {} } else { quote! { #[derive(#(#missing),*)] } }
}

fn is_source_field(ident: &Ident, field: &Field) -> bool {
    ident == "source"
        || field.attrs.iter().any(|attr| attr.path().is_ident("source") || attr.path().is_ident("from"))
}

/// Accepts `Option<Cow<'static, str>>` with or without `std::` qualified paths.
fn is_context_type(ty: &Type) -> bool {
    let rendered: String = quote!(#ty).to_string().chars().filter(|c| !c.is_whitespace()).collect();

    let normalized = ["::std::option::", "std::option::", "::std::borrow::", "std::borrow::"]
        .iter()
        .fold(rendered, |acc, prefix| acc.replace(prefix, ""));

    normalized == "Option<Cow<'static,str>>"
}
