use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{Fields, ItemStruct};

pub fn expand_slice(input: ItemStruct) -> TokenStream {
    if !input.generics.params.is_empty() {
        return syn::Error::new_spanned(&input.generics, "sapp_slice does not support generics")
            .to_compile_error();
    }

    let ItemStruct { attrs, vis, ident, fields, .. } = &input;
    let inner_ident = format_ident!("{ident}Inner");

    // Unit and tuple structs need the trailing semicolon back.
    let inner_def = match fields {
        Fields::Named(_) => quote! { #vis struct #inner_ident #fields },
        Fields::Unnamed(_) | Fields::Unit => quote! { #vis struct #inner_ident #fields; },
    };

    quote! {
        #(#attrs)*
        #[derive(Debug, Clone)]
        #inner_def

        /// Cheaply cloneable handle to the slice state.
        #[derive(Debug, Clone)]
        #vis struct #ident {
            inner: ::std::sync::Arc<#inner_ident>,
        }

        impl #ident {
            #[must_use]
            pub fn new(inner: #inner_ident) -> Self {
                Self { inner: ::std::sync::Arc::new(inner) }
            }
        }

        impl ::core::convert::From<#inner_ident> for #ident {
            fn from(inner: #inner_ident) -> Self {
                Self::new(inner)
            }
        }

        impl ::std::ops::Deref for #ident {
            type Target = #inner_ident;

            fn deref(&self) -> &Self::Target {
                &self.inner
            }
        }

        impl ::sapp_kernel::domain::registry::FeatureSlice for #ident {
            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }
        }
    }
}
