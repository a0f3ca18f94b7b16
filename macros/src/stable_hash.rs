//! Implementation of `#[derive(StableHash)]`

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{Data, DeriveInput, Fields, Index, parse_macro_input};

pub fn derive_impl(item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);

    match generate_code(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Check whether a field carries `#[stable_hash(skip)]`.
fn is_skipped(attrs: &[syn::Attribute]) -> syn::Result<bool> {
    let mut skip = false;
    for attr in attrs {
        if !attr.path().is_ident("stable_hash") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                skip = true;
                Ok(())
            } else {
                Err(meta.error("expected `skip`"))
            }
        })?;
    }
    Ok(skip)
}

/// Emit one `stable_hash` call per hashed field, binding fields through `access`.
fn hash_fields(
    fields: &Fields,
    access: impl Fn(usize, &syn::Field) -> TokenStream2,
) -> syn::Result<Vec<TokenStream2>> {
    let mut calls = Vec::new();
    for (i, field) in fields.iter().enumerate() {
        if is_skipped(&field.attrs)? {
            continue;
        }
        let value = access(i, field);
        calls.push(quote! {
            ::trampoline_core::hash::StableHash::stable_hash(#value, hasher);
        });
    }
    Ok(calls)
}

/// Build the pattern that destructures an enum variant, naming every field.
fn variant_bindings(fields: &Fields) -> (TokenStream2, Vec<syn::Ident>) {
    match fields {
        Fields::Named(named) => {
            let names: Vec<_> = named
                .named
                .iter()
                .enumerate()
                .map(|(i, f)| f.ident.clone().unwrap_or_else(|| format_ident!("__field{}", i)))
                .collect();
            (quote! { { #( #names ),* } }, names)
        }
        Fields::Unnamed(unnamed) => {
            let names: Vec<_> = (0..unnamed.unnamed.len())
                .map(|i| format_ident!("__field{}", i))
                .collect();
            (quote! { ( #( #names ),* ) }, names)
        }
        Fields::Unit => (quote! {}, Vec::new()),
    }
}

fn generate_code(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let type_tag = name.to_string();
    let mut generics = input.generics.clone();
    for param in generics.type_params_mut() {
        param
            .bounds
            .push(syn::parse_quote!(::trampoline_core::hash::StableHash));
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let body = match &input.data {
        Data::Struct(data) => {
            let calls = hash_fields(&data.fields, |i, field| match &field.ident {
                Some(ident) => quote! { &self.#ident },
                None => {
                    let index = Index::from(i);
                    quote! { &self.#index }
                }
            })?;
            quote! {
                hasher.write_tag(#type_tag);
                #( #calls )*
            }
        }
        Data::Enum(data) => {
            let mut arms = Vec::new();
            for (index, variant) in data.variants.iter().enumerate() {
                let variant_name = &variant.ident;
                let index = index as u32;
                let (pattern, bindings) = variant_bindings(&variant.fields);
                let calls = hash_fields(&variant.fields, |i, _| {
                    let binding = &bindings[i];
                    quote! { #binding }
                })?;
                // Skipped fields are still bound by the pattern.
                let allow = if calls.len() < bindings.len() {
                    quote! { #[allow(unused_variables)] }
                } else {
                    quote! {}
                };
                arms.push(quote! {
                    #allow
                    Self::#variant_name #pattern => {
                        hasher.write_u32(#index);
                        #( #calls )*
                    }
                });
            }
            quote! {
                hasher.write_tag(#type_tag);
                match self {
                    #( #arms )*
                }
            }
        }
        Data::Union(data) => {
            return Err(syn::Error::new_spanned(
                data.union_token,
                "StableHash cannot be derived for unions",
            ));
        }
    };

    Ok(quote! {
        impl #impl_generics ::trampoline_core::hash::StableHash for #name #ty_generics #where_clause {
            fn stable_hash(&self, hasher: &mut ::trampoline_core::hash::StableHasher) {
                #body
            }
        }
    })
}
