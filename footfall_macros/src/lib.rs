//! Attribute macros for footfall's measurement types.
//!
//! `#[metric]` and `#[aggregate]` stamp the derive bundle every sample and
//! collector type needs (serde round-tripping, comparison, `Debug`, `Clone`)
//! so the simulator's data types stay one-line declarations.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{ItemStruct, parse_macro_input};

extern crate proc_macro;

fn derive_bundle(ast: &ItemStruct) -> TokenStream2 {
    quote! {
        #[derive(
            serde::Serialize,
            serde::Deserialize,
            std::cmp::PartialOrd,
            std::cmp::PartialEq,
            std::fmt::Debug,
            std::clone::Clone
        )]
        #ast
    }
}

/// Mark a struct as a latency/measurement sample and implement `Metric` for it.
#[proc_macro_attribute]
pub fn metric(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(item as ItemStruct);
    let ident = &ast.ident;
    let bundle = derive_bundle(&ast);
    let expanded = quote! {
        #bundle

        impl Metric for #ident {}
    };

    TokenStream::from(expanded)
}

/// Mark a struct as a metric collector. The `Aggregate` impl itself stays
/// hand-written; this only attaches the derive bundle.
#[proc_macro_attribute]
pub fn aggregate(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(item as ItemStruct);
    let expanded = derive_bundle(&ast);

    TokenStream::from(expanded)
}
