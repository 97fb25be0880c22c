//! Derive macro for `bencode-canon`.
//!
//! `#[derive(BencodeEncode)]` on a struct with named fields implements `Record` and
//! `BencodeEncode`, building a `FieldPlan` from these field attributes:
//!
//! - `#[bencode(rename = "key")]`: wire key, if it is a valid key.
//! - `#[bencode(skip)]`: never encoded.
//! - `#[bencode(omit_empty)]`: dropped when empty.
//! - `#[bencode(flatten)]`: splice the fields of a nested record into this one.
//!
//! Tuple structs encode as lists of their fields. Unit structs have no wire mapping.

extern crate proc_macro;

mod attrs;
mod encode;
mod types;
mod util;

use proc_macro::TokenStream;
use syn::{parse_macro_input, Data, DeriveInput};

use crate::attrs::ensure_no_bencode_attrs;
use crate::encode::encode_struct;

#[proc_macro_derive(BencodeEncode, attributes(bencode))]
pub fn derive_bencode_encode(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let out = match &input.data {
        Data::Struct(data) => ensure_no_bencode_attrs(&input.attrs, "structs")
            .and_then(|()| encode_struct(&input.ident, &input.generics, data))
            .unwrap_or_else(syn::Error::into_compile_error),
        Data::Enum(data) => syn::Error::new(
            data.enum_token.span,
            "BencodeEncode cannot be derived for enums; implement it by hand",
        )
        .to_compile_error(),
        Data::Union(data) => {
            syn::Error::new(data.union_token.span, "BencodeEncode not supported for unions")
                .to_compile_error()
        }
    };
    TokenStream::from(out)
}
