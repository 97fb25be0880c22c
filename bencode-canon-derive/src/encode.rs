use proc_macro2::{Literal, TokenStream};
use quote::quote;
use syn::{DataStruct, Fields, FieldsNamed, FieldsUnnamed, Generics, Ident, Type};

use crate::attrs::{ensure_no_bencode_attrs, parse_field_attrs};
use crate::types::type_mentions_self;
use crate::util::{add_where_bound, empty_where_clause};

struct Bounds<'a> {
    encode: Vec<&'a Type>,
    record: Vec<&'a Type>,
}

impl Bounds<'_> {
    fn where_clause(&self, generics: &Generics) -> Option<syn::WhereClause> {
        let mut wc = generics.where_clause.clone();
        if self.encode.is_empty() && self.record.is_empty() {
            return wc;
        }
        let clause = wc.get_or_insert_with(empty_where_clause);
        for ty in &self.encode {
            add_where_bound(clause, ty, quote!(::bencode_canon::BencodeEncode));
        }
        for ty in &self.record {
            add_where_bound(clause, ty, quote!(::bencode_canon::Record));
        }
        wc
    }
}

pub(crate) fn encode_struct(
    name: &Ident,
    generics: &Generics,
    data: &DataStruct,
) -> syn::Result<TokenStream> {
    match &data.fields {
        Fields::Named(fields) => encode_record(name, generics, fields),
        Fields::Unnamed(fields) => encode_tuple(name, generics, fields),
        Fields::Unit => {
            let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
            let shape = name.to_string();
            Ok(quote! {
                impl #impl_generics ::bencode_canon::BencodeEncode for #name #ty_generics #where_clause {
                    fn encode(&self, enc: &mut ::bencode_canon::Encoder) -> ::core::result::Result<(), ::bencode_canon::BencodeError> {
                        ::core::result::Result::Err(::bencode_canon::BencodeError::unsupported(#shape, enc.len()))
                    }
                }

                impl #impl_generics ::bencode_canon::ListElem for #name #ty_generics #where_clause {}
            })
        }
    }
}

fn encode_record(
    name: &Ident,
    generics: &Generics,
    fields: &FieldsNamed,
) -> syn::Result<TokenStream> {
    let mut bounds = Bounds {
        encode: Vec::new(),
        record: Vec::new(),
    };
    let mut plan_steps = Vec::new();
    let mut arms = Vec::new();

    for (idx, field) in fields.named.iter().enumerate() {
        let attr = parse_field_attrs(&field.attrs)?;
        let Some(f_ident) = field.ident.as_ref() else {
            continue;
        };
        let lit_idx = Literal::usize_unsuffixed(idx);
        let decl_name = f_ident.to_string();
        let decl_name = decl_name.strip_prefix("r#").unwrap_or(&decl_name).to_owned();

        let mut decl = quote!(::bencode_canon::FieldDecl::new(#decl_name));
        if let Some(rename) = &attr.rename {
            decl = quote!(#decl.rename(#rename));
        }
        if attr.omit_empty {
            decl = quote!(#decl.omit_empty());
        }
        if attr.skip {
            plan_steps.push(quote!(.field(#lit_idx, #decl.skip())));
            continue;
        }

        let ty = &field.ty;
        let mentions_self = type_mentions_self(ty, name);
        if attr.flatten {
            if mentions_self {
                return Err(syn::Error::new_spanned(
                    ty,
                    "`bencode(flatten)` cannot refer to the type being derived",
                ));
            }
            bounds.record.push(ty);
            plan_steps.push(quote! {
                .flatten(#lit_idx, #decl, &<#ty as ::bencode_canon::Record>::field_plan())
            });
            arms.push(quote! {
                [#lit_idx] => ::core::option::Option::Some(&self.#f_ident),
                [#lit_idx, rest @ ..] => ::bencode_canon::Record::field(&self.#f_ident, rest),
            });
        } else {
            if !mentions_self {
                bounds.encode.push(ty);
            }
            plan_steps.push(quote!(.field(#lit_idx, #decl)));
            arms.push(quote! {
                [#lit_idx] => ::core::option::Option::Some(&self.#f_ident),
            });
        }
    }

    let (impl_generics, ty_generics, _) = generics.split_for_impl();
    let where_clause = bounds.where_clause(generics);

    let build = quote! {
        ::bencode_canon::FieldPlan::builder()
            #(#plan_steps)*
            .build()
    };
    let field_plan = if generics.params.is_empty() {
        quote! {
            static PLAN: ::std::sync::OnceLock<::std::sync::Arc<::bencode_canon::FieldPlan>> =
                ::std::sync::OnceLock::new();
            ::std::sync::Arc::clone(PLAN.get_or_init(|| ::std::sync::Arc::new(#build)))
        }
    } else {
        // A fn-local static is shared by every instantiation, so generic plans are rebuilt.
        quote! {
            ::std::sync::Arc::new(#build)
        }
    };

    Ok(quote! {
        impl #impl_generics ::bencode_canon::Record for #name #ty_generics #where_clause {
            fn field_plan() -> ::std::sync::Arc<::bencode_canon::FieldPlan> {
                #field_plan
            }

            fn field(&self, path: &[usize]) -> ::core::option::Option<&dyn ::bencode_canon::BencodeEncode> {
                match path {
                    #(#arms)*
                    _ => ::core::option::Option::None,
                }
            }
        }

        impl #impl_generics ::bencode_canon::BencodeEncode for #name #ty_generics #where_clause {
            fn encode(&self, enc: &mut ::bencode_canon::Encoder) -> ::core::result::Result<(), ::bencode_canon::BencodeError> {
                enc.record(self)
            }
        }

        impl #impl_generics ::bencode_canon::ListElem for #name #ty_generics #where_clause {}
    })
}

fn encode_tuple(
    name: &Ident,
    generics: &Generics,
    fields: &FieldsUnnamed,
) -> syn::Result<TokenStream> {
    let mut bounds = Bounds {
        encode: Vec::new(),
        record: Vec::new(),
    };
    let mut items = Vec::new();

    for (idx, field) in fields.unnamed.iter().enumerate() {
        ensure_no_bencode_attrs(&field.attrs, "tuple struct fields")?;
        let index = syn::Index::from(idx);
        if !type_mentions_self(&field.ty, name) {
            bounds.encode.push(&field.ty);
        }
        items.push(quote! { l.value(&self.#index)?; });
    }

    let (impl_generics, ty_generics, _) = generics.split_for_impl();
    let where_clause = bounds.where_clause(generics);

    Ok(quote! {
        impl #impl_generics ::bencode_canon::BencodeEncode for #name #ty_generics #where_clause {
            fn encode(&self, enc: &mut ::bencode_canon::Encoder) -> ::core::result::Result<(), ::bencode_canon::BencodeError> {
                enc.list(|l| {
                    #(#items)*
                    ::core::result::Result::Ok(())
                })
            }
        }

        impl #impl_generics ::bencode_canon::ListElem for #name #ty_generics #where_clause {}
    })
}
