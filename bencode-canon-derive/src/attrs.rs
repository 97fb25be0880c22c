use syn::{spanned::Spanned, Attribute, LitStr};

#[derive(Default, Clone)]
pub(crate) struct FieldAttr {
    pub(crate) rename: Option<LitStr>,
    pub(crate) skip: bool,
    pub(crate) omit_empty: bool,
    pub(crate) flatten: bool,
}

pub(crate) fn ensure_no_bencode_attrs(attrs: &[Attribute], ctx: &str) -> syn::Result<()> {
    for a in attrs {
        if a.path().is_ident("bencode") {
            return Err(syn::Error::new(
                a.span(),
                format!("`#[bencode(...)]` is not supported on {ctx}"),
            ));
        }
    }
    Ok(())
}

pub(crate) fn parse_field_attrs(attrs: &[Attribute]) -> syn::Result<FieldAttr> {
    let mut out = FieldAttr::default();
    let mut span = None;
    for attr in attrs {
        if !attr.path().is_ident("bencode") {
            continue;
        }
        span.get_or_insert_with(|| attr.span());
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                if out.skip {
                    return Err(meta.error("duplicate `bencode(skip)`"));
                }
                out.skip = true;
                return Ok(());
            }
            if meta.path.is_ident("omit_empty") {
                if out.omit_empty {
                    return Err(meta.error("duplicate `bencode(omit_empty)`"));
                }
                out.omit_empty = true;
                return Ok(());
            }
            if meta.path.is_ident("flatten") {
                if out.flatten {
                    return Err(meta.error("duplicate `bencode(flatten)`"));
                }
                out.flatten = true;
                return Ok(());
            }
            if meta.path.is_ident("rename") {
                if out.rename.is_some() {
                    return Err(meta.error("duplicate `bencode(rename=...)`"));
                }
                let lit: LitStr = meta.value()?.parse()?;
                out.rename = Some(lit);
                return Ok(());
            }
            Err(meta.error(
                "unsupported `bencode(...)` field attribute (allowed: rename, skip, omit_empty, flatten)",
            ))
        })?;
    }

    if out.skip && (out.rename.is_some() || out.omit_empty || out.flatten) {
        return Err(syn::Error::new(
            span.unwrap_or_else(proc_macro2::Span::call_site),
            "`bencode(skip)` cannot be combined with other attributes",
        ));
    }

    Ok(out)
}
