use std::sync::Arc;

use smallvec::SmallVec;

use crate::codec::BencodeEncode;
use crate::order::sort_keys;

/// Accessor path from a record to one of its (possibly flattened) fields.
///
/// Each element is a field index at one level of nesting; flattening two levels deep yields a path
/// of length two.
pub type FieldPath = SmallVec<[usize; 4]>;

/// Returns true iff `key` is usable as a renamed wire key.
///
/// Valid keys are non-empty and contain only letters, ASCII digits, space and `$ - _ .`.
/// Letters are alphabetic characters that are not also numeric, so `Ⅳ` and `½` are rejected.
#[must_use]
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty() && key.chars().all(is_key_char)
}

fn is_key_char(c: char) -> bool {
    c.is_ascii_digit()
        || (c.is_alphabetic() && !c.is_numeric())
        || matches!(c, ' ' | '$' | '-' | '_' | '.')
}

/// Field attributes as declared on a record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldDecl {
    /// Declared field name.
    pub name: &'static str,
    /// `#[bencode(rename = "...")]`.
    pub rename: Option<&'static str>,
    /// `#[bencode(omit_empty)]`.
    pub omit_empty: bool,
    /// `#[bencode(skip)]`.
    pub skip: bool,
}

impl FieldDecl {
    /// Declare a field by name with no attributes.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            rename: None,
            omit_empty: false,
            skip: false,
        }
    }

    /// Set the rename attribute.
    #[must_use]
    pub const fn rename(mut self, rename: &'static str) -> Self {
        self.rename = Some(rename);
        self
    }

    /// Set the omit-empty attribute.
    #[must_use]
    pub const fn omit_empty(mut self) -> Self {
        self.omit_empty = true;
        self
    }

    /// Set the skip attribute.
    #[must_use]
    pub const fn skip(mut self) -> Self {
        self.skip = true;
        self
    }

    fn valid_rename(&self) -> Option<&'static str> {
        self.rename.filter(|r| is_valid_key(r))
    }

    /// The wire key: a valid rename, otherwise the declared name.
    #[must_use]
    pub fn key(&self) -> &'static str {
        self.valid_rename().unwrap_or(self.name)
    }
}

/// One resolved wire field of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanEntry {
    key: &'static str,
    path: FieldPath,
    omit_empty: bool,
}

impl PlanEntry {
    /// Wire key.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        self.key
    }

    /// Accessor path passed to [`Record::field`].
    #[must_use]
    pub fn path(&self) -> &[usize] {
        &self.path
    }

    /// Whether empty values are dropped.
    #[must_use]
    pub const fn omit_empty(&self) -> bool {
        self.omit_empty
    }
}

/// Resolved encoding plan for a record type.
///
/// `entries` follow declaration order with flattened records spliced in place; `canonical` is the
/// same set ordered by wire key, computed once when the plan is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPlan {
    entries: Vec<PlanEntry>,
    canonical: Vec<usize>,
}

impl FieldPlan {
    /// Start building a plan.
    #[must_use]
    pub const fn builder() -> FieldPlanBuilder {
        FieldPlanBuilder {
            entries: Vec::new(),
        }
    }

    /// Entries in declaration order.
    #[must_use]
    pub fn entries(&self) -> &[PlanEntry] {
        &self.entries
    }

    /// Entries in emission order (byte-wise ascending keys).
    pub fn canonical(&self) -> impl Iterator<Item = &PlanEntry> + '_ {
        self.canonical.iter().map(|&i| &self.entries[i])
    }

    /// Wire keys in emission order.
    #[must_use]
    pub fn keys(&self) -> Vec<&'static str> {
        self.canonical().map(PlanEntry::key).collect()
    }

    /// Number of wire fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the plan has no wire fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builder for [`FieldPlan`], driven by `#[derive(BencodeEncode)]`.
#[derive(Debug, Default)]
pub struct FieldPlanBuilder {
    entries: Vec<PlanEntry>,
}

impl FieldPlanBuilder {
    /// Add a plain field at `index`.
    #[must_use]
    pub fn field(mut self, index: usize, decl: FieldDecl) -> Self {
        if !decl.skip {
            self.entries.push(PlanEntry {
                key: decl.key(),
                path: smallvec::smallvec![index],
                omit_empty: decl.omit_empty,
            });
        }
        self
    }

    /// Add a `#[bencode(flatten)]` field at `index` whose type has the plan `inner`.
    ///
    /// With a valid rename the field is nested under that key instead of being spliced in.
    #[must_use]
    pub fn flatten(mut self, index: usize, decl: FieldDecl, inner: &FieldPlan) -> Self {
        if decl.skip {
            return self;
        }
        if decl.valid_rename().is_some() {
            return self.field(index, decl);
        }
        for entry in &inner.entries {
            let mut path = FieldPath::with_capacity(entry.path.len() + 1);
            path.push(index);
            path.extend_from_slice(&entry.path);
            self.entries.push(PlanEntry {
                key: entry.key,
                path,
                omit_empty: entry.omit_empty,
            });
        }
        self
    }

    /// Finish the plan, computing the emission order.
    #[must_use]
    pub fn build(self) -> FieldPlan {
        let mut order: Vec<(usize, &[u8])> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| (i, e.key.as_bytes()))
            .collect();
        sort_keys(&mut order, |o| o.1);
        let canonical = order.into_iter().map(|(i, _)| i).collect();
        FieldPlan {
            entries: self.entries,
            canonical,
        }
    }
}

/// A struct encoded as a dictionary through a [`FieldPlan`].
///
/// Implemented by `#[derive(BencodeEncode)]` for structs with named fields.
pub trait Record: BencodeEncode {
    /// The cached plan for this type.
    fn field_plan() -> Arc<FieldPlan>
    where
        Self: Sized;

    /// Resolve an accessor path produced by this type's plan.
    fn field(&self, path: &[usize]) -> Option<&dyn BencodeEncode>;
}
