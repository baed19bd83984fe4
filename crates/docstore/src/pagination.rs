use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::query::Directives;

/// Per-collection pagination policy. When configured, `find` substitutes the
/// default, clamps against `max` before the statement executes, and wraps
/// results in a [`Page`] envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paginate {
    pub default: u64,
    pub max: u64,
}

impl Paginate {
    /// Effective limit: the requested value (or this policy's default)
    /// clamped to `[0, max]`.
    pub fn clamp(&self, requested: Option<u64>) -> u64 {
        requested.unwrap_or(self.default).min(self.max)
    }
}

/// Envelope returned by a paginated `find`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub total: u64,
    pub limit: u64,
    pub skip: u64,
    pub data: Vec<Json>,
}

/// A `find` result: a bare sequence when no pagination policy applies, an
/// envelope otherwise. Serializes untagged so HTTP layers can return either
/// shape directly.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FindResult {
    Items(Vec<Json>),
    Page(Page),
}

impl FindResult {
    /// The rows regardless of envelope shape.
    pub fn data(&self) -> &[Json] {
        match self {
            FindResult::Items(rows) => rows,
            FindResult::Page(page) => &page.data,
        }
    }
}

/// Wrap query rows per the effective policy. By the time this runs the
/// limit in `directives` has already been substituted and clamped.
pub fn wrap(
    policy: Option<&Paginate>,
    directives: &Directives,
    total: u64,
    rows: Vec<Json>,
) -> FindResult {
    match policy {
        None => FindResult::Items(rows),
        Some(_) => FindResult::Page(Page {
            total,
            limit: directives.limit.unwrap_or(0),
            skip: directives.skip.unwrap_or(0),
            data: rows,
        }),
    }
}
