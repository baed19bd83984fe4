pub mod ast;
pub mod compile;
pub mod parser;

pub use ast::{CmpOp, Conjunction, Directives, ParsedFilter, Predicate, SortDir, SortKey};
pub use compile::{compile, CompiledStatement, Interpretation};
pub use parser::parse_filter;

use serde_json::Value as Json;

use crate::error::Result;

/// Parse and compile a filter in one step.
///
/// Callers that need to adjust directives between parsing and compilation
/// (the service clamps `$limit` against its pagination policy) use
/// [`parse_filter`] and [`compile`] directly.
pub fn interpret(bucket: &str, collection: &str, filter: &Json) -> Result<Interpretation> {
    let ParsedFilter {
        predicates,
        directives,
    } = parser::parse_filter(filter)?;
    let statement = compile::compile(bucket, collection, &predicates, &directives);
    Ok(Interpretation {
        statement,
        directives,
    })
}
