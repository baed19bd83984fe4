use serde_json::{json, Value as Json};
use tracing::debug;

use super::ast::{Conjunction, Directives, Predicate};

/// An executable statement: text plus its ordered bound parameters.
///
/// Every predicate value (and the limit/skip, when present) is a positional
/// `?` parameter. Field names are concatenated into the text verbatim —
/// callers own field-name hygiene.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledStatement {
    text: String,
    params: Vec<Json>,
}

impl CompiledStatement {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn params(&self) -> &[Json] {
        &self.params
    }
}

/// A compiled filter: the statement plus the directives extracted alongside
/// it (projection, pagination, consistency — none of which live in the text
/// except as the LIMIT/OFFSET parameters).
#[derive(Debug, Clone, PartialEq)]
pub struct Interpretation {
    pub statement: CompiledStatement,
    pub directives: Directives,
}

/// Render predicates and directives into one read statement scoped to a
/// collection inside a bucket.
///
/// The `_type = ?` scope predicate is always emitted first; predicates are
/// ANDed in their parsed order, so parameter order follows the filter's
/// insertion order.
pub fn compile(
    bucket: &str,
    collection: &str,
    predicates: &[Predicate],
    directives: &Directives,
) -> CompiledStatement {
    let mut params = Vec::new();
    let mut clauses = Vec::with_capacity(predicates.len() + 1);

    clauses.push("_type = ?".to_string());
    params.push(Json::String(collection.to_string()));

    for predicate in predicates {
        clauses.push(fragment(predicate, &mut params));
    }

    let mut text = format!(
        "SELECT `{bucket}`.* FROM `{bucket}` WHERE {}",
        clauses.join(" AND ")
    );

    if !directives.sort.is_empty() {
        let keys: Vec<String> = directives
            .sort
            .iter()
            .map(|k| format!("{} {}", k.field, k.dir.symbol()))
            .collect();
        text.push_str(" ORDER BY ");
        text.push_str(&keys.join(", "));
    }
    if let Some(limit) = directives.limit {
        text.push_str(" LIMIT ?");
        params.push(json!(limit));
    }
    if let Some(skip) = directives.skip {
        text.push_str(" OFFSET ?");
        params.push(json!(skip));
    }

    debug!(statement = %text, params = params.len(), "compiled filter");
    CompiledStatement { text, params }
}

fn fragment(predicate: &Predicate, params: &mut Vec<Json>) -> String {
    match predicate {
        Predicate::Eq { field, value } => {
            params.push(value.clone());
            format!("{field} = ?")
        }
        Predicate::Cmp { field, op, value } => {
            params.push(value.clone());
            format!("{field} {} ?", op.symbol())
        }
        Predicate::AnyOf {
            field,
            negated,
            values,
        } => {
            params.push(Json::Array(values.clone()));
            if *negated {
                format!("{field} NOT IN ?")
            } else {
                format!("{field} IN ?")
            }
        }
        Predicate::Or(branches) => {
            let rendered: Vec<String> = branches
                .iter()
                .map(|conj| conjunction(conj, params))
                .collect();
            format!("({})", rendered.join(" OR "))
        }
    }
}

fn conjunction(conj: &Conjunction, params: &mut Vec<Json>) -> String {
    if conj.len() == 1 {
        fragment(&conj[0], params)
    } else {
        let parts: Vec<String> = conj.iter().map(|p| fragment(p, params)).collect();
        format!("({})", parts.join(" AND "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::parser::parse_filter;
    use serde_json::json;

    fn compiled(filter: Json) -> CompiledStatement {
        let parsed = parse_filter(&filter).expect("parse_filter failed");
        compile("app", "messages", &parsed.predicates, &parsed.directives)
    }

    // ─────────────────────────────────────────────────────────────
    // scope predicate and basic equality
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn empty_filter_compiles_to_the_scope_predicate_alone() {
        let stmt = compiled(json!({}));
        assert_eq!(
            stmt.text(),
            "SELECT `app`.* FROM `app` WHERE _type = ?"
        );
        assert_eq!(stmt.params(), &[json!("messages")]);
    }

    #[test]
    fn equality_predicates_follow_the_scope_in_insertion_order() {
        let stmt = compiled(json!({ "roomId": 5, "author": "alice" }));
        assert_eq!(
            stmt.text(),
            "SELECT `app`.* FROM `app` WHERE _type = ? AND roomId = ? AND author = ?"
        );
        assert_eq!(stmt.params(), &[json!("messages"), json!(5), json!("alice")]);
    }

    #[test]
    fn user_supplied_type_cannot_rescope_the_statement() {
        let stmt = compiled(json!({ "_type": "rooms" }));
        assert_eq!(
            stmt.text(),
            "SELECT `app`.* FROM `app` WHERE _type = ?"
        );
        assert_eq!(stmt.params(), &[json!("messages")]);
    }

    // ─────────────────────────────────────────────────────────────
    // operators
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn comparison_operators_emit_their_symbols() {
        let stmt = compiled(json!({
            "age": { "$gt": 18, "$lte": 65, "$ne": 40 }
        }));
        assert_eq!(
            stmt.text(),
            "SELECT `app`.* FROM `app` WHERE _type = ? AND age > ? AND age <= ? AND age != ?"
        );
        assert_eq!(
            stmt.params(),
            &[json!("messages"), json!(18), json!(65), json!(40)]
        );
    }

    #[test]
    fn membership_binds_the_whole_operand_list_as_one_parameter() {
        let stmt = compiled(json!({
            "kind": { "$in": ["post", "page"], "$nin": ["draft"] }
        }));
        assert_eq!(
            stmt.text(),
            "SELECT `app`.* FROM `app` WHERE _type = ? AND kind IN ? AND kind NOT IN ?"
        );
        assert_eq!(
            stmt.params(),
            &[
                json!("messages"),
                json!(["post", "page"]),
                json!(["draft"]),
            ]
        );
    }

    #[test]
    fn or_renders_a_parenthesized_disjunction() {
        let stmt = compiled(json!({
            "$or": [
                { "kind": "post" },
                { "kind": "page", "views": { "$gt": 10 } }
            ]
        }));
        assert_eq!(
            stmt.text(),
            "SELECT `app`.* FROM `app` WHERE _type = ? AND \
             (kind = ? OR (kind = ? AND views > ?))"
        );
        assert_eq!(
            stmt.params(),
            &[json!("messages"), json!("post"), json!("page"), json!(10)]
        );
    }

    #[test]
    fn nested_or_parenthesizes_recursively() {
        let stmt = compiled(json!({
            "$or": [
                { "$or": [ { "a": 1 }, { "b": 2 } ] },
                { "c": 3 }
            ]
        }));
        assert_eq!(
            stmt.text(),
            "SELECT `app`.* FROM `app` WHERE _type = ? AND ((a = ? OR b = ?) OR c = ?)"
        );
        assert_eq!(
            stmt.params(),
            &[json!("messages"), json!(1), json!(2), json!(3)]
        );
    }

    // ─────────────────────────────────────────────────────────────
    // directives
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn sort_limit_and_skip_trail_the_where_clause() {
        let stmt = compiled(json!({
            "roomId": 5,
            "$sort": { "createdAt": -1, "text": 1 },
            "$limit": 10,
            "$skip": 20
        }));
        assert_eq!(
            stmt.text(),
            "SELECT `app`.* FROM `app` WHERE _type = ? AND roomId = ? \
             ORDER BY createdAt DESC, text ASC LIMIT ? OFFSET ?"
        );
        // Limit/skip parameters come after every predicate parameter.
        assert_eq!(
            stmt.params(),
            &[json!("messages"), json!(5), json!(10), json!(20)]
        );
    }

    #[test]
    fn skip_is_emitted_without_a_limit() {
        let stmt = compiled(json!({ "$skip": 3 }));
        assert_eq!(
            stmt.text(),
            "SELECT `app`.* FROM `app` WHERE _type = ? OFFSET ?"
        );
        assert_eq!(stmt.params(), &[json!("messages"), json!(3)]);
    }

    #[test]
    fn select_and_consistency_never_touch_the_statement() {
        let stmt = compiled(json!({
            "roomId": 5,
            "$select": ["text"],
            "$consistency": "STATEMENT_PLUS"
        }));
        assert_eq!(
            stmt.text(),
            "SELECT `app`.* FROM `app` WHERE _type = ? AND roomId = ?"
        );
        assert_eq!(stmt.params(), &[json!("messages"), json!(5)]);
    }

    #[test]
    fn same_filter_compiles_to_identical_output() {
        let filter = json!({ "a": 1, "b": { "$in": [1, 2] }, "$sort": { "a": 1 } });
        let first = compiled(filter.clone());
        let second = compiled(filter);
        assert_eq!(first, second);
    }
}
