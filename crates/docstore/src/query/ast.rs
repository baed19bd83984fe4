use serde_json::Value as Json;

use crate::consistency::ConsistencyLevel;

/// Binary comparison operators on a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl CmpOp {
    /// Statement fragment for this operator.
    pub fn symbol(self) -> &'static str {
        match self {
            CmpOp::Ne => "!=",
            CmpOp::Lt => "<",
            CmpOp::Lte => "<=",
            CmpOp::Gt => ">",
            CmpOp::Gte => ">=",
        }
    }
}

/// A conjunction: every predicate must hold.
pub type Conjunction = Vec<Predicate>;

/// Predicate tree compiled into the statement's WHERE clause.
///
/// Field names are carried verbatim; only the attached values become bound
/// parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `field = ?`
    Eq { field: String, value: Json },
    /// `field <op> ?`
    Cmp {
        field: String,
        op: CmpOp,
        value: Json,
    },
    /// `field IN ?` / `field NOT IN ?`, bound to the whole operand list.
    AnyOf {
        field: String,
        negated: bool,
        values: Vec<Json>,
    },
    /// Parenthesized disjunction of conjunctions.
    Or(Vec<Conjunction>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDir {
    Asc,
    Desc,
}

impl SortDir {
    pub fn symbol(self) -> &'static str {
        match self {
            SortDir::Asc => "ASC",
            SortDir::Desc => "DESC",
        }
    }
}

/// One ORDER BY key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub dir: SortDir,
}

/// Reserved directive keys extracted from a filter. Never compiled as
/// predicates; `limit`/`skip` surface here so the caller can clamp them
/// before the statement is emitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Directives {
    pub limit: Option<u64>,
    pub skip: Option<u64>,
    pub select: Option<Vec<String>>,
    pub sort: Vec<SortKey>,
    pub consistency: Option<ConsistencyLevel>,
}

/// A filter split into its two halves: compilable predicates and extracted
/// directives.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedFilter {
    pub predicates: Vec<Predicate>,
    pub directives: Directives,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn cmp_op_symbols_match_the_statement_language() {
        assert_eq!(CmpOp::Ne.symbol(), "!=");
        assert_eq!(CmpOp::Lt.symbol(), "<");
        assert_eq!(CmpOp::Lte.symbol(), "<=");
        assert_eq!(CmpOp::Gt.symbol(), ">");
        assert_eq!(CmpOp::Gte.symbol(), ">=");
    }

    #[test]
    fn sort_dir_symbols() {
        assert_eq!(SortDir::Asc.symbol(), "ASC");
        assert_eq!(SortDir::Desc.symbol(), "DESC");
    }

    #[test]
    fn directives_default_is_empty() {
        let d = Directives::default();
        assert!(d.limit.is_none());
        assert!(d.skip.is_none());
        assert!(d.select.is_none());
        assert!(d.sort.is_empty());
        assert!(d.consistency.is_none());
    }

    #[test]
    fn predicates_compare_structurally() {
        let a = Predicate::Eq {
            field: "roomId".into(),
            value: json!(5),
        };
        let b = Predicate::Eq {
            field: "roomId".into(),
            value: json!(5),
        };
        assert_eq!(a, b);

        let or = Predicate::Or(vec![vec![a.clone()], vec![b]]);
        match or {
            Predicate::Or(branches) => assert_eq!(branches.len(), 2),
            other => panic!("expected Or, got: {other:?}"),
        }
    }
}
