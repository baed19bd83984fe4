use serde_json::Value as Json;

use super::ast::{CmpOp, Conjunction, ParsedFilter, Predicate, SortDir, SortKey};
use crate::consistency;
use crate::error::{Error, Result};

/// Reserved directive keys. Anything else in a filter is a field predicate.
const DIRECTIVE_KEYS: [&str; 5] = ["$limit", "$skip", "$select", "$sort", "$consistency"];

/// Split a dynamically shaped filter object into compilable predicates and
/// extracted directives.
///
/// Keys are walked in insertion order so the emitted statement text and
/// parameter order are reproducible for a given filter. The collection
/// discriminator `_type` is skipped here; the compiler emits its own
/// authoritative scope predicate, so a caller-supplied value can neither
/// duplicate nor rescope it.
pub fn parse_filter(filter: &Json) -> Result<ParsedFilter> {
    let map = filter
        .as_object()
        .ok_or_else(|| Error::malformed_filter("filter must be an object"))?;

    let mut parsed = ParsedFilter::default();

    for (key, value) in map {
        match key.as_str() {
            "$limit" => parsed.directives.limit = Some(parse_uint("$limit", value)?),
            "$skip" => parsed.directives.skip = Some(parse_uint("$skip", value)?),
            "$select" => parsed.directives.select = Some(parse_select(value)?),
            "$sort" => parsed.directives.sort = parse_sort(value)?,
            "$consistency" => parsed.directives.consistency = consistency::parse_level(value),
            "$or" => parsed.predicates.push(parse_or(value)?),
            "_type" => {}
            field => parsed.predicates.extend(parse_predicates(field, value)?),
        }
    }

    Ok(parsed)
}

/// One `$or` branch: a plain conjunction. Directives have no meaning inside
/// a disjunction and are rejected.
fn parse_fragment(fragment: &Json) -> Result<Conjunction> {
    let map = fragment
        .as_object()
        .ok_or_else(|| Error::malformed_filter("$or fragments must be objects"))?;

    let mut predicates = Vec::new();

    for (key, value) in map {
        match key.as_str() {
            k if DIRECTIVE_KEYS.contains(&k) => {
                return Err(Error::malformed_filter(format!(
                    "{k} is not allowed inside $or"
                )));
            }
            "$or" => predicates.push(parse_or(value)?),
            "_type" => {}
            field => predicates.extend(parse_predicates(field, value)?),
        }
    }

    if predicates.is_empty() {
        return Err(Error::malformed_filter("empty filter fragment in $or"));
    }
    Ok(predicates)
}

/// Predicates for one field key: a bare value is equality, an object is an
/// operator mapping whose entries are ANDed.
fn parse_predicates(field: &str, value: &Json) -> Result<Vec<Predicate>> {
    let ops = match value.as_object() {
        Some(ops) => ops,
        None => {
            return Ok(vec![Predicate::Eq {
                field: field.to_string(),
                value: value.clone(),
            }]);
        }
    };

    if ops.is_empty() {
        return Err(Error::malformed_filter(format!(
            "empty operator object for field {field}"
        )));
    }

    let mut out = Vec::with_capacity(ops.len());
    for (op, operand) in ops {
        match op.as_str() {
            "$ne" => out.push(cmp(field, CmpOp::Ne, operand)),
            "$lt" => out.push(cmp(field, CmpOp::Lt, operand)),
            "$lte" => out.push(cmp(field, CmpOp::Lte, operand)),
            "$gt" => out.push(cmp(field, CmpOp::Gt, operand)),
            "$gte" => out.push(cmp(field, CmpOp::Gte, operand)),
            "$in" => out.push(any_of(field, false, operand)?),
            "$nin" => out.push(any_of(field, true, operand)?),
            "$or" => out.push(parse_or(operand)?),
            other => {
                return Err(Error::unsupported_operator(format!(
                    "{other} on field {field}"
                )));
            }
        }
    }
    Ok(out)
}

fn cmp(field: &str, op: CmpOp, operand: &Json) -> Predicate {
    Predicate::Cmp {
        field: field.to_string(),
        op,
        value: operand.clone(),
    }
}

fn any_of(field: &str, negated: bool, operand: &Json) -> Result<Predicate> {
    let op = if negated { "$nin" } else { "$in" };
    let values = operand
        .as_array()
        .ok_or_else(|| Error::malformed_filter(format!("{op} on field {field} expects an array")))?;
    Ok(Predicate::AnyOf {
        field: field.to_string(),
        negated,
        values: values.clone(),
    })
}

fn parse_or(value: &Json) -> Result<Predicate> {
    let fragments = value
        .as_array()
        .ok_or_else(|| Error::malformed_filter("$or expects an array of filter fragments"))?;
    if fragments.is_empty() {
        return Err(Error::malformed_filter("$or expects at least one fragment"));
    }

    let branches = fragments
        .iter()
        .map(parse_fragment)
        .collect::<Result<Vec<_>>>()?;
    Ok(Predicate::Or(branches))
}

fn parse_uint(key: &str, value: &Json) -> Result<u64> {
    if let Some(n) = value.as_u64() {
        Ok(n)
    } else if value.as_i64().is_some() {
        // Negative values clamp to zero rather than erroring.
        Ok(0)
    } else {
        Err(Error::malformed_filter(format!(
            "{key} expects a non-negative integer"
        )))
    }
}

fn parse_select(value: &Json) -> Result<Vec<String>> {
    let arr = value
        .as_array()
        .ok_or_else(|| Error::malformed_filter("$select expects an array of field names"))?;
    arr.iter()
        .map(|v| {
            v.as_str()
                .map(str::to_string)
                .ok_or_else(|| Error::malformed_filter("$select entries must be strings"))
        })
        .collect()
}

fn parse_sort(value: &Json) -> Result<Vec<SortKey>> {
    let map = value
        .as_object()
        .ok_or_else(|| Error::malformed_filter("$sort expects an object of field: direction"))?;

    let mut keys = Vec::with_capacity(map.len());
    for (field, dir) in map {
        let n = dir.as_f64().ok_or_else(|| {
            Error::malformed_filter(format!("sort direction for {field} must be numeric"))
        })?;
        let dir = if n < 0.0 { SortDir::Desc } else { SortDir::Asc };
        keys.push(SortKey {
            field: field.clone(),
            dir,
        });
    }
    Ok(keys)
}
