//! SoQL fragment construction: literal escaping, column allow-lists,
//! predicate composition, and query-parameter assembly.
//!
//! Every caller-supplied string passes through [`escape_literal`] before it is
//! embedded in a SoQL expression. Column identifiers are never escaped, only
//! allow-listed: there is no safe quoting for identifiers in this grammar.

use crate::models::SortOrder;

/// Columns accepted in `$order`. Anything outside this list is dropped.
pub const SORT_COLUMNS: &[&str] = &[
    "nit_entidad",
    "departamento",
    "ciudad",
    "proceso_de_compra",
    "estado_contrato",
    "valor_del_contrato",
    "proveedor_adjudicado",
    "urlproceso",
];

/// Columns the free-text search fans out over, OR-combined.
pub const SEARCH_COLUMNS: &[&str] = &[
    "nit_entidad",
    "departamento",
    "ciudad",
    "proceso_de_compra",
    "estado_contrato",
    "proveedor_adjudicado",
];

/// Facet columns and the response group each one populates.
pub const FACET_COLUMNS: &[FacetColumn] = &[
    FacetColumn {
        column: "departamento",
        group: "departamentos",
    },
    FacetColumn {
        column: "ciudad",
        group: "ciudades",
    },
    FacetColumn {
        column: "estado_contrato",
        group: "estados",
    },
    FacetColumn {
        column: "proceso_de_compra",
        group: "procesos",
    },
];

/// Aggregate projection shared by both count queries.
pub const COUNT_SELECT: &str = "count(1) as c";

#[derive(Debug, Clone, Copy)]
pub struct FacetColumn {
    pub column: &'static str,
    pub group: &'static str,
}

/// Trims the value and doubles every single quote so the result, wrapped in
/// single quotes, parses as exactly one SoQL string literal.
pub fn escape_literal(value: &str) -> String {
    value.trim().replace('\'', "''")
}

/// Returns the column when it is sortable, `None` otherwise.
pub fn validate_sort_column(column: &str) -> Option<&'static str> {
    SORT_COLUMNS.iter().copied().find(|known| *known == column)
}

/// A single boolean SoQL fragment, safe by construction to AND/OR with other
/// fragments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate(String);

impl Predicate {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// `column IN ('a','b')` over the escaped non-empty values, deduplicated in
/// first-occurrence order. `None` when no value survives.
pub fn in_list(column: &str, values: &[String]) -> Option<Predicate> {
    let mut quoted: Vec<String> = Vec::new();
    for value in values {
        let escaped = escape_literal(value);
        if escaped.is_empty() {
            continue;
        }
        let literal = format!("'{escaped}'");
        if !quoted.contains(&literal) {
            quoted.push(literal);
        }
    }

    if quoted.is_empty() {
        None
    } else {
        Some(Predicate(format!("{column} IN ({})", quoted.join(","))))
    }
}

/// Case-insensitive substring match. SoQL wildcards inside the value are left
/// alone: a `%` or `_` in the filter acts as a pattern, not a literal.
pub fn contains(column: &str, text: &str) -> Option<Predicate> {
    let escaped = escape_literal(text);
    if escaped.is_empty() {
        return None;
    }
    Some(Predicate(format!(
        "upper({column}) like upper('%{escaped}%')"
    )))
}

/// Free-text clause: a contains-match on each searchable column, OR-joined
/// and parenthesized so it composes under AND.
pub fn free_text(text: &str, columns: &[&str]) -> Option<Predicate> {
    let escaped = escape_literal(text);
    if escaped.is_empty() || columns.is_empty() {
        return None;
    }

    let ors: Vec<String> = columns
        .iter()
        .map(|column| format!("upper({column}) like upper('%{escaped}%')"))
        .collect();
    Some(Predicate(format!("({})", ors.join(" OR "))))
}

/// AND-joins the fragments; `None` means no `$where` constraint at all.
pub fn combine(predicates: Vec<Predicate>) -> Option<Predicate> {
    if predicates.is_empty() {
        return None;
    }
    let joined = predicates
        .into_iter()
        .map(Predicate::into_string)
        .collect::<Vec<_>>()
        .join(" AND ");
    Some(Predicate(joined))
}

/// `$limit/$offset/$order/$where` parameters for the page-data query.
pub fn data_params(
    page_size: i64,
    offset: i64,
    order: Option<(&str, SortOrder)>,
    predicate: Option<&Predicate>,
) -> Vec<(String, String)> {
    let mut params = vec![
        ("$limit".to_string(), page_size.to_string()),
        ("$offset".to_string(), offset.to_string()),
    ];
    if let Some((column, direction)) = order {
        params.push((
            "$order".to_string(),
            format!("{column} {}", direction.as_soql()),
        ));
    }
    if let Some(predicate) = predicate {
        params.push(("$where".to_string(), predicate.as_str().to_string()));
    }
    params
}

/// Count-aggregate parameters; with a predicate this is the filtered count,
/// without one the unfiltered count.
pub fn count_params(predicate: Option<&Predicate>) -> Vec<(String, String)> {
    let mut params = vec![("$select".to_string(), COUNT_SELECT.to_string())];
    if let Some(predicate) = predicate {
        params.push(("$where".to_string(), predicate.as_str().to_string()));
    }
    params
}

/// Grouped distinct-value enumeration for one facet column.
pub fn facet_params(column: &str, limit: i64) -> Vec<(String, String)> {
    vec![
        ("$select".to_string(), column.to_string()),
        ("$group".to_string(), column.to_string()),
        ("$order".to_string(), format!("{column} ASC")),
        ("$limit".to_string(), limit.to_string()),
    ]
}
