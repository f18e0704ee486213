use crate::{
    error::{Result, ServiceError},
    soda::SodaClient,
    soql,
};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use tokio::task::JoinSet;

/// Runs one grouped enumeration per facet column, concurrently, and collects
/// the cleaned value lists keyed by response group. One failed column fails
/// the whole response; partial facet sets are never returned.
pub(super) async fn fetch(
    soda: &SodaClient,
    limit: i64,
) -> Result<BTreeMap<&'static str, Vec<String>>> {
    let mut fetches = JoinSet::new();
    for facet in soql::FACET_COLUMNS {
        let facet = *facet;
        let soda = soda.clone();
        let params = soql::facet_params(facet.column, limit);
        fetches.spawn(async move { (facet, soda.rows(&params).await) });
    }

    let mut groups = BTreeMap::new();
    while let Some(joined) = fetches.join_next().await {
        let (facet, rows) = joined.map_err(|err| ServiceError::Internal(err.into()))?;
        let rows = rows.map_err(|err| ServiceError::UpstreamFacets {
            detail: format!("{}: {}", facet.column, err.detail()),
        })?;
        groups.insert(facet.group, distinct_values(facet.column, &rows));
    }

    Ok(groups)
}

/// Distinct non-blank values for one column: case-sensitive set semantics,
/// lexicographically sorted, nulls and blanks dropped.
fn distinct_values(column: &str, rows: &[Value]) -> Vec<String> {
    let mut values = BTreeSet::new();
    for row in rows {
        let text = match row.get(column) {
            Some(Value::String(text)) => text.clone(),
            Some(Value::Null) | None => continue,
            Some(other) => other.to_string(),
        };
        if text.trim().is_empty() {
            continue;
        }
        values.insert(text);
    }
    values.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn distinct_values_dedups_sorts_and_drops_blanks() {
        let rows = vec![
            json!({ "departamento": "A" }),
            json!({ "departamento": "a" }),
            json!({ "departamento": "A" }),
            json!({ "departamento": "" }),
            json!({ "departamento": null }),
            json!({}),
        ];
        assert_eq!(distinct_values("departamento", &rows), vec!["A", "a"]);
    }

    #[test]
    fn distinct_values_stringifies_non_string_scalars() {
        let rows = vec![json!({ "ciudad": 5 }), json!({ "ciudad": "5" })];
        assert_eq!(distinct_values("ciudad", &rows), vec!["5"]);
    }
}
