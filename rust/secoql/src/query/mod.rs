mod facets;

use crate::{
    config::AppConfig,
    error::{Result, ServiceError},
    models::{ListingPage, ListingRequest, SortOrder},
    pagination,
    soda::SodaClient,
    soql::{self, Predicate},
};
use serde_json::Value;
use std::{collections::BTreeMap, sync::Arc};
use tracing::warn;

/// Fully resolved query state: clamped pagination, validated ordering, and
/// the combined predicate the three SoQL queries are assembled from.
#[derive(Debug, Clone)]
pub struct QueryPlan {
    pub page: i64,
    pub page_size: i64,
    pub offset: i64,
    pub order: Option<OrderBy>,
    pub predicate: Option<Predicate>,
}

#[derive(Debug, Clone)]
pub struct OrderBy {
    pub column: &'static str,
    pub direction: SortOrder,
}

#[derive(Clone)]
pub struct QueryEngine {
    soda: SodaClient,
    config: Arc<AppConfig>,
}

impl QueryEngine {
    pub fn new(soda: SodaClient, config: Arc<AppConfig>) -> Self {
        Self { soda, config }
    }

    /// Fetches one reconciled page: rows, unfiltered total, filtered total.
    ///
    /// The upstream calls are independent and run concurrently. A data-fetch
    /// failure is fatal; a count failure degrades that number to 0. When no
    /// predicate is active the filtered count reuses the unfiltered count and
    /// the third call is skipped. The unfiltered total is refetched on every
    /// call, never cached.
    pub async fn fetch_page(&self, request: &ListingRequest) -> Result<ListingPage> {
        let plan = build_plan(&self.config, request);

        let data_params = soql::data_params(
            plan.page_size,
            plan.offset,
            plan.order
                .as_ref()
                .map(|order| (order.column, order.direction)),
            plan.predicate.as_ref(),
        );
        let total_params = soql::count_params(None);
        let filtered_params = plan
            .predicate
            .as_ref()
            .map(|predicate| soql::count_params(Some(predicate)));

        let (data, total, filtered) = tokio::join!(
            self.soda.rows(&data_params),
            self.soda.rows(&total_params),
            async {
                match &filtered_params {
                    Some(params) => Some(self.soda.rows(params).await),
                    None => None,
                }
            }
        );

        let data = data.map_err(|err| ServiceError::UpstreamData {
            detail: err.detail(),
        })?;

        let total = match total {
            Ok(rows) => parse_count(&rows),
            Err(err) => {
                warn!(error = %err, "unfiltered count fetch failed, reporting 0");
                0
            }
        };

        let filtered = match filtered {
            None => total,
            Some(Ok(rows)) => parse_count(&rows),
            Some(Err(err)) => {
                warn!(error = %err, "filtered count fetch failed, reporting 0");
                0
            }
        };

        Ok(ListingPage {
            data,
            total,
            filtered,
            page: plan.page,
            page_size: plan.page_size,
        })
    }

    /// Enumerates the facet selector values, one grouped query per column,
    /// all running concurrently. One failed column fails the whole set.
    pub async fn fetch_facets(&self) -> Result<BTreeMap<&'static str, Vec<String>>> {
        facets::fetch(&self.soda, self.config.facet_limit).await
    }
}

/// Clamps pagination, validates the sort column, and composes the filter
/// predicate. Out-of-range pagination and unknown sort columns are
/// normalized here, never rejected.
pub fn build_plan(config: &AppConfig, request: &ListingRequest) -> QueryPlan {
    let page = pagination::clamp_page(request.page);
    let page_size = pagination::clamp_page_size(
        request.page_size,
        config.default_page_size,
        config.max_page_size,
    );

    let order = request
        .sort
        .as_deref()
        .and_then(soql::validate_sort_column)
        .map(|column| OrderBy {
            column,
            direction: request.order,
        });

    QueryPlan {
        page,
        page_size,
        offset: pagination::offset(page, page_size),
        order,
        predicate: build_predicate(request),
    }
}

/// One fragment per active filter axis, AND-combined: the four multi-value
/// equality columns, the two substring columns, then the free-text clause.
fn build_predicate(request: &ListingRequest) -> Option<Predicate> {
    let mut predicates = Vec::new();

    predicates.extend(soql::in_list("departamento", &request.departamentos));
    predicates.extend(soql::in_list("ciudad", &request.ciudades));
    predicates.extend(soql::in_list("estado_contrato", &request.estados));
    predicates.extend(soql::in_list("proceso_de_compra", &request.procesos));

    if let Some(nit) = &request.nit_entidad {
        predicates.extend(soql::contains("nit_entidad", nit));
    }
    if let Some(proveedor) = &request.proveedor {
        predicates.extend(soql::contains("proveedor_adjudicado", proveedor));
    }
    if let Some(search) = &request.search {
        predicates.extend(soql::free_text(search, soql::SEARCH_COLUMNS));
    }

    soql::combine(predicates)
}

/// Reads the single `c` aggregate from a count response. Socrata serializes
/// counts as strings; plain numbers are accepted too. Anything else is 0.
fn parse_count(rows: &[Value]) -> i64 {
    match rows.first().and_then(|row| row.get("c")) {
        Some(Value::String(raw)) => raw.trim().parse().unwrap_or(0),
        Some(Value::Number(number)) => number.as_i64().unwrap_or(0),
        _ => 0,
    }
}
