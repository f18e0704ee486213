use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_soql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }

    fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("desc") {
            SortOrder::Desc
        } else {
            SortOrder::Asc
        }
    }
}

/// Structured listing request decoded from the inbound query string.
///
/// Repeated facet parameters accumulate into the multi-value filters; numeric
/// fields that fail to parse stay `None` and pick up defaults downstream.
#[derive(Debug, Clone, Default)]
pub struct ListingRequest {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub sort: Option<String>,
    pub order: SortOrder,
    pub search: Option<String>,
    pub departamentos: Vec<String>,
    pub ciudades: Vec<String>,
    pub estados: Vec<String>,
    pub procesos: Vec<String>,
    pub nit_entidad: Option<String>,
    pub proveedor: Option<String>,
    pub view: Option<String>,
}

impl ListingRequest {
    pub fn from_query(raw: &str) -> Self {
        let mut request = Self::default();
        for (key, value) in query_pairs(raw) {
            match key.as_str() {
                "page" => request.page = value.trim().parse().ok(),
                "pageSize" => request.page_size = value.trim().parse().ok(),
                "sort" => request.sort = non_empty(value),
                "order" => request.order = SortOrder::parse(&value),
                "search" => request.search = non_empty(value),
                "departamento" => push_value(&mut request.departamentos, value),
                "ciudad" => push_value(&mut request.ciudades, value),
                "estado_contrato" => push_value(&mut request.estados, value),
                "proceso_de_compra" => push_value(&mut request.procesos, value),
                "nit_entidad" => request.nit_entidad = non_empty(value),
                "proveedor_adjudicado" => request.proveedor = non_empty(value),
                "view" => request.view = non_empty(value),
                _ => {}
            }
        }
        request
    }
}

/// Reconciled listing response: one page of rows plus the unfiltered and
/// filtered totals. The three parts are fetched independently, so the numbers
/// may drift from each other when the dataset mutates between the calls.
#[derive(Debug, Clone, Serialize)]
pub struct ListingPage {
    pub data: Vec<Value>,
    pub total: i64,
    pub filtered: i64,
    pub page: i64,
    #[serde(rename = "pageSize")]
    pub page_size: i64,
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn push_value(values: &mut Vec<String>, value: String) {
    if !value.trim().is_empty() {
        values.push(value);
    }
}

/// Splits and percent-decodes a form-encoded query string, `+`-as-space
/// included. Pairs without `=` decode to an empty value.
fn query_pairs(raw: &str) -> Vec<(String, String)> {
    raw.split('&')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let (key, value) = part.split_once('=').unwrap_or((part, ""));
            (decode_component(key), decode_component(value))
        })
        .collect()
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn repeated_facet_params_accumulate_in_order() {
        let request = ListingRequest::from_query(
            "departamento=Antioquia&ciudad=Medell%C3%ADn&departamento=Cundinamarca",
        );
        assert_eq!(request.departamentos, vec!["Antioquia", "Cundinamarca"]);
        assert_eq!(request.ciudades, vec!["Medellín"]);
        assert!(request.estados.is_empty());
    }

    #[test]
    fn decodes_plus_and_percent_escapes() {
        let request =
            ListingRequest::from_query("search=obra+p%C3%BAblica&proveedor_adjudicado=ACME%20SAS");
        assert_eq!(request.search.as_deref(), Some("obra pública"));
        assert_eq!(request.proveedor.as_deref(), Some("ACME SAS"));
    }

    #[test]
    fn malformed_numbers_fall_back_to_none() {
        let request = ListingRequest::from_query("page=abc&pageSize=");
        assert_eq!(request.page, None);
        assert_eq!(request.page_size, None);
    }

    #[test]
    fn order_defaults_to_asc_and_parses_desc() {
        assert_eq!(ListingRequest::from_query("").order, SortOrder::Asc);
        assert_eq!(
            ListingRequest::from_query("order=DESC").order,
            SortOrder::Desc
        );
        assert_eq!(
            ListingRequest::from_query("order=sideways").order,
            SortOrder::Asc
        );
    }

    #[test]
    fn unknown_params_are_ignored() {
        let request = ListingRequest::from_query("page=2&utm_source=mailer");
        assert_eq!(request.page, Some(2));
    }

    #[test]
    fn blank_filter_values_are_dropped() {
        let request = ListingRequest::from_query("departamento=&nit_entidad=+++&view=");
        assert!(request.departamentos.is_empty());
        assert_eq!(request.nit_entidad, None);
        assert_eq!(request.view, None);
    }
}
