use crate::{
    config::AppConfig,
    error::{Result, ServiceError},
    models::{ListingPage, ListingRequest},
    query::QueryEngine,
    soda::SodaClient,
    state::AppState,
    view::ViewRegistry,
};
use axum::{
    extract::{RawQuery, State},
    http::HeaderMap,
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::{collections::BTreeMap, sync::Arc};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

pub struct Server {
    config: Arc<AppConfig>,
    state: AppState,
}

impl Server {
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);
        let soda = SodaClient::new(&config)?;
        let engine = QueryEngine::new(soda, Arc::clone(&config));
        let state = AppState::new(
            Arc::clone(&config),
            engine,
            Arc::new(ViewRegistry::default()),
        );

        Ok(Self { config, state })
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/healthz", get(Self::health))
            .route("/api/licitaciones", get(Self::listing))
            .route("/api/licitaciones/facets", get(Self::facets))
            .with_state(self.state.clone())
            .layer(TraceLayer::new_for_http())
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let addr = self.config.listen_addr;
        let listener = TcpListener::bind(addr).await?;
        info!(%addr, "secoql listening");
        axum::serve(listener, self.router()).await?;
        Ok(())
    }

    async fn health() -> Json<serde_json::Value> {
        Json(json!({ "status": "ok" }))
    }

    async fn listing(
        State(state): State<AppState>,
        headers: HeaderMap,
        RawQuery(query): RawQuery,
    ) -> Result<Json<ListingPage>> {
        enforce_api_key(&headers, &state.config)?;
        let request = ListingRequest::from_query(query.as_deref().unwrap_or(""));

        let gate = request.view.as_deref().map(|view| {
            let session = state.views.session(view);
            let generation = session.data.begin();
            (session, generation)
        });

        let page = state.engine.fetch_page(&request).await?;

        if let Some((session, generation)) = gate {
            if !session.data.is_current(generation) {
                return Err(ServiceError::Superseded);
            }
        }

        Ok(Json(page))
    }

    async fn facets(
        State(state): State<AppState>,
        headers: HeaderMap,
        RawQuery(query): RawQuery,
    ) -> Result<Json<BTreeMap<&'static str, Vec<String>>>> {
        enforce_api_key(&headers, &state.config)?;
        let request = ListingRequest::from_query(query.as_deref().unwrap_or(""));

        let gate = request.view.as_deref().map(|view| {
            let session = state.views.session(view);
            let generation = session.facets.begin();
            (session, generation)
        });

        let groups = state.engine.fetch_facets().await?;

        if let Some((session, generation)) = gate {
            if !session.facets.is_current(generation) {
                return Err(ServiceError::Superseded);
            }
        }

        Ok(Json(groups))
    }
}

fn enforce_api_key(headers: &HeaderMap, config: &AppConfig) -> Result<()> {
    if let Some(expected) = &config.api_key {
        let provided = headers
            .get("x-api-key")
            .and_then(|value| value.to_str().ok());

        if provided != Some(expected.as_str()) {
            return Err(ServiceError::Auth);
        }
    }

    Ok(())
}
