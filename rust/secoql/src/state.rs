use crate::{config::AppConfig, query::QueryEngine, view::ViewRegistry};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub engine: QueryEngine,
    pub views: Arc<ViewRegistry>,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, engine: QueryEngine, views: Arc<ViewRegistry>) -> Self {
        Self {
            config,
            engine,
            views,
        }
    }
}
