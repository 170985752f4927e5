use std::sync::Arc;

use crate::{config::Config, flow::FlowManager};
use axum::extract::FromRef;

#[derive(Clone)]
pub struct AppState {
    pub flows: Arc<FlowManager>,
    pub config: Config,
}

impl FromRef<AppState> for Arc<FlowManager> {
    fn from_ref(state: &AppState) -> Self {
        state.flows.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
