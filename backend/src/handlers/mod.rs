// src/handlers/mod.rs

pub mod auth;
pub mod quiz;

use std::sync::Arc;

use crate::{error::AppError, flow::FlowManager};

/// Runs a flow-manager call on the blocking pool; every call may rewrite a
/// collection file while holding the coordination lock.
pub(crate) async fn with_flows<T, F>(flows: Arc<FlowManager>, f: F) -> Result<T, AppError>
where
    F: FnOnce(&FlowManager) -> Result<T, crate::flow::FlowError> + Send + 'static,
    T: Send + 'static,
{
    let result = tokio::task::spawn_blocking(move || f(flows.as_ref())).await?;
    Ok(result?)
}
