use std::sync::Arc;

use republic_core::{ToolRegistry, default_registry};
use republic_sparql::{SparqlClient, SparqlClientConfig, SparqlExecutor};

use crate::config::SparqlSettings;

fn client(
    endpoint: &str,
    settings: &SparqlSettings,
) -> Result<Arc<dyn SparqlExecutor>, Box<dyn std::error::Error + Send + Sync>> {
    let config = SparqlClientConfig::new(endpoint).with_timeout(settings.timeout);
    Ok(Arc::new(SparqlClient::new(config)?))
}

/// Builds the Camera and Senato tool sets against the configured endpoints.
pub fn build_registry(
    settings: &SparqlSettings,
) -> Result<ToolRegistry, Box<dyn std::error::Error + Send + Sync>> {
    let camera = client(&settings.camera_endpoint, settings)?;
    let senato = client(&settings.senato_endpoint, settings)?;
    Ok(default_registry(camera, senato)?)
}
