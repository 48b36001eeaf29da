use std::sync::Arc;

use republic_core::{ToolRegistry, default_registry};
use republic_sparql::{SparqlClient, SparqlClientConfig, SparqlExecutor};

use crate::config::CliConfig;

fn client(
    endpoint: &str,
    config: &CliConfig,
) -> Result<Arc<dyn SparqlExecutor>, Box<dyn std::error::Error + Send + Sync>> {
    let client_config = SparqlClientConfig::new(endpoint)
        .with_timeout(config.sparql_timeout)
        .with_user_agent(concat!("republic-cli/", env!("CARGO_PKG_VERSION")));
    Ok(Arc::new(SparqlClient::new(client_config)?))
}

pub fn build_registry(
    config: &CliConfig,
) -> Result<ToolRegistry, Box<dyn std::error::Error + Send + Sync>> {
    let camera = client(&config.camera_endpoint, config)?;
    let senato = client(&config.senato_endpoint, config)?;
    Ok(default_registry(camera, senato)?)
}
