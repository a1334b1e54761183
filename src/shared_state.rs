use crate::config::Config;
use crate::error::ClimateError;
use crate::models::simulation::EngineConstants;
use crate::services::climate_service::ClimateClient;

/// Handler state. Holds no per-request data: every simulation is computed
/// from scratch, so cloning is cheap and needs no locking.
#[derive(Clone, Debug)]
pub struct AppState {
    pub climate: ClimateClient,
    pub engine: EngineConstants,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self, ClimateError> {
        Ok(Self {
            climate: ClimateClient::new(&config.climate)?,
            engine: config.engine,
        })
    }
}
