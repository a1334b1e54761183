use utoipa::OpenApi;
use crate::controllers::simulation_controller;
use crate::models::{climate, simulation};

#[derive(OpenApi)]
#[openapi(
    paths(
        simulation_controller::usage,
        simulation_controller::simulate,
        simulation_controller::analyze
    ),
    components(
        schemas(
            simulation::SimulationResponse,
            simulation::SimulationLocation,
            simulation::SystemParameters,
            simulation::AnnualSummary,
            simulation::MonthlyAggregate,
            simulation::LossBreakdown,
            climate::AnalyzeResponse,
            climate::AnalyzeLocation,
            climate::RawClimate,
            climate::CorrectedClimate,
            climate::UsageInfo
        )
    ),
    tags(
        (name = "solar-yield-sim", description = "Photovoltaic Yield Simulation API")
    )
)]
pub struct ApiDoc;
