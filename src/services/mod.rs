pub mod climate_analysis;
pub mod climate_service;
pub mod simulation_service;
pub mod yield_engine;
