pub mod climate;
pub mod simulation;
