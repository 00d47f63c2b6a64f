mod engine;
mod error;
mod percentile;
mod random;
mod types;

pub use engine::{
    DETERMINISTIC_SIMULATIONS, MONTE_CARLO_SIMULATIONS, simulate, simulate_with_rng,
    simulation_count,
};
pub use error::ProjectionError;
pub use percentile::{PercentileBand, aggregate_yearly, band, nearest_rank, success_rate_percent};
pub use random::sample_normal;
pub use types::{
    Phase, SimulationMode, SimulationParameters, SimulationResult, WithdrawalStrategy,
    YearlyRecord,
};
