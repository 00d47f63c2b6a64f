//! Inconsistencies the engine reports through `SimulationResult::error_message`.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProjectionError {
    #[error(
        "Life expectancy age {life_expectancy_age} leaves no years to simulate from current age {current_age}"
    )]
    NoSimulatedYears {
        current_age: u32,
        life_expectancy_age: u32,
    },

    #[error("Retirement age {retirement_age} does not fall on a simulated year")]
    RetirementYearNotFound { retirement_age: u32 },
}
