use rand::Rng;
use tracing::{debug, warn};

use super::error::ProjectionError;
use super::percentile::{PercentileBand, aggregate_yearly, success_rate_percent};
use super::random::sample_normal;
use super::types::{
    Phase, SimulationMode, SimulationParameters, SimulationResult, YearlyRecord,
};

pub const DETERMINISTIC_SIMULATIONS: u32 = 1;
pub const MONTE_CARLO_SIMULATIONS: u32 = 500;

const MONTHS_PER_YEAR: f64 = 12.0;

/// Runs a projection, drawing Monte Carlo returns from the thread-local
/// platform generator. Each call resamples.
pub fn simulate(params: &SimulationParameters) -> SimulationResult {
    simulate_with_rng(params, &mut rand::thread_rng())
}

/// Same as [`simulate`] with an injected random source, so callers can seed
/// Monte Carlo runs. Deterministic mode never touches `rng`.
pub fn simulate_with_rng<R: Rng + ?Sized>(
    params: &SimulationParameters,
    rng: &mut R,
) -> SimulationResult {
    match project(params, rng) {
        Ok(result) => result,
        Err(err) => {
            warn!(%err, "projection produced no data");
            SimulationResult {
                fire_number: None,
                yearly_records: Vec::new(),
                success_rate_percent: None,
                error_message: Some(err.to_string()),
                simulation_count: 0,
            }
        }
    }
}

pub fn simulation_count(mode: SimulationMode) -> u32 {
    match mode {
        SimulationMode::Deterministic => DETERMINISTIC_SIMULATIONS,
        SimulationMode::MonteCarlo => MONTE_CARLO_SIMULATIONS,
    }
}

fn project<R: Rng + ?Sized>(
    params: &SimulationParameters,
    rng: &mut R,
) -> Result<SimulationResult, ProjectionError> {
    let total_years = simulated_years(params)?;
    let simulations = simulation_count(params.simulation_mode);
    debug!(
        mode = ?params.simulation_mode,
        simulations,
        total_years,
        "running projection"
    );

    let paths = simulate_paths(params, total_years, simulations, rng);
    let bands = aggregate_yearly(&paths);
    let untouched = match params.simulation_mode {
        SimulationMode::Deterministic => Some(untouched_track(params, total_years)),
        SimulationMode::MonteCarlo => None,
    };
    let yearly_records = build_records(params, &bands, untouched.as_deref());

    let (fire_number, error_message) = match locate_fire_number(params, &yearly_records) {
        Ok(balance) => (Some(balance), None),
        Err(err) => {
            warn!(%err, "fire number unavailable");
            (None, Some(err.to_string()))
        }
    };

    let success_rate = match params.simulation_mode {
        SimulationMode::Deterministic => None,
        SimulationMode::MonteCarlo => {
            let terminal = paths
                .iter()
                .filter_map(|path| path.last().copied())
                .collect::<Vec<_>>();
            Some(success_rate_percent(&terminal))
        }
    };

    Ok(SimulationResult {
        fire_number,
        yearly_records,
        success_rate_percent: success_rate,
        error_message,
        simulation_count: simulations,
    })
}

fn simulated_years(params: &SimulationParameters) -> Result<u32, ProjectionError> {
    params
        .life_expectancy_age
        .checked_sub(params.current_age)
        .filter(|years| *years > 0)
        .ok_or(ProjectionError::NoSimulatedYears {
            current_age: params.current_age,
            life_expectancy_age: params.life_expectancy_age,
        })
}

fn simulate_paths<R: Rng + ?Sized>(
    params: &SimulationParameters,
    total_years: u32,
    simulations: u32,
    rng: &mut R,
) -> Vec<Vec<f64>> {
    (0..simulations)
        .map(|_| simulate_path(params, total_years, rng))
        .collect()
}

/// Balances for years `0..=total_years`; index 0 is the starting capital.
/// Negative balances are kept and keep compounding.
fn simulate_path<R: Rng + ?Sized>(
    params: &SimulationParameters,
    total_years: u32,
    rng: &mut R,
) -> Vec<f64> {
    let mut balances = Vec::with_capacity(total_years as usize + 1);
    let mut balance = params.starting_capital;
    balances.push(balance);

    for year in 1..=total_years {
        let growth = growth_multiplier(params, rng);
        balance = balance * growth + annual_cash_flow(params, year);
        balances.push(balance);
    }

    balances
}

fn growth_multiplier<R: Rng + ?Sized>(params: &SimulationParameters, rng: &mut R) -> f64 {
    let return_percent = match params.simulation_mode {
        SimulationMode::Deterministic => params.annual_growth_rate_percent,
        SimulationMode::MonteCarlo => sample_normal(
            rng,
            params.annual_growth_rate_percent,
            params.annual_volatility_percent,
        ),
    };
    1.0 + return_percent / 100.0
}

/// Contribution (positive) or net withdrawal (negative) applied after growth.
fn annual_cash_flow(params: &SimulationParameters, year: u32) -> f64 {
    let age = params.current_age + year;
    match phase_at(params, age) {
        Phase::Accumulation if age < params.coast_fire_age => {
            params.monthly_savings_amount * MONTHS_PER_YEAR
        }
        Phase::Accumulation => 0.0,
        Phase::Retirement => {
            let inflation = inflation_multiplier(params, year);
            let allowance = params.desired_monthly_allowance_today_value * inflation;
            let barista_income = params.barista_monthly_income_today_value * inflation;
            -(allowance - barista_income) * MONTHS_PER_YEAR
        }
    }
}

/// Balance if withdrawals never started: contributions every year, any phase.
fn untouched_track(params: &SimulationParameters, total_years: u32) -> Vec<f64> {
    let growth = 1.0 + params.annual_growth_rate_percent / 100.0;
    let contribution = params.monthly_savings_amount * MONTHS_PER_YEAR;

    let mut balance = params.starting_capital;
    let mut track = Vec::with_capacity(total_years as usize + 1);
    track.push(balance);
    for _ in 1..=total_years {
        balance = balance * growth + contribution;
        track.push(balance);
    }
    track
}

fn phase_at(params: &SimulationParameters, age: u32) -> Phase {
    if age >= params.retirement_age {
        Phase::Retirement
    } else {
        Phase::Accumulation
    }
}

fn inflation_multiplier(params: &SimulationParameters, year: u32) -> f64 {
    (1.0 + params.annual_inflation_rate_percent / 100.0).powi(year as i32)
}

fn build_records(
    params: &SimulationParameters,
    bands: &[PercentileBand],
    untouched: Option<&[f64]>,
) -> Vec<YearlyRecord> {
    let monte_carlo = params.simulation_mode == SimulationMode::MonteCarlo;

    bands
        .iter()
        .enumerate()
        .map(|(offset, band)| {
            let year_offset = offset as u32;
            let age = params.current_age + year_offset;
            let phase = phase_at(params, age);
            let inflated_monthly_allowance = params.desired_monthly_allowance_today_value
                * inflation_multiplier(params, year_offset);
            let active_monthly_allowance = match phase {
                Phase::Accumulation => 0.0,
                Phase::Retirement => inflated_monthly_allowance,
            };

            YearlyRecord {
                age,
                year_offset,
                phase,
                median_balance: band.p50,
                percentile10_balance: monte_carlo.then_some(band.p10),
                percentile90_balance: monte_carlo.then_some(band.p90),
                untouched_balance: untouched.and_then(|track| track.get(offset).copied()),
                inflated_monthly_allowance,
                active_monthly_allowance,
            }
        })
        .collect()
}

fn locate_fire_number(
    params: &SimulationParameters,
    records: &[YearlyRecord],
) -> Result<f64, ProjectionError> {
    records
        .iter()
        .find(|record| record.age == params.retirement_age)
        .map(|record| record.median_balance)
        .ok_or(ProjectionError::RetirementYearNotFound {
            retirement_age: params.retirement_age,
        })
}
