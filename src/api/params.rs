use clap::{Parser, ValueEnum};
use serde::Deserialize;
use thiserror::Error;

use crate::core::{SimulationMode, SimulationParameters, WithdrawalStrategy};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    #[error("{flag} must be a finite number")]
    NotFinite { flag: &'static str },

    #[error("{flag} must be >= 0")]
    Negative { flag: &'static str },

    #[error("{0}")]
    Inconsistent(&'static str),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub(crate) enum CliSimulationMode {
    Deterministic,
    MonteCarlo,
}

impl From<CliSimulationMode> for SimulationMode {
    fn from(value: CliSimulationMode) -> Self {
        match value {
            CliSimulationMode::Deterministic => SimulationMode::Deterministic,
            CliSimulationMode::MonteCarlo => SimulationMode::MonteCarlo,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub(crate) enum CliWithdrawalStrategy {
    Fixed,
    Percentage,
}

impl From<CliWithdrawalStrategy> for WithdrawalStrategy {
    fn from(value: CliWithdrawalStrategy) -> Self {
        match value {
            CliWithdrawalStrategy::Fixed => WithdrawalStrategy::Fixed,
            CliWithdrawalStrategy::Percentage => WithdrawalStrategy::Percentage,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum ApiSimulationMode {
    Deterministic,
    #[serde(alias = "monteCarlo", alias = "monte_carlo")]
    MonteCarlo,
}

impl From<ApiSimulationMode> for CliSimulationMode {
    fn from(value: ApiSimulationMode) -> Self {
        match value {
            ApiSimulationMode::Deterministic => CliSimulationMode::Deterministic,
            ApiSimulationMode::MonteCarlo => CliSimulationMode::MonteCarlo,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum ApiWithdrawalStrategy {
    Fixed,
    Percentage,
}

impl From<ApiWithdrawalStrategy> for CliWithdrawalStrategy {
    fn from(value: ApiWithdrawalStrategy) -> Self {
        match value {
            ApiWithdrawalStrategy::Fixed => CliWithdrawalStrategy::Fixed,
            ApiWithdrawalStrategy::Percentage => CliWithdrawalStrategy::Percentage,
        }
    }
}

/// Query-string / JSON keys understood by the simulate endpoint. Every field
/// is optional; missing ones fall back to [`default_cli_for_api`].
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct SimulatePayload {
    starting_capital: Option<f64>,
    monthly_savings: Option<f64>,
    current_age: Option<f64>,
    #[serde(alias = "growthRate")]
    cagr: Option<f64>,
    monthly_spend: Option<f64>,
    monthly_allowance: Option<f64>,
    inflation_rate: Option<f64>,
    life_expectancy: Option<f64>,
    retirement_age: Option<f64>,
    coast_fire_age: Option<f64>,
    barista_income: Option<f64>,
    volatility: Option<f64>,
    withdrawal_percentage: Option<f64>,
    simulation_mode: Option<ApiSimulationMode>,
    withdrawal_strategy: Option<ApiWithdrawalStrategy>,
}

#[derive(Parser, Debug, Clone, PartialEq)]
#[command(
    name = "fire-projection",
    about = "Year-by-year FIRE projection (deterministic or Monte Carlo)"
)]
pub(crate) struct Cli {
    #[arg(long, default_value_t = 50_000.0, help = "Initial portfolio value")]
    pub(crate) starting_capital: f64,
    #[arg(
        long,
        default_value_t = 1_500.0,
        help = "Monthly contribution while accumulating"
    )]
    pub(crate) monthly_savings: f64,
    #[arg(long, default_value_t = 30)]
    pub(crate) current_age: u32,
    #[arg(long, default_value_t = 55)]
    pub(crate) retirement_age: u32,
    #[arg(long, default_value_t = 90, help = "Age to project through")]
    pub(crate) life_expectancy: u32,
    #[arg(
        long,
        help = "Age when contributions stop while the balance keeps growing; defaults to retirement-age"
    )]
    pub(crate) coast_fire_age: Option<u32>,
    #[arg(
        long,
        default_value_t = 7.0,
        allow_negative_numbers = true,
        help = "Expected annual return in percent"
    )]
    pub(crate) growth_rate: f64,
    #[arg(
        long,
        default_value_t = 2.5,
        help = "Expected annual inflation in percent"
    )]
    pub(crate) inflation_rate: f64,
    #[arg(
        long,
        default_value_t = 3_000.0,
        help = "Desired monthly spending in retirement, today's money"
    )]
    pub(crate) monthly_allowance: f64,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Part-time monthly income in retirement, today's money"
    )]
    pub(crate) barista_income: f64,
    #[arg(long, value_enum, default_value_t = CliSimulationMode::Deterministic)]
    pub(crate) simulation_mode: CliSimulationMode,
    #[arg(
        long,
        default_value_t = 15.0,
        help = "Annual return volatility in percent (Monte Carlo only)"
    )]
    pub(crate) volatility: f64,
    #[arg(long, value_enum, default_value_t = CliWithdrawalStrategy::Fixed)]
    pub(crate) withdrawal_strategy: CliWithdrawalStrategy,
    #[arg(
        long,
        default_value_t = 4.0,
        help = "Annual withdrawal percentage for the percentage strategy"
    )]
    pub(crate) withdrawal_percentage: f64,
    #[arg(long, help = "Seed for reproducible Monte Carlo runs")]
    pub(crate) seed: Option<u64>,
}

const STARTING_CAPITAL_RANGE: (f64, f64) = (0.0, 100_000_000.0);
const MONTHLY_SAVINGS_RANGE: (f64, f64) = (0.0, 1_000_000.0);
const AGE_RANGE: (f64, f64) = (1.0, 100.0);
const LIFE_EXPECTANCY_RANGE: (f64, f64) = (1.0, 120.0);
const GROWTH_RATE_RANGE: (f64, f64) = (-20.0, 30.0);
const MONTHLY_ALLOWANCE_RANGE: (f64, f64) = (0.0, 20_000.0);
// Linked plans may carry spending above the form's slider limit.
const MONTHLY_SPEND_RANGE: (f64, f64) = (0.0, f64::INFINITY);
const INFLATION_RATE_RANGE: (f64, f64) = (0.0, 20.0);
const BARISTA_INCOME_RANGE: (f64, f64) = (0.0, 20_000.0);
const VOLATILITY_RANGE: (f64, f64) = (0.0, 50.0);
const WITHDRAWAL_PERCENTAGE_RANGE: (f64, f64) = (0.0, 100.0);

fn clamp_field(flag: &'static str, value: f64, range: (f64, f64)) -> Result<f64, ParameterError> {
    if !value.is_finite() {
        return Err(ParameterError::NotFinite { flag });
    }
    Ok(value.clamp(range.0, range.1))
}

/// Ages arrive as numbers; fractional parts are dropped after clamping.
fn clamp_age(flag: &'static str, value: f64, range: (f64, f64)) -> Result<u32, ParameterError> {
    clamp_field(flag, value, range).map(|age| age.trunc() as u32)
}

pub(crate) fn build_parameters(cli: &Cli) -> Result<SimulationParameters, ParameterError> {
    for (flag, value) in [
        ("--starting-capital", cli.starting_capital),
        ("--monthly-savings", cli.monthly_savings),
        ("--growth-rate", cli.growth_rate),
        ("--inflation-rate", cli.inflation_rate),
        ("--monthly-allowance", cli.monthly_allowance),
        ("--barista-income", cli.barista_income),
        ("--volatility", cli.volatility),
        ("--withdrawal-percentage", cli.withdrawal_percentage),
    ] {
        if !value.is_finite() {
            return Err(ParameterError::NotFinite { flag });
        }
    }

    for (flag, value) in [
        ("--starting-capital", cli.starting_capital),
        ("--monthly-savings", cli.monthly_savings),
        ("--inflation-rate", cli.inflation_rate),
        ("--monthly-allowance", cli.monthly_allowance),
        ("--barista-income", cli.barista_income),
        ("--volatility", cli.volatility),
    ] {
        if value < 0.0 {
            return Err(ParameterError::Negative { flag });
        }
    }

    if cli.retirement_age <= cli.current_age {
        return Err(ParameterError::Inconsistent(
            "--retirement-age must be > --current-age",
        ));
    }

    if cli.life_expectancy <= cli.retirement_age {
        return Err(ParameterError::Inconsistent(
            "--life-expectancy must be > --retirement-age",
        ));
    }

    let coast_fire_age = cli.coast_fire_age.unwrap_or(cli.retirement_age);
    if coast_fire_age < cli.current_age || coast_fire_age > cli.retirement_age {
        return Err(ParameterError::Inconsistent(
            "--coast-fire-age must be between --current-age and --retirement-age",
        ));
    }

    if !(0.0..=100.0).contains(&cli.withdrawal_percentage) {
        return Err(ParameterError::Inconsistent(
            "--withdrawal-percentage must be between 0 and 100",
        ));
    }

    Ok(SimulationParameters {
        starting_capital: cli.starting_capital,
        monthly_savings_amount: cli.monthly_savings,
        current_age: cli.current_age,
        retirement_age: cli.retirement_age,
        life_expectancy_age: cli.life_expectancy,
        coast_fire_age,
        annual_growth_rate_percent: cli.growth_rate,
        annual_inflation_rate_percent: cli.inflation_rate,
        desired_monthly_allowance_today_value: cli.monthly_allowance,
        barista_monthly_income_today_value: cli.barista_income,
        simulation_mode: cli.simulation_mode.into(),
        annual_volatility_percent: cli.volatility,
        withdrawal_strategy: cli.withdrawal_strategy.into(),
        withdrawal_percentage: cli.withdrawal_percentage,
    })
}

#[cfg(test)]
pub(crate) fn api_request_from_json(json: &str) -> Result<SimulationParameters, String> {
    let payload = serde_json::from_str::<SimulatePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    api_request_from_payload(payload).map_err(|e| e.to_string())
}

pub(crate) fn api_request_from_payload(
    payload: SimulatePayload,
) -> Result<SimulationParameters, ParameterError> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.starting_capital {
        cli.starting_capital = clamp_field("startingCapital", v, STARTING_CAPITAL_RANGE)?;
    }
    if let Some(v) = payload.monthly_savings {
        cli.monthly_savings = clamp_field("monthlySavings", v, MONTHLY_SAVINGS_RANGE)?;
    }
    if let Some(v) = payload.current_age {
        cli.current_age = clamp_age("currentAge", v, AGE_RANGE)?;
    }
    if let Some(v) = payload.cagr {
        cli.growth_rate = clamp_field("cagr", v, GROWTH_RATE_RANGE)?;
    }
    match (payload.monthly_spend, payload.monthly_allowance) {
        (Some(v), _) => {
            cli.monthly_allowance = clamp_field("monthlySpend", v, MONTHLY_SPEND_RANGE)?;
        }
        (None, Some(v)) => {
            cli.monthly_allowance = clamp_field("monthlyAllowance", v, MONTHLY_ALLOWANCE_RANGE)?;
        }
        (None, None) => {}
    }
    if let Some(v) = payload.inflation_rate {
        cli.inflation_rate = clamp_field("inflationRate", v, INFLATION_RATE_RANGE)?;
    }
    if let Some(v) = payload.life_expectancy {
        cli.life_expectancy = clamp_age("lifeExpectancy", v, LIFE_EXPECTANCY_RANGE)?;
    }
    if let Some(v) = payload.retirement_age {
        cli.retirement_age = clamp_age("retirementAge", v, AGE_RANGE)?;
    }
    if let Some(v) = payload.coast_fire_age {
        cli.coast_fire_age = Some(clamp_age("coastFireAge", v, AGE_RANGE)?);
    }
    if let Some(v) = payload.barista_income {
        cli.barista_income = clamp_field("baristaIncome", v, BARISTA_INCOME_RANGE)?;
    }
    if let Some(v) = payload.volatility {
        cli.volatility = clamp_field("volatility", v, VOLATILITY_RANGE)?;
    }
    if let Some(v) = payload.withdrawal_percentage {
        cli.withdrawal_percentage =
            clamp_field("withdrawalPercentage", v, WITHDRAWAL_PERCENTAGE_RANGE)?;
    }
    if let Some(v) = payload.simulation_mode {
        cli.simulation_mode = v.into();
    }
    if let Some(v) = payload.withdrawal_strategy {
        cli.withdrawal_strategy = v.into();
    }

    build_parameters(&cli)
}

pub(crate) fn default_cli_for_api() -> Cli {
    Cli {
        starting_capital: 50_000.0,
        monthly_savings: 1_500.0,
        current_age: 30,
        retirement_age: 55,
        life_expectancy: 90,
        coast_fire_age: None,
        growth_rate: 7.0,
        inflation_rate: 2.5,
        monthly_allowance: 3_000.0,
        barista_income: 0.0,
        simulation_mode: CliSimulationMode::Deterministic,
        volatility: 15.0,
        withdrawal_strategy: CliWithdrawalStrategy::Fixed,
        withdrawal_percentage: 4.0,
        seed: None,
    }
}
