use serde::Serialize;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SimulationMode {
    Deterministic,
    MonteCarlo,
}

/// Accepted and echoed back, but retirement withdrawals always use the fixed
/// inflation-adjusted allowance whichever variant is selected.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WithdrawalStrategy {
    Fixed,
    Percentage,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Accumulation,
    Retirement,
}

/// Inputs for one projection run. Monetary amounts are nominal, rates are in
/// percent (7.0 means 7%).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationParameters {
    pub starting_capital: f64,
    pub monthly_savings_amount: f64,
    pub current_age: u32,
    pub retirement_age: u32,
    pub life_expectancy_age: u32,
    pub coast_fire_age: u32,
    pub annual_growth_rate_percent: f64,
    pub annual_inflation_rate_percent: f64,
    pub desired_monthly_allowance_today_value: f64,
    pub barista_monthly_income_today_value: f64,
    pub simulation_mode: SimulationMode,
    pub annual_volatility_percent: f64,
    pub withdrawal_strategy: WithdrawalStrategy,
    pub withdrawal_percentage: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyRecord {
    pub age: u32,
    pub year_offset: u32,
    pub phase: Phase,
    pub median_balance: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentile10_balance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentile90_balance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub untouched_balance: Option<f64>,
    pub inflated_monthly_allowance: f64,
    /// Zero during accumulation.
    pub active_monthly_allowance: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub fire_number: Option<f64>,
    pub yearly_records: Vec<YearlyRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success_rate_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub simulation_count: u32,
}

impl SimulationResult {
    pub fn is_usable(&self) -> bool {
        self.fire_number.is_some() && self.error_message.is_none()
    }
}
