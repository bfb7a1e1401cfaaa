use serde::Serialize;

use super::error::{InputError, InputResult};
use super::projection::{SipAccount, project};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EstimateMethod {
    /// Annuity-due formula for a flat monthly contribution.
    ClosedForm,
    /// Growth of a unit contribution under step-up, scaled to the target.
    UnitScaling,
    /// Target, horizon or rate leave nothing to solve for.
    Infeasible,
}

#[derive(Debug, Clone, Copy)]
pub struct SipGoal {
    pub target_amount: f64,
    pub annual_rate: f64,
    pub horizon_years: u32,
    pub annual_step_up: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SipEstimate {
    pub target_amount: f64,
    pub annual_rate: f64,
    pub horizon_years: u32,
    pub annual_step_up: f64,
    pub required_monthly: u64,
    pub projected_value: i64,
    pub method: EstimateMethod,
    pub message: String,
}

/// Monthly contribution needed to reach `target_amount` by the end of the
/// horizon. Returns zero when the target, horizon or rate is not positive.
pub fn estimate_required_sip(goal: SipGoal) -> InputResult<SipEstimate> {
    validate_goal(goal)?;

    let (required_monthly, method, message) = if goal.target_amount <= 0.0
        || goal.horizon_years == 0
        || goal.annual_rate <= 0.0
    {
        (
            0,
            EstimateMethod::Infeasible,
            "Target, horizon and expected return must all be positive.".to_string(),
        )
    } else if goal.annual_step_up == 0.0 {
        let factor = annuity_due_factor(goal.annual_rate, goal.horizon_years);
        (
            scale_to_target(goal.target_amount, factor),
            EstimateMethod::ClosedForm,
            "Solved flat monthly contribution.".to_string(),
        )
    } else {
        let factor =
            unit_growth_factor(goal.annual_rate, goal.horizon_years, goal.annual_step_up);
        (
            scale_to_target(goal.target_amount, factor),
            EstimateMethod::UnitScaling,
            "Solved first-year monthly contribution with annual step-up.".to_string(),
        )
    };

    let projected = project(
        required_monthly as f64,
        goal.annual_rate,
        goal.horizon_years,
        goal.annual_step_up,
    );

    Ok(SipEstimate {
        target_amount: goal.target_amount,
        annual_rate: goal.annual_rate,
        horizon_years: goal.horizon_years,
        annual_step_up: goal.annual_step_up,
        required_monthly,
        projected_value: projected.value,
        method,
        message,
    })
}

/// Future value of 1 paid at the start of every month for `years`.
fn annuity_due_factor(annual_rate: f64, years: u32) -> f64 {
    let i = annual_rate / 12.0 / 100.0;
    let n = f64::from(years) * 12.0;
    ((1.0 + i).powf(n) - 1.0) / i * (1.0 + i)
}

/// Terminal balance of a first-year contribution of 1; the projection is
/// linear in the contribution, so this scales to any amount.
fn unit_growth_factor(annual_rate: f64, years: u32, annual_step_up: f64) -> f64 {
    let mut account = SipAccount::new(1.0, annual_rate, annual_step_up);
    let mut balance = 0.0;
    for _ in 0..years {
        balance = account.run_year().balance;
    }
    balance
}

fn scale_to_target(target: f64, factor: f64) -> u64 {
    if !factor.is_finite() || factor <= 0.0 {
        return 0;
    }
    (target / factor).round().max(0.0) as u64
}

fn validate_goal(goal: SipGoal) -> InputResult<()> {
    if !goal.target_amount.is_finite() {
        return Err(InputError::NonFiniteTarget(goal.target_amount));
    }
    if !goal.annual_rate.is_finite() {
        return Err(InputError::NonFiniteRate {
            name: "rate",
            value: goal.annual_rate,
        });
    }
    if !goal.annual_step_up.is_finite() || goal.annual_step_up < 0.0 {
        return Err(InputError::InvalidStepUp(goal.annual_step_up));
    }
    Ok(())
}
