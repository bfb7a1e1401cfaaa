use super::allocation::resolve;
use super::projection::{SipAccount, round_currency};
use super::types::{
    AllocationResult, AllocationWeights, AssetClass, Exclusions, InvestorProfile, PerAsset,
    PortfolioProjection, ProjectionBreakdown, ProjectionYear, ReturnRates,
};

pub fn resolve_allocation(
    profile: &InvestorProfile,
    rates: &ReturnRates,
    exclusions: Exclusions,
) -> AllocationResult {
    let resolution = resolve(profile, exclusions);
    let weights = resolution.weights;
    let monthly_amounts = monthly_amounts(profile.monthly_amount, &weights);

    let (breakdown, yearly) = simulate(profile, rates, &monthly_amounts);
    let projection = build_portfolio_projection(&weights, rates, breakdown);

    tracing::trace!(
        equity = weights.equity,
        debt = weights.debt,
        gold = weights.gold,
        silver = weights.silver,
        total_value = projection.total_value,
        "allocation resolved"
    );

    AllocationResult {
        weights,
        equity_split: resolution.equity_split,
        monthly_amounts,
        rationale: resolution.rationale,
        projection,
        yearly,
    }
}

/// Splits the monthly contribution by weight, rounding each class on its own.
pub fn monthly_amounts(total_monthly: u64, weights: &AllocationWeights) -> PerAsset<u64> {
    weights.map(|_, weight| {
        ((u128::from(total_monthly) * u128::from(weight) + 50) / 100) as u64
    })
}

/// Nominal blend of class rates by weight, rounded to one decimal.
pub fn weighted_annual_rate(weights: &AllocationWeights, rates: &ReturnRates) -> f64 {
    let blended: f64 = AssetClass::ALL
        .iter()
        .map(|&asset| f64::from(weights.get(asset)) * rates.get(asset))
        .sum::<f64>()
        / 100.0;
    (blended * 10.0).round() / 10.0
}

fn build_portfolio_projection(
    weights: &AllocationWeights,
    rates: &ReturnRates,
    breakdown: PerAsset<ProjectionBreakdown>,
) -> PortfolioProjection {
    let total_invested = AssetClass::ALL
        .iter()
        .map(|&asset| breakdown.get(asset).invested)
        .fold(0i64, i64::saturating_add);
    let total_value = AssetClass::ALL
        .iter()
        .map(|&asset| breakdown.get(asset).terminal_value)
        .fold(0i64, i64::saturating_add);

    PortfolioProjection {
        total_invested,
        total_value,
        total_returns: total_value.saturating_sub(total_invested),
        weighted_annual_rate: weighted_annual_rate(weights, rates),
        breakdown,
    }
}

/// Year-end portfolio totals over the whole horizon. Each class is rounded
/// before summing, so the final row agrees with the aggregated projection.
pub fn run_yearly_projection_trace(
    profile: &InvestorProfile,
    rates: &ReturnRates,
    weights: &AllocationWeights,
) -> Vec<ProjectionYear> {
    let amounts = monthly_amounts(profile.monthly_amount, weights);
    simulate(profile, rates, &amounts).1
}

/// Runs every class once over the horizon, yielding both the per-class
/// terminal breakdown and the yearly portfolio rows. Totals saturate at the
/// `i64` bounds.
fn simulate(
    profile: &InvestorProfile,
    rates: &ReturnRates,
    amounts: &PerAsset<u64>,
) -> (PerAsset<ProjectionBreakdown>, Vec<ProjectionYear>) {
    let mut accounts = amounts.map(|asset, amount| {
        SipAccount::new(amount as f64, rates.get(asset), profile.annual_step_up)
    });

    let mut trace = Vec::with_capacity(profile.horizon_years as usize);
    for year in 1..=profile.horizon_years {
        let mut monthly_contribution = 0.0;
        let mut invested = 0i64;
        let mut value = 0i64;
        for account in [
            &mut accounts.equity,
            &mut accounts.debt,
            &mut accounts.gold,
            &mut accounts.silver,
        ] {
            let end = account.run_year();
            monthly_contribution += end.contribution_monthly;
            invested = invested.saturating_add(round_currency(end.invested));
            value = value.saturating_add(round_currency(end.balance));
        }
        trace.push(ProjectionYear {
            year,
            monthly_contribution: round_currency(monthly_contribution),
            invested,
            value,
        });
    }

    let breakdown = PerAsset {
        equity: ProjectionBreakdown::from(accounts.equity.projection()),
        debt: ProjectionBreakdown::from(accounts.debt.projection()),
        gold: ProjectionBreakdown::from(accounts.gold.projection()),
        silver: ProjectionBreakdown::from(accounts.silver.projection()),
    };
    (breakdown, trace)
}
