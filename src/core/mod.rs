mod allocation;
mod engine;
mod error;
mod projection;
mod solver;
mod types;

pub use allocation::{Resolution, resolve};
pub use engine::{
    monthly_amounts, resolve_allocation, run_yearly_projection_trace, weighted_annual_rate,
};
pub use error::{InputError, InputResult, MAX_HORIZON_YEARS, MIN_MONTHLY_AMOUNT};
pub use projection::project;
pub use solver::{EstimateMethod, SipEstimate, SipGoal, estimate_required_sip};
pub use types::{
    AllocationResult, AllocationWeights, AssetClass, EquitySlice, EquityStyle, EquitySubSplit,
    Exclusions, InvestorProfile, PerAsset, PortfolioProjection, Projection, ProjectionBreakdown,
    ProjectionYear, ReturnRates, RiskLevel,
};
