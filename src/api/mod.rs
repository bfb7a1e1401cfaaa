use axum::{
    Router,
    extract::{
        Json, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::net::SocketAddr;
use std::process::ExitCode;
use tokio::net::TcpListener;

use crate::core::{
    AllocationResult, Exclusions, InputError, InputResult, InvestorProfile, MAX_HORIZON_YEARS,
    MIN_MONTHLY_AMOUNT, ReturnRates, RiskLevel, SipEstimate, SipGoal, estimate_required_sip,
    resolve_allocation,
};

const DEFAULT_PORT: u16 = 8080;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliRisk {
    Low,
    Medium,
    High,
}

impl From<CliRisk> for RiskLevel {
    fn from(value: CliRisk) -> Self {
        match value {
            CliRisk::Low => RiskLevel::Low,
            CliRisk::Medium => RiskLevel::Medium,
            CliRisk::High => RiskLevel::High,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
enum ApiRisk {
    #[serde(alias = "Low", alias = "LOW")]
    Low,
    #[serde(alias = "Medium", alias = "MEDIUM")]
    Medium,
    #[serde(alias = "High", alias = "HIGH")]
    High,
}

impl From<ApiRisk> for CliRisk {
    fn from(value: ApiRisk) -> Self {
        match value {
            ApiRisk::Low => CliRisk::Low,
            ApiRisk::Medium => CliRisk::Medium,
            ApiRisk::High => CliRisk::High,
        }
    }
}

impl From<RiskLevel> for ApiRisk {
    fn from(value: RiskLevel) -> Self {
        match value {
            RiskLevel::Low => ApiRisk::Low,
            RiskLevel::Medium => ApiRisk::Medium,
            RiskLevel::High => ApiRisk::High,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct AllocatePayload {
    age: Option<i64>,
    horizon: Option<i64>,
    risk: Option<ApiRisk>,
    amount: Option<i64>,
    step_up: Option<f64>,

    exclude_debt: Option<bool>,
    exclude_commodities: Option<bool>,
    exclude_us_equity: Option<bool>,

    equity_rate: Option<f64>,
    debt_rate: Option<f64>,
    gold_rate: Option<f64>,
    silver_rate: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct EstimatePayload {
    target: Option<f64>,
    horizon: Option<i64>,
    rate: Option<f64>,
    step_up: Option<f64>,
}

#[derive(Parser, Debug)]
#[command(
    name = "sip-planner",
    about = "SIP asset allocation planner (equity, debt, gold, silver) with step-up growth projection"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve an allocation and project its terminal value
    Allocate(AllocateArgs),
    /// Estimate the monthly SIP needed to reach a target corpus
    Estimate(EstimateArgs),
    /// Serve the JSON HTTP API
    Serve {
        #[arg(default_value_t = DEFAULT_PORT)]
        port: u16,
    },
}

#[derive(Args, Debug, Clone)]
struct AllocateArgs {
    #[arg(long, default_value_t = 30, allow_negative_numbers = true)]
    age: i64,
    #[arg(
        long,
        default_value_t = 10,
        allow_negative_numbers = true,
        help = "Investment horizon in whole years"
    )]
    horizon: i64,
    #[arg(long, value_enum, default_value_t = CliRisk::Medium)]
    risk: CliRisk,
    #[arg(
        long,
        default_value_t = 10_000,
        allow_negative_numbers = true,
        help = "Monthly SIP amount in currency units, at least 500"
    )]
    monthly_amount: i64,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Annual increase of the monthly amount in percent"
    )]
    step_up: f64,
    #[arg(long, help = "Move the debt allocation into equity")]
    exclude_debt: bool,
    #[arg(long, help = "Move the gold and silver allocation into equity")]
    exclude_commodities: bool,
    #[arg(long, help = "Keep the equity sub-split domestic")]
    exclude_us_equity: bool,
    #[arg(long, default_value_t = 12.0, help = "Expected annual equity return in percent")]
    equity_rate: f64,
    #[arg(long, default_value_t = 7.0, help = "Expected annual debt return in percent")]
    debt_rate: f64,
    #[arg(long, default_value_t = 8.0, help = "Expected annual gold return in percent")]
    gold_rate: f64,
    #[arg(long, default_value_t = 8.0, help = "Expected annual silver return in percent")]
    silver_rate: f64,
}

#[derive(Args, Debug, Clone)]
struct EstimateArgs {
    #[arg(long, help = "Target corpus in currency units")]
    target: f64,
    #[arg(long, default_value_t = 10, allow_negative_numbers = true)]
    horizon: i64,
    #[arg(long, default_value_t = 12.0, help = "Expected annual return in percent")]
    rate: f64,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Annual increase of the monthly amount in percent"
    )]
    step_up: f64,
}

#[derive(Debug)]
struct AllocationRequest {
    profile: InvestorProfile,
    rates: ReturnRates,
    exclusions: Exclusions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AllocateResponse {
    age: u32,
    horizon: u32,
    risk: ApiRisk,
    monthly_amount: u64,
    step_up: f64,
    rates: ReturnRates,
    exclude_debt: bool,
    exclude_commodities: bool,
    exclude_us_equity: bool,
    #[serde(flatten)]
    result: AllocationResult,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

pub async fn run_cli<I, T>(args: I) -> ExitCode
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) => e.exit(),
    };

    match cli.command {
        Command::Allocate(args) => match build_request(args) {
            Ok(request) => print_json(&allocate(&request)),
            Err(e) => usage_error(&e),
        },
        Command::Estimate(args) => match build_goal(args).and_then(estimate_required_sip) {
            Ok(estimate) => print_json(&estimate),
            Err(e) => usage_error(&e),
        },
        Command::Serve { port } => match run_http_server(port).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Server error: {e}");
                ExitCode::FAILURE
            }
        },
    }
}

fn print_json<T: Serialize>(body: &T) -> ExitCode {
    match serde_json::to_string_pretty(body) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to serialize result: {e}");
            ExitCode::FAILURE
        }
    }
}

fn usage_error(err: &InputError) -> ExitCode {
    eprintln!("Invalid input: {err}");
    ExitCode::from(2)
}

fn clamp_years(value: i64) -> InputResult<u32> {
    let years = value.max(0);
    if years > i64::from(MAX_HORIZON_YEARS) {
        return Err(InputError::HorizonTooLong(value));
    }
    Ok(years as u32)
}

fn clamp_age(value: i64) -> u32 {
    value.clamp(0, i64::from(u32::MAX)) as u32
}

fn validate_step_up(step_up: f64) -> InputResult<f64> {
    if !step_up.is_finite() || step_up < 0.0 {
        return Err(InputError::InvalidStepUp(step_up));
    }
    Ok(step_up)
}

fn validate_rate(name: &'static str, value: f64) -> InputResult<f64> {
    if !value.is_finite() {
        return Err(InputError::NonFiniteRate { name, value });
    }
    Ok(value)
}

fn build_request(args: AllocateArgs) -> InputResult<AllocationRequest> {
    if args.monthly_amount < MIN_MONTHLY_AMOUNT as i64 {
        return Err(InputError::AmountBelowMinimum(args.monthly_amount));
    }

    let profile = InvestorProfile {
        age: clamp_age(args.age),
        horizon_years: clamp_years(args.horizon)?,
        risk: args.risk.into(),
        monthly_amount: args.monthly_amount as u64,
        annual_step_up: validate_step_up(args.step_up)?,
    };
    let rates = ReturnRates {
        equity: validate_rate("equityRate", args.equity_rate)?,
        debt: validate_rate("debtRate", args.debt_rate)?,
        gold: validate_rate("goldRate", args.gold_rate)?,
        silver: validate_rate("silverRate", args.silver_rate)?,
    };
    let exclusions = Exclusions {
        exclude_debt: args.exclude_debt,
        exclude_commodities: args.exclude_commodities,
        exclude_us_equity: args.exclude_us_equity,
    };

    Ok(AllocationRequest {
        profile,
        rates,
        exclusions,
    })
}

fn build_goal(args: EstimateArgs) -> InputResult<SipGoal> {
    Ok(SipGoal {
        target_amount: args.target,
        annual_rate: args.rate,
        horizon_years: clamp_years(args.horizon)?,
        annual_step_up: args.step_up,
    })
}

fn allocate(request: &AllocationRequest) -> AllocateResponse {
    let profile = &request.profile;
    let result = resolve_allocation(profile, &request.rates, request.exclusions);
    AllocateResponse {
        age: profile.age,
        horizon: profile.horizon_years,
        risk: profile.risk.into(),
        monthly_amount: profile.monthly_amount,
        step_up: profile.annual_step_up,
        rates: request.rates,
        exclude_debt: request.exclusions.exclude_debt,
        exclude_commodities: request.exclusions.exclude_commodities,
        exclude_us_equity: request.exclusions.exclude_us_equity,
        result,
    }
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "SIP planner HTTP API listening");
    tracing::info!("Local access: http://127.0.0.1:{port}/api/allocate");

    axum::serve(listener, router()).await
}

fn router() -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/api/allocate",
            get(allocate_get_handler).post(allocate_post_handler),
        )
        .route(
            "/api/sip-estimate",
            get(estimate_get_handler).post(estimate_post_handler),
        )
        .fallback(not_found_handler)
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, HealthResponse { status: "ok" })
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn allocate_get_handler(
    payload: Result<Query<AllocatePayload>, QueryRejection>,
) -> Response {
    match payload {
        Ok(Query(payload)) => allocate_handler_impl(payload),
        Err(rejection) => malformed_payload(rejection.body_text()),
    }
}

async fn allocate_post_handler(payload: Result<Json<AllocatePayload>, JsonRejection>) -> Response {
    match payload {
        Ok(Json(payload)) => allocate_handler_impl(payload),
        Err(rejection) => malformed_payload(rejection.body_text()),
    }
}

async fn estimate_get_handler(payload: Result<Query<EstimatePayload>, QueryRejection>) -> Response {
    match payload {
        Ok(Query(payload)) => estimate_handler_impl(payload),
        Err(rejection) => malformed_payload(rejection.body_text()),
    }
}

async fn estimate_post_handler(payload: Result<Json<EstimatePayload>, JsonRejection>) -> Response {
    match payload {
        Ok(Json(payload)) => estimate_handler_impl(payload),
        Err(rejection) => malformed_payload(rejection.body_text()),
    }
}

fn malformed_payload(detail: String) -> Response {
    tracing::warn!(error = %detail, "malformed request payload");
    error_response(StatusCode::BAD_REQUEST, &detail)
}

fn allocate_handler_impl(payload: AllocatePayload) -> Response {
    let request = match allocation_request_from_payload(payload) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!(error = %e, "rejected allocation payload");
            return error_response(StatusCode::BAD_REQUEST, &e.to_string());
        }
    };

    tracing::debug!(
        age = request.profile.age,
        horizon = request.profile.horizon_years,
        risk = ?request.profile.risk,
        monthly_amount = request.profile.monthly_amount,
        "resolving allocation"
    );
    json_response(StatusCode::OK, allocate(&request))
}

fn estimate_handler_impl(payload: EstimatePayload) -> Response {
    match estimate_from_payload(payload) {
        Ok(estimate) => json_response(StatusCode::OK, estimate),
        Err(e) => {
            tracing::warn!(error = %e, "rejected sip estimate payload");
            error_response(StatusCode::BAD_REQUEST, &e.to_string())
        }
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

fn allocation_request_from_payload(payload: AllocatePayload) -> InputResult<AllocationRequest> {
    let mut args = default_allocate_args();

    if let Some(v) = payload.age {
        args.age = v;
    }
    if let Some(v) = payload.horizon {
        args.horizon = v;
    }
    if let Some(v) = payload.risk {
        args.risk = v.into();
    }
    if let Some(v) = payload.amount {
        args.monthly_amount = v;
    }
    if let Some(v) = payload.step_up {
        args.step_up = v;
    }

    if let Some(v) = payload.exclude_debt {
        args.exclude_debt = v;
    }
    if let Some(v) = payload.exclude_commodities {
        args.exclude_commodities = v;
    }
    if let Some(v) = payload.exclude_us_equity {
        args.exclude_us_equity = v;
    }

    if let Some(v) = payload.equity_rate {
        args.equity_rate = v;
    }
    if let Some(v) = payload.debt_rate {
        args.debt_rate = v;
    }
    if let Some(v) = payload.gold_rate {
        args.gold_rate = v;
    }
    if let Some(v) = payload.silver_rate {
        args.silver_rate = v;
    }

    build_request(args)
}

fn estimate_from_payload(payload: EstimatePayload) -> InputResult<SipEstimate> {
    let mut args = default_estimate_args();

    if let Some(v) = payload.target {
        args.target = v;
    }
    if let Some(v) = payload.horizon {
        args.horizon = v;
    }
    if let Some(v) = payload.rate {
        args.rate = v;
    }
    if let Some(v) = payload.step_up {
        args.step_up = v;
    }

    estimate_required_sip(build_goal(args)?)
}

fn default_allocate_args() -> AllocateArgs {
    let rates = ReturnRates::default();
    AllocateArgs {
        age: 30,
        horizon: 10,
        risk: CliRisk::Medium,
        monthly_amount: 10_000,
        step_up: 0.0,
        exclude_debt: false,
        exclude_commodities: false,
        exclude_us_equity: false,
        equity_rate: rates.equity,
        debt_rate: rates.debt,
        gold_rate: rates.gold,
        silver_rate: rates.silver,
    }
}

fn default_estimate_args() -> EstimateArgs {
    EstimateArgs {
        target: 5_000_000.0,
        horizon: 10,
        rate: 12.0,
        step_up: 0.0,
    }
}
