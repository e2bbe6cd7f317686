use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{debug, info};

use crate::core::{AllocationResult, Profile, SatisfactionCurve, Tuning, compute_allocations};

/// One intake row as sent by the web form or a spreadsheet export. Every
/// field is optional: omitted scores mean "unanswered" and omitted
/// categoricals mean "no answer", exactly like a blank cell.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct AllocatePayload {
    priority: Option<String>,
    income_range: Option<String>,
    essentials_range: Option<String>,
    debt_load: Option<String>,
    interest_level: Option<String>,
    emergency_fund: Option<String>,
    income_stability: Option<String>,
    goal_timeline: Option<String>,
    dependents: Option<String>,
    stage_of_life: Option<String>,

    satisfaction: Option<f64>,
    discipline: Option<f64>,
    impulse: Option<f64>,
    long_term: Option<f64>,
    emotion_spend: Option<f64>,
    emotion_safety: Option<f64>,
    avoidance: Option<f64>,
    lifestyle: Option<f64>,
    growth: Option<f64>,
    stability: Option<f64>,
    autonomy: Option<f64>,
    literacy_level: Option<f64>,

    min_essentials_pct: Option<f64>,
    max_recommended_essentials_pct: Option<f64>,
    min_invest_pct: Option<f64>,
    max_enjoyment_pct: Option<f64>,
    max_positive_mod: Option<i32>,
    max_negative_mod: Option<i32>,
    round_factor: Option<f64>,
    satisfaction_neutral: Option<f64>,
    satisfaction_step: Option<f64>,
    satisfaction_max_boost: Option<f64>,
}

#[derive(Parser, Debug)]
#[command(
    name = "bucketplan",
    about = "Four-bucket money allocation scoring (Multiply / Essentials / Freedom / Enjoyment)"
)]
struct Cli {
    #[arg(long, default_value = "", help = "Stated primary priority")]
    priority: String,
    #[arg(long, default_value = "", help = "Income bracket code A-F")]
    income_range: String,
    #[arg(long, default_value = "", help = "Essentials spending bracket code A-F")]
    essentials_range: String,
    #[arg(long, default_value = "", help = "Debt load bracket code A-F")]
    debt_load: String,
    #[arg(long, default_value = "", help = "Debt interest level: High or Low")]
    interest_level: String,
    #[arg(long, default_value = "", help = "Emergency fund bracket code A-F")]
    emergency_fund: String,
    #[arg(long, default_value = "", help = "Income stability answer text")]
    income_stability: String,
    #[arg(long, default_value = "", help = "Goal timeline answer text")]
    goal_timeline: String,
    #[arg(long, default_value = "", help = "Dependents: Yes or No")]
    dependents: String,
    #[arg(long, default_value = "", help = "Stage of life answer text")]
    stage_of_life: String,

    #[arg(long, default_value_t = 0.0, help = "Money satisfaction, 0-10 (0 = unanswered)")]
    satisfaction: f64,
    #[arg(long, default_value_t = 0.0, help = "Follow-through discipline, 0-10")]
    discipline: f64,
    #[arg(long, default_value_t = 0.0, help = "Impulse control, 0-10")]
    impulse: f64,
    #[arg(long, default_value_t = 0.0, help = "Long-term orientation, 0-10")]
    long_term: f64,
    #[arg(long, default_value_t = 0.0, help = "Mood lift from spending, 0-10")]
    emotion_spend: f64,
    #[arg(long, default_value_t = 0.0, help = "Need for financial safety, 0-10")]
    emotion_safety: f64,
    #[arg(long, default_value_t = 0.0, help = "Money avoidance, 0-10")]
    avoidance: f64,
    #[arg(long, default_value_t = 0.0, help = "Lifestyle motivation, 0-10")]
    lifestyle: f64,
    #[arg(long, default_value_t = 0.0, help = "Growth motivation, 0-10")]
    growth: f64,
    #[arg(long, default_value_t = 0.0, help = "Stability motivation, 0-10")]
    stability: f64,
    #[arg(long, default_value_t = 0.0, help = "Autonomy motivation, 0-10")]
    autonomy: f64,
    #[arg(long, default_value_t = 0.0, help = "Financial literacy level, 0-10")]
    literacy_level: f64,

    #[arg(long, default_value_t = 5.0, help = "Absolute minimum essentials percent")]
    min_essentials_pct: f64,
    #[arg(
        long,
        default_value_t = 60.0,
        help = "Reported essentials midpoints above this raise an overspend warning"
    )]
    max_recommended_essentials_pct: f64,
    #[arg(long, default_value_t = 10.0, help = "Investing percent below this raises a red flag")]
    min_invest_pct: f64,
    #[arg(
        long,
        default_value_t = 30.0,
        help = "Enjoyment percent above this raises a red flag"
    )]
    max_enjoyment_pct: f64,
    #[arg(long, default_value_t = 50, help = "Upper clamp for a bucket's modifier")]
    max_positive_mod: i32,
    #[arg(long, default_value_t = 30, help = "Lower clamp magnitude for a bucket's modifier")]
    max_negative_mod: i32,
    #[arg(
        long,
        default_value_t = 1.0,
        help = "Rounding granularity divisor: 1 = whole percent, 0.5 = half percent"
    )]
    round_factor: f64,
    #[arg(long, default_value_t = 5.0, help = "Satisfaction score treated as neutral")]
    satisfaction_neutral: f64,
    #[arg(
        long,
        default_value_t = 0.1,
        help = "Amplification added per satisfaction point above neutral"
    )]
    satisfaction_step: f64,
    #[arg(long, default_value_t = 0.3, help = "Cap on the satisfaction amplification boost")]
    satisfaction_max_boost: f64,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn build_profile(cli: Cli) -> Result<(Profile, Tuning), String> {
    for (flag, value) in [
        ("--satisfaction", cli.satisfaction),
        ("--discipline", cli.discipline),
        ("--impulse", cli.impulse),
        ("--long-term", cli.long_term),
        ("--emotion-spend", cli.emotion_spend),
        ("--emotion-safety", cli.emotion_safety),
        ("--avoidance", cli.avoidance),
        ("--lifestyle", cli.lifestyle),
        ("--growth", cli.growth),
        ("--stability", cli.stability),
        ("--autonomy", cli.autonomy),
        ("--literacy-level", cli.literacy_level),
    ] {
        if !value.is_finite() || !(0.0..=10.0).contains(&value) {
            return Err(format!("{flag} must be between 0 and 10"));
        }
    }

    for (flag, value) in [
        ("--min-essentials-pct", cli.min_essentials_pct),
        (
            "--max-recommended-essentials-pct",
            cli.max_recommended_essentials_pct,
        ),
        ("--min-invest-pct", cli.min_invest_pct),
        ("--max-enjoyment-pct", cli.max_enjoyment_pct),
    ] {
        if !value.is_finite() || !(0.0..=100.0).contains(&value) {
            return Err(format!("{flag} must be between 0 and 100"));
        }
    }

    if cli.max_positive_mod < 0 {
        return Err("--max-positive-mod must be >= 0".to_string());
    }
    if cli.max_negative_mod < 0 {
        return Err("--max-negative-mod must be >= 0".to_string());
    }
    if !cli.round_factor.is_finite() || cli.round_factor <= 0.0 {
        return Err("--round-factor must be > 0".to_string());
    }
    if !cli.satisfaction_neutral.is_finite() || !(0.0..=10.0).contains(&cli.satisfaction_neutral) {
        return Err("--satisfaction-neutral must be between 0 and 10".to_string());
    }
    if !cli.satisfaction_step.is_finite() || cli.satisfaction_step < 0.0 {
        return Err("--satisfaction-step must be >= 0".to_string());
    }
    if !cli.satisfaction_max_boost.is_finite() || cli.satisfaction_max_boost < 0.0 {
        return Err("--satisfaction-max-boost must be >= 0".to_string());
    }

    let profile = Profile {
        priority: cli.priority,
        income_range: cli.income_range,
        essentials_range: cli.essentials_range,
        debt_load: cli.debt_load,
        interest_level: cli.interest_level,
        emergency_fund: cli.emergency_fund,
        income_stability: cli.income_stability,
        goal_timeline: cli.goal_timeline,
        dependents: cli.dependents,
        stage_of_life: cli.stage_of_life,
        satisfaction: cli.satisfaction,
        discipline: cli.discipline,
        impulse: cli.impulse,
        long_term: cli.long_term,
        emotion_spend: cli.emotion_spend,
        emotion_safety: cli.emotion_safety,
        avoidance: cli.avoidance,
        lifestyle: cli.lifestyle,
        growth: cli.growth,
        stability: cli.stability,
        autonomy: cli.autonomy,
        literacy_level: cli.literacy_level,
    };

    let tuning = Tuning {
        satisfaction: SatisfactionCurve {
            neutral_score: cli.satisfaction_neutral,
            step: cli.satisfaction_step,
            max_boost: cli.satisfaction_max_boost,
        },
        min_essentials_pct: cli.min_essentials_pct,
        max_recommended_essentials_pct: cli.max_recommended_essentials_pct,
        min_invest_pct: cli.min_invest_pct,
        max_enjoyment_pct: cli.max_enjoyment_pct,
        max_positive_mod: cli.max_positive_mod,
        max_negative_mod: cli.max_negative_mod,
        round_factor: cli.round_factor,
        ..Tuning::default()
    };

    Ok((profile, tuning))
}

/// Score one profile from command-line flags and print the result as JSON.
pub fn run_once() -> Result<(), String> {
    let cli = Cli::parse();
    let (profile, tuning) = build_profile(cli)?;
    let result = compute_allocations(&profile, &tuning);
    let rendered = serde_json::to_string_pretty(&result)
        .map_err(|e| format!("failed to render result: {e}"))?;
    println!("{rendered}");
    Ok(())
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route(
            "/api/allocate",
            get(allocate_get_handler).post(allocate_post_handler),
        )
        .route("/api/allocate/batch", post(allocate_batch_handler))
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    info!("allocation API listening on http://{addr}");

    axum::serve(listener, app).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn allocate_get_handler(Query(payload): Query<AllocatePayload>) -> Response {
    allocate_handler_impl(payload).await
}

async fn allocate_post_handler(Json(payload): Json<AllocatePayload>) -> Response {
    allocate_handler_impl(payload).await
}

async fn allocate_handler_impl(payload: AllocatePayload) -> Response {
    debug!("scoring one profile");
    match score_payload(payload) {
        Ok(result) => json_response(StatusCode::OK, result),
        Err(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
    }
}

/// One request per spreadsheet export: each element is an intake row and the
/// response preserves row order.
async fn allocate_batch_handler(Json(payloads): Json<Vec<AllocatePayload>>) -> Response {
    debug!(rows = payloads.len(), "scoring batch");
    let mut results = Vec::with_capacity(payloads.len());
    for (row, payload) in payloads.into_iter().enumerate() {
        match score_payload(payload) {
            Ok(result) => results.push(result),
            Err(msg) => {
                return error_response(StatusCode::BAD_REQUEST, &format!("row {row}: {msg}"));
            }
        }
    }
    json_response(StatusCode::OK, results)
}

fn score_payload(payload: AllocatePayload) -> Result<AllocationResult, String> {
    let (profile, tuning) = api_request_from_payload(payload)?;
    Ok(compute_allocations(&profile, &tuning))
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

#[cfg(test)]
fn api_request_from_json(json: &str) -> Result<(Profile, Tuning), String> {
    let payload = serde_json::from_str::<AllocatePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    api_request_from_payload(payload)
}

fn api_request_from_payload(payload: AllocatePayload) -> Result<(Profile, Tuning), String> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.priority {
        cli.priority = v;
    }
    if let Some(v) = payload.income_range {
        cli.income_range = v;
    }
    if let Some(v) = payload.essentials_range {
        cli.essentials_range = v;
    }
    if let Some(v) = payload.debt_load {
        cli.debt_load = v;
    }
    if let Some(v) = payload.interest_level {
        cli.interest_level = v;
    }
    if let Some(v) = payload.emergency_fund {
        cli.emergency_fund = v;
    }
    if let Some(v) = payload.income_stability {
        cli.income_stability = v;
    }
    if let Some(v) = payload.goal_timeline {
        cli.goal_timeline = v;
    }
    if let Some(v) = payload.dependents {
        cli.dependents = v;
    }
    if let Some(v) = payload.stage_of_life {
        cli.stage_of_life = v;
    }

    if let Some(v) = payload.satisfaction {
        cli.satisfaction = v;
    }
    if let Some(v) = payload.discipline {
        cli.discipline = v;
    }
    if let Some(v) = payload.impulse {
        cli.impulse = v;
    }
    if let Some(v) = payload.long_term {
        cli.long_term = v;
    }
    if let Some(v) = payload.emotion_spend {
        cli.emotion_spend = v;
    }
    if let Some(v) = payload.emotion_safety {
        cli.emotion_safety = v;
    }
    if let Some(v) = payload.avoidance {
        cli.avoidance = v;
    }
    if let Some(v) = payload.lifestyle {
        cli.lifestyle = v;
    }
    if let Some(v) = payload.growth {
        cli.growth = v;
    }
    if let Some(v) = payload.stability {
        cli.stability = v;
    }
    if let Some(v) = payload.autonomy {
        cli.autonomy = v;
    }
    if let Some(v) = payload.literacy_level {
        cli.literacy_level = v;
    }

    if let Some(v) = payload.min_essentials_pct {
        cli.min_essentials_pct = v;
    }
    if let Some(v) = payload.max_recommended_essentials_pct {
        cli.max_recommended_essentials_pct = v;
    }
    if let Some(v) = payload.min_invest_pct {
        cli.min_invest_pct = v;
    }
    if let Some(v) = payload.max_enjoyment_pct {
        cli.max_enjoyment_pct = v;
    }
    if let Some(v) = payload.max_positive_mod {
        cli.max_positive_mod = v;
    }
    if let Some(v) = payload.max_negative_mod {
        cli.max_negative_mod = v;
    }
    if let Some(v) = payload.round_factor {
        cli.round_factor = v;
    }
    if let Some(v) = payload.satisfaction_neutral {
        cli.satisfaction_neutral = v;
    }
    if let Some(v) = payload.satisfaction_step {
        cli.satisfaction_step = v;
    }
    if let Some(v) = payload.satisfaction_max_boost {
        cli.satisfaction_max_boost = v;
    }

    build_profile(cli)
}

fn default_cli_for_api() -> Cli {
    Cli {
        priority: String::new(),
        income_range: String::new(),
        essentials_range: String::new(),
        debt_load: String::new(),
        interest_level: String::new(),
        emergency_fund: String::new(),
        income_stability: String::new(),
        goal_timeline: String::new(),
        dependents: String::new(),
        stage_of_life: String::new(),
        satisfaction: 0.0,
        discipline: 0.0,
        impulse: 0.0,
        long_term: 0.0,
        emotion_spend: 0.0,
        emotion_safety: 0.0,
        avoidance: 0.0,
        lifestyle: 0.0,
        growth: 0.0,
        stability: 0.0,
        autonomy: 0.0,
        literacy_level: 0.0,
        min_essentials_pct: 5.0,
        max_recommended_essentials_pct: 60.0,
        min_invest_pct: 10.0,
        max_enjoyment_pct: 30.0,
        max_positive_mod: 50,
        max_negative_mod: 30,
        round_factor: 1.0,
        satisfaction_neutral: 5.0,
        satisfaction_step: 0.1,
        satisfaction_max_boost: 0.3,
    }
}
