use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::data::registry::TableCache;
use crate::data::table::{Granularity, IntegralRow};
use crate::data::TableError;
use crate::dls::{
    assess, par_score_now, par_sheet, team2_resources, team2_resources_used, DlsAssessment,
    InningsInput, ParSheetRow, TargetFormula,
};
use crate::parallel::WorkerPool;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request body: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Table(#[from] TableError),
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Parse(_) | Self::Validation(_) => 400,
            Self::Table(TableError::UnknownFormat(_)) => 404,
            Self::Table(_) => 500,
        }
    }
}

/// Clamp a resource percentage from a request into [0, 100].
fn resource_input(field: &str, value: f64) -> Result<f64, ApiError> {
    if !value.is_finite() {
        return Err(ApiError::Validation(format!("{field} must be a finite number")));
    }
    let clamped = value.clamp(0.0, 100.0);
    if clamped != value {
        tracing::warn!(field, value, "resource input clamped into 0-100");
    }
    Ok(clamped)
}

pub fn health_payload() -> Value {
    serde_json::json!({
        "status": "ok",
        "service": "dls-api",
        "version": env!("CARGO_PKG_VERSION")
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct FormatListItem {
    pub format_overs: u32,
    pub g50: f64,
    pub table: String,
    pub loaded: bool,
}

pub fn formats_payload(cache: &TableCache) -> Value {
    let loaded = cache.loaded_formats();
    let formats: Vec<FormatListItem> = cache
        .config()
        .formats
        .iter()
        .map(|entry| FormatListItem {
            format_overs: entry.format_overs,
            g50: entry.g50,
            table: entry.table.display().to_string(),
            loaded: loaded.contains(&entry.format_overs),
        })
        .collect();
    serde_json::json!({
        "target_formula": cache.config().target_formula,
        "formats": formats
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct TableResponse {
    pub format_overs: u32,
    pub granularity: Granularity,
    pub rows: Vec<IntegralRow>,
}

pub fn table_payload(cache: &TableCache, format_overs: u32) -> Result<TableResponse, ApiError> {
    let table = cache.get(format_overs)?;
    Ok(TableResponse {
        format_overs,
        granularity: table.granularity(),
        rows: table.integral_rows(),
    })
}

#[derive(Debug, Clone, Deserialize)]
pub struct TargetRequest {
    pub format_overs: u32,
    pub team1_score: u32,
    pub team1_resources: f64,
    pub team2_resources: f64,
    pub g50: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TargetResponse {
    pub status: &'static str,
    pub formula: TargetFormula,
    pub g50: f64,
    pub target: u32,
}

pub fn target_payload(cache: &TableCache, body: &str) -> Result<TargetResponse, ApiError> {
    let req: TargetRequest = serde_json::from_str(body)?;
    let context = cache.context(req.format_overs)?;
    let r1 = resource_input("team1_resources", req.team1_resources)?;
    let r2 = resource_input("team2_resources", req.team2_resources)?;
    let g50 = match req.g50 {
        Some(g50) if !(g50.is_finite() && g50 > 0.0) => {
            return Err(ApiError::Validation("g50 must be a positive number".to_string()));
        }
        Some(g50) => g50,
        None => context.g50,
    };
    let formula = cache.config().target_formula;
    Ok(TargetResponse {
        status: "ok",
        formula,
        g50,
        target: formula.target(req.team1_score, r1, r2, g50),
    })
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParRequest {
    pub format_overs: u32,
    pub team1_score: u32,
    pub team1_resources: f64,
    pub max_overs: u32,
    pub balls_bowled: u32,
    pub wickets_lost: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParResponse {
    pub status: &'static str,
    pub team2_resources_remaining: f64,
    pub team2_resources_used: f64,
    pub par_score: u32,
}

pub fn par_payload(cache: &TableCache, body: &str) -> Result<ParResponse, ApiError> {
    let req: ParRequest = serde_json::from_str(body)?;
    let context = cache.context(req.format_overs)?;
    let r1 = resource_input("team1_resources", req.team1_resources)?;
    if req.wickets_lost > 10 {
        tracing::warn!(
            wickets_lost = req.wickets_lost,
            "wickets lost above 10, read from the nine-down column"
        );
    }
    let remaining = team2_resources(&context, req.max_overs, req.balls_bowled, req.wickets_lost);
    let used = team2_resources_used(&context, req.max_overs, req.balls_bowled, req.wickets_lost);
    Ok(ParResponse {
        status: "ok",
        team2_resources_remaining: remaining,
        team2_resources_used: used,
        par_score: par_score_now(req.team1_score, r1, used),
    })
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParSheetRequest {
    pub format_overs: u32,
    pub team1_score: u32,
    pub team1_resources: f64,
    pub innings_limit: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParSheetResponse {
    pub status: &'static str,
    pub innings_limit: u32,
    pub rows: Vec<ParSheetRow>,
}

pub fn par_sheet_payload(cache: &TableCache, body: &str) -> Result<ParSheetResponse, ApiError> {
    let req: ParSheetRequest = serde_json::from_str(body)?;
    let context = cache.context(req.format_overs)?;
    let r1 = resource_input("team1_resources", req.team1_resources)?;
    let innings_limit = context.clamp_limit(req.innings_limit.unwrap_or(req.format_overs));
    Ok(ParSheetResponse {
        status: "ok",
        innings_limit,
        rows: par_sheet(&context, req.team1_score, r1, innings_limit, &WorkerPool::default()),
    })
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssessRequest {
    pub format_overs: u32,
    pub team1_score: u32,
    pub team1: InningsInput,
    pub team2: InningsInput,
}

pub fn assess_payload(cache: &TableCache, body: &str) -> Result<DlsAssessment, ApiError> {
    let req: AssessRequest = serde_json::from_str(body)?;
    let context = cache.context(req.format_overs)?;
    for (field, innings) in [("team1", &req.team1), ("team2", &req.team2)] {
        if innings.max_overs_initial == 0 {
            return Err(ApiError::Validation(format!(
                "{field}.max_overs_initial must be positive"
            )));
        }
    }
    Ok(assess(
        &context,
        cache.config().target_formula,
        req.team1_score,
        &req.team1,
        &req.team2,
    ))
}
