use axum::{
    Router,
    extract::{Json, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::core::{
    CalculatorProfile, CurrencyFormat, ElementKind, FormulaVariant, MemoryStore, RevealOptions,
    RevealPlan, RoiCalculator, RoiView, RootMargin, Scenario, SessionAction, SessionSnapshot,
    SessionState, TargetParts, reveal_plan,
};
use crate::error::LandingError;

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliScenario {
    Realistic,
    Optimistic,
    Conservative,
}

impl From<CliScenario> for Scenario {
    fn from(value: CliScenario) -> Self {
        match value {
            CliScenario::Realistic => Scenario::Realistic,
            CliScenario::Optimistic => Scenario::Optimistic,
            CliScenario::Conservative => Scenario::Conservative,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliVariant {
    ReturnOnly,
    WithPrincipal,
}

impl From<CliVariant> for FormulaVariant {
    fn from(value: CliVariant) -> Self {
        match value {
            CliVariant::ReturnOnly => FormulaVariant::ReturnOnly,
            CliVariant::WithPrincipal => FormulaVariant::WithPrincipal,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliCurrency {
    Dollar,
    Real,
}

impl From<CliCurrency> for CurrencyFormat {
    fn from(value: CliCurrency) -> Self {
        match value {
            CliCurrency::Dollar => CurrencyFormat::dollar(),
            CliCurrency::Real => CurrencyFormat::real(),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliElementKind {
    SolutionCard,
    TestimonialCard,
    StatCard,
    ServiceItem,
    IntegrationCategory,
    Generic,
}

impl From<CliElementKind> for ElementKind {
    fn from(value: CliElementKind) -> Self {
        match value {
            CliElementKind::SolutionCard => ElementKind::SolutionCard,
            CliElementKind::TestimonialCard => ElementKind::TestimonialCard,
            CliElementKind::StatCard => ElementKind::StatCard,
            CliElementKind::ServiceItem => ElementKind::ServiceItem,
            CliElementKind::IntegrationCategory => ElementKind::IntegrationCategory,
            CliElementKind::Generic => ElementKind::Generic,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "landing",
    about = "Landing page interaction core: ROI scenarios, scroll reveals and the page server"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the landing page and its JSON API
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
        #[arg(long, default_value = "0.0.0.0")]
        bind: IpAddr,
        #[arg(
            long,
            default_value_t = crate::core::DEFAULT_THRESHOLD,
            help = "Visible fraction an element needs before it is revealed"
        )]
        threshold: f64,
        #[arg(
            long,
            default_value = "0px 0px -50px 0px",
            help = "CSS margin applied to the viewport when observing elements"
        )]
        root_margin: String,
    },
    /// Print the calculator view for one investment as JSON
    Calculate {
        #[arg(long, allow_hyphen_values = true, help = "Raw investment text, read like a form input")]
        investment: String,
        #[arg(long, value_enum, default_value_t = CliScenario::Realistic)]
        scenario: CliScenario,
        #[arg(
            long,
            value_enum,
            default_value_t = CliVariant::ReturnOnly,
            help = "return-only projects returns alone; with-principal adds the investment back"
        )]
        variant: CliVariant,
        #[arg(long, value_enum, default_value_t = CliCurrency::Dollar)]
        currency: CliCurrency,
    },
    /// Print the reveal timeline for one element kind as JSON
    RevealPlan {
        #[arg(long, value_enum)]
        kind: CliElementKind,
        #[arg(long, default_value_t = 0, help = "Number of feature list items on a solution card")]
        features: usize,
        #[arg(long, help = "Numeric label of a stat card, e.g. \"98%\"")]
        label: Option<String>,
        #[arg(long, help = "Leave out the icon, title, content and author parts")]
        bare: bool,
    },
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Landing(#[from] LandingError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Clone, Debug)]
struct AppState {
    reveal: RevealOptions,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InvestmentInput {
    Number(f64),
    Text(String),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CalculatePayload {
    investment: Option<InvestmentInput>,
    scenario: Option<String>,
    variant: Option<String>,
    currency: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RevealPlanQuery {
    kind: Option<String>,
    classes: Option<String>,
    features: Option<usize>,
    icon: Option<bool>,
    title: Option<bool>,
    content: Option<bool>,
    author: Option<bool>,
    label: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SessionPayload {
    preferences: BTreeMap<String, String>,
    action: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct KindDelay {
    kind: ElementKind,
    delay_ms: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionResponse {
    session: SessionSnapshot,
    preferences: BTreeMap<String, String>,
    reveal: RevealOptions,
    delays: Vec<KindDelay>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub async fn run(cli: Cli) -> Result<(), AppError> {
    match cli.command {
        Command::Serve {
            port,
            bind,
            threshold,
            root_margin,
        } => {
            let reveal = RevealOptions::new(threshold, root_margin.parse::<RootMargin>()?)?;
            run_http_server(SocketAddr::new(bind, port), reveal).await?;
        }
        Command::Calculate {
            investment,
            scenario,
            variant,
            currency,
        } => {
            let mut calculator =
                RoiCalculator::new(CalculatorProfile::new(variant.into(), currency.into()));
            calculator.select(scenario.into());
            let view = calculator.set_investment(&investment);
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        Command::RevealPlan {
            kind,
            features,
            label,
            bare,
        } => {
            let parts = TargetParts {
                icon: !bare,
                title: !bare,
                features,
                content: !bare,
                author: !bare,
                stat_label: label,
            };
            let plan = reveal_plan(kind.into(), &parts);
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
    }
    Ok(())
}

fn router(reveal: RevealOptions) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route(
            "/api/calculate",
            get(calculate_get_handler).post(calculate_post_handler),
        )
        .route("/api/reveal-plan", get(reveal_plan_handler))
        .route(
            "/api/session",
            get(session_get_handler).post(session_post_handler),
        )
        .fallback(not_found_handler)
        .with_state(Arc::new(AppState { reveal }))
}

pub async fn run_http_server(addr: SocketAddr, reveal: RevealOptions) -> std::io::Result<()> {
    let app = router(reveal);
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, threshold = reveal.threshold, root_margin = %reveal.root_margin, "landing page listening");
    info!("local access: http://127.0.0.1:{}/", addr.port());

    axum::serve(listener, app).await
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn styles_handler() -> impl IntoResponse {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLES_CSS,
    ))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn calculate_get_handler(Query(payload): Query<CalculatePayload>) -> Response {
    calculate_handler_impl(payload)
}

async fn calculate_post_handler(Json(payload): Json<CalculatePayload>) -> Response {
    calculate_handler_impl(payload)
}

fn calculate_handler_impl(payload: CalculatePayload) -> Response {
    match calculate_view(payload) {
        Ok(view) => json_response(StatusCode::OK, view),
        Err(err) => {
            warn!(error = %err, "rejected calculate request");
            error_response(StatusCode::BAD_REQUEST, &err.to_string())
        }
    }
}

async fn reveal_plan_handler(Query(query): Query<RevealPlanQuery>) -> Response {
    match plan_from_query(query) {
        Ok(plan) => json_response(StatusCode::OK, plan),
        Err(err) => error_response(StatusCode::BAD_REQUEST, &err.to_string()),
    }
}

async fn session_get_handler(State(state): State<Arc<AppState>>) -> Response {
    session_handler_impl(&state, SessionPayload::default())
}

async fn session_post_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SessionPayload>,
) -> Response {
    session_handler_impl(&state, payload)
}

fn session_handler_impl(state: &AppState, payload: SessionPayload) -> Response {
    match session_response(state, payload) {
        Ok(body) => json_response(StatusCode::OK, body),
        Err(err) => {
            warn!(error = %err, "rejected session request");
            error_response(StatusCode::BAD_REQUEST, &err.to_string())
        }
    }
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

fn parse_opt<T>(value: Option<&str>) -> Result<Option<T>, LandingError>
where
    T: FromStr<Err = LandingError>,
{
    value.map(str::parse::<T>).transpose()
}

fn calculate_view(payload: CalculatePayload) -> Result<RoiView, LandingError> {
    let variant: FormulaVariant = parse_opt(payload.variant.as_deref())?.unwrap_or_default();
    let currency: CurrencyFormat = parse_opt(payload.currency.as_deref())?.unwrap_or_default();
    let scenario: Scenario = parse_opt(payload.scenario.as_deref())?.unwrap_or_default();

    let mut calculator = RoiCalculator::new(CalculatorProfile::new(variant, currency));
    calculator.select(scenario);
    Ok(match payload.investment {
        Some(InvestmentInput::Number(value)) => calculator.set_investment_value(value),
        Some(InvestmentInput::Text(text)) => calculator.set_investment(&text),
        None => calculator.view(),
    })
}

fn plan_from_query(query: RevealPlanQuery) -> Result<RevealPlan, LandingError> {
    let kind = match (query.kind.as_deref(), query.classes.as_deref()) {
        (Some(kind), _) => kind.parse::<ElementKind>()?,
        (None, Some(classes)) => ElementKind::from_class_list(classes),
        (None, None) => return Err(LandingError::UnknownElementKind(String::new())),
    };
    let parts = TargetParts {
        icon: query.icon.unwrap_or(true),
        title: query.title.unwrap_or(true),
        features: query.features.unwrap_or(0),
        content: query.content.unwrap_or(true),
        author: query.author.unwrap_or(true),
        stat_label: query.label,
    };
    Ok(reveal_plan(kind, &parts))
}

/// Loads the page's stored preferences, applies at most one action, and returns what to persist.
fn session_response(
    state: &AppState,
    payload: SessionPayload,
) -> Result<SessionResponse, LandingError> {
    let action: Option<SessionAction> = parse_opt(payload.action.as_deref())?;
    let store: MemoryStore = payload.preferences.into_iter().collect();
    let mut session = SessionState::load(store, CalculatorProfile::default());
    if let Some(action) = action {
        session.apply(action);
    }
    Ok(SessionResponse {
        session: session.snapshot(),
        preferences: session.store().preferences(),
        reveal: state.reveal,
        delays: [
            ElementKind::SolutionCard,
            ElementKind::TestimonialCard,
            ElementKind::StatCard,
            ElementKind::ServiceItem,
            ElementKind::IntegrationCategory,
            ElementKind::Generic,
        ]
        .into_iter()
        .map(|kind| KindDelay {
            kind,
            delay_ms: kind.reveal_delay_ms(),
        })
        .collect(),
    })
}

#[cfg(test)]
fn calculate_view_from_json(json: &str) -> Result<RoiView, String> {
    let payload = serde_json::from_str::<CalculatePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    calculate_view(payload).map_err(|e| e.to_string())
}
