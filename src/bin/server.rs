use axum::{
    Json, Router,
    http::StatusCode,
    routing::{get, post},
};
use plate_cutter::export::PlanNode;
use plate_cutter::instance::{Instance, InstanceData};
use plate_cutter::params::Params;
use plate_cutter::solver::{Solver, SolverConfig};
use serde::{Deserialize, Serialize};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

#[derive(Deserialize, Serialize)]
struct OptimizeRequest {
    instance: InstanceData,
    #[serde(default)]
    time_limit_ms: Option<u64>,
    #[serde(default = "default_beam")]
    beam: usize,
    #[serde(default = "default_comparator")]
    comparator: u8,
    #[serde(default = "default_min_waste")]
    min_waste: i64,
}

fn default_beam() -> usize {
    64
}

fn default_comparator() -> u8 {
    2
}

fn default_min_waste() -> i64 {
    20
}

#[derive(Serialize)]
struct OptimizeResponse {
    item_number: usize,
    plate_number: usize,
    waste: i64,
    waste_percent: f64,
    used_width: i64,
    nodes: Vec<PlanNode>,
}

async fn optimize(
    Json(req): Json<OptimizeRequest>,
) -> Result<Json<OptimizeResponse>, (StatusCode, String)> {
    tracing::info!(
        body = serde_json::to_string(&req).unwrap_or_default(),
        "POST /optimize"
    );

    if req.comparator > 3 {
        return Err((
            StatusCode::BAD_REQUEST,
            "comparator must be 0-3".to_string(),
        ));
    }
    let instance =
        Instance::from_data(&req.instance).map_err(|e| (StatusCode::BAD_REQUEST, e))?;

    let mut params = Params::default().with_min_waste(req.min_waste);
    if let Some(ms) = req.time_limit_ms {
        params = params.with_time_limit(std::time::Duration::from_millis(ms));
    }
    let config = SolverConfig {
        beam_width: req.beam,
        comparator: req.comparator,
        break_symmetries: true,
    };

    let solver = Solver::new(&instance, params, config);
    let solution = solver.solve().ok_or((
        StatusCode::UNPROCESSABLE_ENTITY,
        "no feasible cutting plan found".to_string(),
    ))?;

    let response = OptimizeResponse {
        item_number: solution.item_number(),
        plate_number: solution.plate_number(),
        waste: solution.final_waste(),
        waste_percent: solution.final_waste() as f64 / instance.item_surface() as f64 * 100.0,
        used_width: solution.used_width(),
        nodes: solution.plan_nodes(),
    };
    Ok(Json(response))
}

#[tokio::main]
async fn main() {
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("development.log")
        .expect("failed to open development.log");

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_target(false)
        .with_ansi(false)
        .with_max_level(Level::INFO)
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3001".to_string());
    let addr = format!("0.0.0.0:{port}");

    let app = Router::new()
        .route("/up", get(|| async { "ok" }))
        .route("/optimize", post(optimize))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    eprintln!("Listening on {addr}");
    axum::serve(listener, app).await.unwrap();
}
