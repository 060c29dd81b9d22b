use actix_cors::Cors;
use actix_web::{get, post, web, App, HttpResponse, HttpServer, Responder, Result as ActixResult};
use forgecore::{analyze, execution_path, validate, GraphAnalysis, SimulationRequest, ValidationIssue};
use forgeruntime::{LocalBackend, WorkflowBackend};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

/// Application state shared across handlers
struct AppState {
    backend: Arc<dyn WorkflowBackend>,
}

/// Response for graph validation
#[derive(Debug, Serialize)]
struct ValidateResponse {
    valid: bool,
    issues: Vec<ValidationIssue>,
    analysis: GraphAnalysis,
}

/// Response for execution order preview
#[derive(Debug, Serialize)]
struct TraverseResponse {
    order: Vec<String>,
}

/// Error response
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// Health check endpoint
#[get("/health")]
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "forgeserver"
    }))
}

/// List automation actions
#[get("/api/automations")]
async fn list_automations(data: web::Data<AppState>) -> ActixResult<impl Responder> {
    match data.backend.automations().await {
        Ok(actions) => Ok(HttpResponse::Ok().json(actions)),
        Err(e) => {
            error!("Listing automations failed: {}", e);
            Ok(HttpResponse::BadGateway().json(ErrorResponse {
                error: e.to_string(),
            }))
        }
    }
}

/// Simulate a workflow snapshot
#[post("/api/simulate")]
async fn simulate_workflow(
    data: web::Data<AppState>,
    request: web::Json<SimulationRequest>,
) -> ActixResult<impl Responder> {
    let request = request.into_inner();

    info!(
        "Simulating workflow: {} nodes, {} edges",
        request.nodes.len(),
        request.edges.len()
    );

    match data.backend.simulate(&request).await {
        Ok(response) => Ok(HttpResponse::Ok().json(response)),
        Err(e) => {
            error!("Simulation failed: {}", e);
            Ok(HttpResponse::BadGateway().json(ErrorResponse {
                error: e.to_string(),
            }))
        }
    }
}

/// Validate a workflow snapshot
#[post("/api/validate")]
async fn validate_workflow(request: web::Json<SimulationRequest>) -> ActixResult<impl Responder> {
    let request = request.into_inner();
    let issues = validate(&request.nodes, &request.edges);
    let analysis = analyze(&request.nodes, &request.edges);

    Ok(HttpResponse::Ok().json(ValidateResponse {
        valid: issues.is_empty(),
        issues,
        analysis,
    }))
}

/// Execution order of a workflow snapshot, for the preview list
#[post("/api/traverse")]
async fn traverse_workflow(request: web::Json<SimulationRequest>) -> ActixResult<impl Responder> {
    let request = request.into_inner();

    Ok(HttpResponse::Ok().json(TraverseResponse {
        order: execution_path(&request.nodes, &request.edges),
    }))
}

fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health_check)
        .service(list_automations)
        .service(simulate_workflow)
        .service(validate_workflow)
        .service(traverse_workflow);
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting workflow simulation server");

    let app_state = web::Data::new(AppState {
        backend: Arc::new(LocalBackend::new()),
    });

    let bind_address = std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

    info!("Server starting on http://{}", bind_address);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(app_state.clone())
            .wrap(cors)
            .wrap(actix_web::middleware::Logger::default())
            .configure(configure)
    })
    .bind(&bind_address)?
    .run()
    .await?;

    Ok(())
}
