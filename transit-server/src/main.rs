use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use transit_server::advisor::{AdvisorClient, AdvisorConfig};
use transit_server::explain::{ExplainerConfig, RouteExplainer};
use transit_server::planner::{MockPlannerClient, PlannerBackend, PlannerClient, PlannerConfig};
use transit_server::search::{SearchConfig, SearchService};
use transit_server::trip::TripConfig;
use transit_server::web::{AppState, create_router};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Planner: live HTTP upstream, or canned fixtures for development.
    let planner = match std::env::var("PLANNER_MOCK_DIR") {
        Ok(dir) => {
            let client = MockPlannerClient::new(&dir)
                .expect("Failed to load planner fixtures from PLANNER_MOCK_DIR");
            tracing::info!(%dir, "using mock planner fixtures");
            PlannerBackend::Mock(client)
        }
        Err(_) => {
            let mut config = PlannerConfig::default();
            if let Ok(base_url) = std::env::var("PLANNER_BASE_URL") {
                config = config.with_base_url(base_url);
            }
            if let Ok(router_id) = std::env::var("PLANNER_ROUTER_ID") {
                config = config.with_router_id(router_id);
            }
            let client = PlannerClient::new(config).expect("Failed to create planner client");
            PlannerBackend::Http(client)
        }
    };

    // Explainer is optional: without credentials, routes get no explanations.
    let explainer = match (
        std::env::var("EXPLAINER_API_URL"),
        std::env::var("EXPLAINER_API_KEY"),
        std::env::var("EXPLAINER_MODEL"),
    ) {
        (Ok(api_url), Ok(api_key), Ok(model)) => {
            RouteExplainer::new(ExplainerConfig::new(api_url, api_key, model))
        }
        _ => {
            eprintln!("Warning: EXPLAINER_API_URL/KEY/MODEL not set. Routes get no explanations.");
            None
        }
    };

    let advisor_base_url = std::env::var("ADVISOR_BASE_URL").unwrap_or_else(|_| {
        eprintln!("Warning: ADVISOR_BASE_URL not set. Trip starts will fail.");
        String::new()
    });
    let advisor = AdvisorClient::new(AdvisorConfig::new(advisor_base_url))
        .expect("Failed to create advisor client");

    let search = SearchService::new(planner, explainer, &SearchConfig::default());
    let state = AppState::new(search, Arc::new(advisor), TripConfig::default());

    let app = create_router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], 8080));
    println!("Transit trip server listening on http://{addr}");
    println!();
    println!("API Endpoints:");
    println!("  GET  /health                    - Health check");
    println!("  POST /v1/routes/search          - Search route options");
    println!("  POST /v1/trip/start             - Start a live trip");
    println!("  GET  /v1/trip/:session          - Live trip state");
    println!("  POST /v1/trip/:session/position - Report a position update");
    println!("  POST /v1/trip/:session/end      - End a live trip");

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
