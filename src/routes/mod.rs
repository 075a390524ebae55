use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, create_security_headers_layer, Config};
use crate::handlers::{dashboard, health_check, sales, scanner};
use crate::state::AppState;

pub fn create_routes(state: AppState, config: &Config) -> Router {
    let scanner_routes = Router::new()
        .route("/check-in", post(scanner::check_in))
        .route("/validate", post(scanner::validate))
        .route("/events/:event_id/check-ins", get(scanner::list_check_ins))
        .route("/events/:event_id/stats", get(scanner::scanner_stats));

    let sales_routes = Router::new()
        .route("/events/:event_id", get(sales::event_report))
        .route("/reports", get(sales::all_reports))
        .route("/daily", get(sales::daily))
        .route("/summary", get(sales::summary))
        .route("/monthly", get(sales::monthly));

    let dashboard_routes = Router::new()
        .route("/stats", get(dashboard::stats))
        .route("/recent-activity", get(dashboard::recent_activity))
        .route("/revenue-breakdown", get(dashboard::revenue_breakdown));

    Router::new()
        .route("/health", get(health_check))
        .route("/tickets/:ticket_id/cancel", post(scanner::cancel_ticket))
        .nest("/scanner", scanner_routes)
        .nest("/sales", sales_routes)
        .nest("/dashboard", dashboard_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(create_security_headers_layer(config))
        .layer(create_cors_layer(config))
}
