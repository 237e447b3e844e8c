//! HTTP handler functions for the dashboard page and API.

use std::sync::Arc;

use actix_web::{HttpResponse, http::header::ContentType, web};
use crime_eda_analytics::{build_dashboard, filter_options};
use crime_eda_dataset::DatasetCache;
use crime_eda_incident_models::IncidentTable;
use crime_eda_server_models::{ApiError, ApiHealth, DashboardQuery};

use crate::{AppState, ServerError, dashboard_page};

type QueryPairs = web::Query<Vec<(String, String)>>;

/// Runs `f` against the cached table on the blocking thread pool.
async fn with_table<T, F>(dataset: &Arc<DatasetCache>, f: F) -> Result<T, ServerError>
where
    T: Send + 'static,
    F: FnOnce(&IncidentTable) -> Result<T, ServerError> + Send + 'static,
{
    let dataset = dataset.clone();
    web::block(move || {
        let table = dataset.load()?;
        f(&table)
    })
    .await?
}

fn server_error(context: &str, e: &ServerError) -> HttpResponse {
    log::error!("Failed to {context}: {e}");
    HttpResponse::InternalServerError().json(ApiError {
        error: format!("Failed to {context}"),
    })
}

/// `GET /`
///
/// Renders the dashboard page for the submitted sidebar form.
pub async fn index(state: web::Data<AppState>, params: QueryPairs) -> HttpResponse {
    let query = DashboardQuery::from_pairs(params.into_inner());

    match with_table(&state.dataset, move |table| {
        dashboard_page(table, &query.selection(&filter_options(table)))
    })
    .await
    {
        Ok(html) => HttpResponse::Ok()
            .content_type(ContentType::html())
            .body(html),
        Err(e) => server_error("render dashboard", &e),
    }
}

/// `GET /api/dashboard`
///
/// Returns the dashboard view model, without charts, for the same query
/// parameters as the page.
pub async fn dashboard(state: web::Data<AppState>, params: QueryPairs) -> HttpResponse {
    let query = DashboardQuery::from_pairs(params.into_inner());

    match with_table(&state.dataset, move |table| {
        Ok(build_dashboard(
            table,
            &query.selection(&filter_options(table)),
        ))
    })
    .await
    {
        Ok(dashboard) => HttpResponse::Ok().json(dashboard),
        Err(e) => server_error("build dashboard", &e),
    }
}

/// `GET /api/options`
pub async fn options(state: web::Data<AppState>) -> HttpResponse {
    match with_table(&state.dataset, |table| Ok(filter_options(table))).await {
        Ok(options) => HttpResponse::Ok().json(options),
        Err(e) => server_error("list filter options", &e),
    }
}

/// `GET /api/health`
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    let version = env!("CARGO_PKG_VERSION").to_string();

    match with_table(&state.dataset, |table| Ok(table.len() as u64)).await {
        Ok(rows) => HttpResponse::Ok().json(ApiHealth {
            healthy: true,
            version,
            rows,
        }),
        Err(e) => {
            log::warn!("Health check failed: {e}");
            HttpResponse::ServiceUnavailable().json(ApiHealth {
                healthy: false,
                version,
                rows: 0,
            })
        }
    }
}
