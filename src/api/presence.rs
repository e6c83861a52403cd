use crate::{
    engine::{
        aggregator::{DirectorateKpi, aggregate_by_directorate},
        ranker::{self, SortColumn, SortDirection, SortState},
    },
    error::PresenceError,
    model::summary::PresenceSummary,
    store::{RecordStore, SnapshotInfo},
    utils::report_cache::ReportCache,
};
use actix_web::{HttpResponse, get, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PresenceQuery {
    /// Column to sort by
    pub sort: Option<SortColumn>,
    /// Explicit direction. Without it the header-click toggle is applied
    pub order: Option<SortDirection>,
    /// Column the client is currently sorted by
    pub current_sort: Option<SortColumn>,
    /// Direction the client is currently sorted in
    pub current_order: Option<SortDirection>,
}

impl PresenceQuery {
    /// Sort to apply, if any.
    pub fn resolve_sort(&self) -> Option<SortState> {
        let column = self.sort?;
        if let Some(direction) = self.order {
            return Some(SortState {
                column: Some(column),
                direction,
            });
        }

        let mut state = SortState {
            column: self.current_sort,
            direction: self.current_order.unwrap_or_default(),
        };
        state.toggle(column);
        Some(state)
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResponse {
    #[schema(example = 21)]
    pub total_working_days: usize,
    pub summaries: Vec<PresenceSummary>,
    /// Sort applied to `summaries`; absent for directory order
    pub sort: Option<SortState>,
}

/// Calculate presence for every employee in the directory
#[utoipa::path(
    get,
    path = "/api/calculate",
    params(PresenceQuery),
    responses(
        (status = 200, description = "Presence snapshot", body = CalculationResponse),
        (status = 400, description = "Unknown sort column or direction"),
        (status = 500, description = "Calculation failed", body = Object, example = json!({
            "error": "Failed to calculate presence",
            "cause": "database error: pool timed out while waiting for an open connection"
        }))
    ),
    tag = "Presence"
)]
pub async fn calculate(
    store: web::Data<dyn RecordStore>,
    cache: web::Data<ReportCache>,
    query: web::Query<PresenceQuery>,
) -> Result<HttpResponse, PresenceError> {
    let report = cache.get_or_calculate(store.get_ref()).await?;

    let mut summaries = report.summaries.clone();
    let sort = query.resolve_sort();
    if let Some(SortState {
        column: Some(column),
        direction,
    }) = sort
    {
        ranker::sort(&mut summaries, column, direction);
    }

    Ok(HttpResponse::Ok().json(CalculationResponse {
        total_working_days: report.total_working_days,
        summaries,
        sort,
    }))
}

/// Average building usage per directorate
#[utoipa::path(
    get,
    path = "/api/directorates",
    responses(
        (status = 200, description = "KPIs in ascending directorate order", body = [DirectorateKpi]),
        (status = 500, description = "Calculation failed")
    ),
    tag = "Presence"
)]
pub async fn directorates(
    store: web::Data<dyn RecordStore>,
    cache: web::Data<ReportCache>,
) -> Result<HttpResponse, PresenceError> {
    let report = cache.get_or_calculate(store.get_ref()).await?;
    let kpis: Vec<DirectorateKpi> = aggregate_by_directorate(&report.summaries)
        .into_values()
        .collect();
    Ok(HttpResponse::Ok().json(kpis))
}

/// Current snapshot of each source
#[utoipa::path(
    get,
    path = "/api/sources",
    responses(
        (status = 200, description = "One entry per source", body = [SnapshotInfo]),
        (status = 500, description = "Store unreadable")
    ),
    tag = "Presence"
)]
pub async fn sources(store: web::Data<dyn RecordStore>) -> Result<HttpResponse, PresenceError> {
    let info = store.snapshot_info().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to read snapshot info");
        PresenceError::Computation(e.to_string())
    })?;
    Ok(HttpResponse::Ok().json(info))
}

#[get("/health")]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}
