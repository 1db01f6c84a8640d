//! Operation history, summary statistics and exports

use axum::{
    extract::{Query, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
    Extension, Json,
};
use csv::WriterBuilder;
use std::sync::Arc;
use validator::Validate;

use crate::errors::{ok, ApiError, ApiResult, Envelope};
use crate::models::{Operation, OpsQuery, StatsSummary, User};
use crate::stats::compute_summary;
use crate::AppState;

const DEFAULT_OPS_LIMIT: i64 = 200;
const SUMMARY_WINDOW: i64 = 1000;
const EXPORT_WINDOW: i64 = 2000;

const CSV_HEADER: [&str; 8] = [
    "timestamp",
    "pair",
    "dex",
    "profit",
    "fees",
    "exec_time_ms",
    "status",
    "error_message",
];

/// GET /ops - newest first
pub async fn list_ops(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Query(query): Query<OpsQuery>,
) -> ApiResult<Json<Envelope<Vec<Operation>>>> {
    query.validate()?;
    let limit = query.limit.unwrap_or(DEFAULT_OPS_LIMIT);
    let ops = state
        .store
        .list_ops(&user.wallet_address, &query.filter(), limit)
        .await?;
    Ok(ok(ops))
}

/// GET /stats/summary
pub async fn stats_summary(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Query(query): Query<OpsQuery>,
) -> ApiResult<Json<Envelope<StatsSummary>>> {
    let ops = state
        .store
        .list_ops(&user.wallet_address, &query.filter(), SUMMARY_WINDOW)
        .await?;
    Ok(ok(compute_summary(&ops)))
}

/// GET /export/csv
pub async fn export_csv(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Query(query): Query<OpsQuery>,
) -> ApiResult<Response> {
    let ops = state
        .store
        .list_ops(&user.wallet_address, &query.filter(), EXPORT_WINDOW)
        .await?;
    let body = ops_to_csv(&ops)?;

    Ok((
        [
            (CONTENT_TYPE, "text/csv"),
            (CONTENT_DISPOSITION, "attachment; filename=ops.csv"),
        ],
        body,
    )
        .into_response())
}

/// GET /export/json
pub async fn export_json(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Query(query): Query<OpsQuery>,
) -> ApiResult<Response> {
    let ops = state
        .store
        .list_ops(&user.wallet_address, &query.filter(), EXPORT_WINDOW)
        .await?;

    Ok((
        [(CONTENT_DISPOSITION, "attachment; filename=ops.json")],
        ok(ops),
    )
        .into_response())
}

fn ops_to_csv(ops: &[Operation]) -> ApiResult<Vec<u8>> {
    let csv_err = |e: csv::Error| ApiError::Internal(format!("csv export failed: {}", e));

    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(CSV_HEADER).map_err(csv_err)?;
    for op in ops {
        writer
            .write_record([
                op.timestamp.to_rfc3339(),
                op.pair.clone(),
                op.dex.clone(),
                op.profit.to_string(),
                op.fees.to_string(),
                op.exec_time_ms.to_string(),
                op.status.as_str().to_string(),
                op.error_message.clone().unwrap_or_default(),
            ])
            .map_err(csv_err)?;
    }

    writer
        .into_inner()
        .map_err(|e| ApiError::Internal(format!("csv export failed: {}", e)))
}
