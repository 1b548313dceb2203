//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use super::AppState;
use super::types::{BillDetailResponse, BillSummaryRecord, ErrorResponse};
use crate::error::BillingError;

/// Lists every billing cycle in chronological order.
///
/// `GET /bills` → 200 + `Vec<BillSummaryRecord>` JSON
pub async fn list_bills(State(state): State<Arc<AppState>>) -> Json<Vec<BillSummaryRecord>> {
    Json(state.cycles.iter().map(BillSummaryRecord::from).collect())
}

/// Returns the full breakdown of one cycle, including the tariff rates.
///
/// `GET /bills/{key}` → 200 + `BillDetailResponse` JSON
/// `GET /bills/2024-01` → 400 + `ErrorResponse`
/// `GET /bills/{key}` with no such cycle → 404 + `ErrorResponse`
pub async fn get_bill(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> impl IntoResponse {
    match state.cycles.lookup(&key) {
        Ok(cycle) => Ok(Json(BillDetailResponse::new(cycle, &state.tariff))),
        Err(e) => {
            let status = match e {
                BillingError::CycleNotFound(_) => StatusCode::NOT_FOUND,
                _ => StatusCode::BAD_REQUEST,
            };
            Err((
                status,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use rust_decimal::dec;
    use tower::util::ServiceExt;

    use super::*;
    use crate::api::router;
    use crate::billing::test_support::{hourly, ts};
    use crate::billing::{Tariff, price_all, segment};

    fn make_test_state() -> Arc<AppState> {
        let readings = hourly(ts(2024, 5, 17, 0, 0), 24 * 30, dec!(1), dec!(10));
        let mut cycles = segment(&readings).unwrap();
        let tariff = Tariff::b19();
        price_all(&mut cycles, &tariff).unwrap();
        Arc::new(AppState { tariff, cycles })
    }

    async fn get(uri: &str) -> (StatusCode, serde_json::Value) {
        let app = router(make_test_state());
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn bills_returns_200() {
        let (status, json) = get("/bills").await;
        assert_eq!(status, StatusCode::OK);
        let bills = json.as_array().unwrap();
        assert_eq!(bills.len(), 1);
        assert_eq!(bills[0]["cycle"], "05-2024");
        assert_eq!(bills[0]["billing_days"], 30);
        assert_eq!(bills[0]["summer_days"], 15);
    }

    #[tokio::test]
    async fn bill_detail_has_cells() {
        let (status, json) = get("/bills/05-2024").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["cycle"], "05-2024");
        assert_eq!(json["energy"].as_array().map(Vec::len), Some(6));
        assert_eq!(json["demand"].as_array().map(Vec::len), Some(5));
        assert_eq!(json["demand"][0]["season"], "summer");
        assert_eq!(json["demand"][0]["period"], "max_peak");
        assert_eq!(json["demand"][0]["cost"], "270.85");
    }

    #[tokio::test]
    async fn bill_detail_reports_tariff_rates() {
        let (status, json) = get("/bills/05-2024").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["tariff"], "B-19");
        assert_eq!(json["customer_per_day"], "59.63519");
        assert_eq!(json["demand"][0]["rate"], "54.17");
        assert_eq!(json["energy"][0]["season"], "summer");
        assert_eq!(json["energy"][0]["period"], "peak");
        assert_eq!(json["energy"][0]["rate"], "0.21867");
    }

    #[tokio::test]
    async fn malformed_key_returns_400() {
        let (status, json) = get("/bills/2024-05").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("MM-YYYY"));
    }

    #[tokio::test]
    async fn missing_cycle_returns_404() {
        let (status, json) = get("/bills/06-2024").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(json.get("error").is_some());
    }
}
