use axum::Json;
use serde::Deserialize;

use crate::domain::{Decimal, Holding, ShareClass};
use crate::engine::{compute_waterfall_exit_distribution, WaterfallExitDistribution};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaterfallRequest {
    pub share_classes: Vec<ShareClass>,
    pub holdings: Vec<Holding>,
    pub exit_equity_value: Decimal,
}

/// Ad hoc distribution over the given classes and holdings.
pub async fn post_waterfall(
    Json(request): Json<WaterfallRequest>,
) -> Result<Json<WaterfallExitDistribution>, AppError> {
    if request.exit_equity_value.is_negative() {
        return Err(AppError::BadRequest(
            "exitEquityValue must be >= 0".to_string(),
        ));
    }
    Ok(Json(compute_waterfall_exit_distribution(
        &request.share_classes,
        &request.holdings,
        request.exit_equity_value,
    )))
}
