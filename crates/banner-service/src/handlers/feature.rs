//! 功能管理处理器

use axum::{
    Extension, Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use tracing::info;
use validator::Validate;

use crate::{
    auth::AuthToken,
    dto::{CreateFeatureRequest, FeatureDto},
    error::{ApiError, Result},
    state::AppState,
};

/// 创建功能
///
/// POST /features
pub async fn create_feature(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthToken>,
    payload: std::result::Result<Json<CreateFeatureRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<FeatureDto>)> {
    let Json(req) = payload?;
    req.validate()?;
    let name = req.name.unwrap_or_default();
    if name.trim().is_empty() {
        return Err(ApiError::Validation("name 不能为空白".to_string()));
    }

    let feature = state.features.create_feature(name.trim()).await?;

    info!(feature_id = feature.id, name = %feature.name, operator = %auth.subject, "Feature created");

    Ok((StatusCode::CREATED, Json(feature.into())))
}

/// 获取功能
///
/// GET /features/{id}
pub async fn get_feature(
    State(state): State<AppState>,
    path: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Json<FeatureDto>> {
    let Path(id) = path?;

    let feature = state
        .features
        .get_feature(id)
        .await?
        .ok_or(ApiError::FeatureNotFound(id))?;

    Ok(Json(feature.into()))
}
