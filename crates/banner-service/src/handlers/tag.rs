//! 标签管理处理器

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
    dto::{CreateTagRequest, TagDto},
    error::{ApiError, Result},
    state::AppState,
};

/// 创建标签
///
/// POST /tags
pub async fn create_tag(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthToken>,
    payload: std::result::Result<Json<CreateTagRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TagDto>)> {
    let Json(req) = payload?;
    req.validate()?;
    let name = req.name.unwrap_or_default();
    if name.trim().is_empty() {
        return Err(ApiError::Validation("name 不能为空白".to_string()));
    }

    let tag = state.tags.create_tag(name.trim()).await?;

    info!(tag_id = tag.id, name = %tag.name, operator = %auth.subject, "Tag created");

    Ok((StatusCode::CREATED, Json(tag.into())))
}

/// 获取标签
///
/// GET /tags/{id}
pub async fn get_tag(
    State(state): State<AppState>,
    path: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Json<TagDto>> {
    let Path(id) = path?;

    let tag = state
        .tags
        .get_tag(id)
        .await?
        .ok_or(ApiError::TagNotFound(id))?;

    Ok(Json(tag.into()))
}
