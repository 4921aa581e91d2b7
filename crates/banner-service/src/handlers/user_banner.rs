//! 用户横幅查询处理器

use axum::{
    Extension, Json,
    extract::{Query, State, rejection::QueryRejection},
};
use serde_json::Value;
use tracing::debug;
use validator::Validate;

use crate::{
    auth::AuthToken,
    dto::UserBannerQuery,
    error::{ApiError, Result},
    state::AppState,
};

/// 获取用户横幅
///
/// GET /user_banner?feature_id=&tag_id=&use_last_revision=
///
/// 返回命中横幅的 content 本身。未保存历史版本，`use_last_revision` 不影响结果。
pub async fn get_user_banner(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthToken>,
    query: std::result::Result<Query<UserBannerQuery>, QueryRejection>,
) -> Result<Json<Value>> {
    let Query(params) = query?;
    params.validate()?;

    let (Some(feature_id), Some(tag_id)) = (params.feature_id, params.tag_id) else {
        return Err(ApiError::Validation("feature_id 和 tag_id 不能为空".to_string()));
    };

    debug!(
        feature_id,
        tag_id,
        use_last_revision = params.use_last_revision,
        user = %auth.subject,
        "Resolving banner"
    );

    let banner = state
        .resolver
        .resolve(feature_id, tag_id)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!("feature_id={} tag_id={}", feature_id, tag_id))
        })?;

    Ok(Json(banner.content))
}
