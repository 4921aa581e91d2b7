//! 横幅管理处理器
//!
//! 管理端的横幅创建、查询、整体更新与删除

use axum::{
    Extension, Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
};
use tracing::info;
use validator::Validate;

use crate::{
    auth::AuthToken,
    dto::{BannerBody, BannerDto, CreateBannerRequest, ListBannersQuery, UpdateBannerRequest},
    error::{ApiError, Result},
    models::BannerFilter,
    state::AppState,
};

/// 创建横幅
///
/// POST /banners
///
/// 横幅行与全部标签关联在同一事务中写入，任一标签不存在则整体失败。
pub async fn create_banner(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthToken>,
    payload: std::result::Result<Json<CreateBannerRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<BannerDto>)> {
    let Json(req) = payload?;
    req.validate()?;
    let input = BannerBody::from(req).into_input()?;

    let banner = state.banners.create_banner(&input).await?;

    info!(
        banner_id = banner.id,
        feature_id = banner.feature_id,
        tag_ids = ?banner.tag_ids,
        operator = %auth.subject,
        "Banner created"
    );

    Ok((StatusCode::CREATED, Json(banner.into())))
}

/// 获取横幅列表
///
/// GET /banner?feature_id=&tag_id=&limit=&offset=
pub async fn list_banners(
    State(state): State<AppState>,
    query: std::result::Result<Query<ListBannersQuery>, QueryRejection>,
) -> Result<Json<Vec<BannerDto>>> {
    let Query(params) = query?;
    params.validate()?;
    let filter = BannerFilter::from(params);

    let banners = state.query.list_banners(&filter).await?;

    Ok(Json(banners.into_iter().map(BannerDto::from).collect()))
}

/// 获取横幅详情
///
/// GET /banner/{id}
pub async fn get_banner(
    State(state): State<AppState>,
    path: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Json<BannerDto>> {
    let Path(id) = path?;

    let banner = state
        .banners
        .get_banner(id)
        .await?
        .ok_or(ApiError::BannerNotFound(id))?;

    Ok(Json(banner.into()))
}

/// 更新横幅
///
/// PATCH /banner/{id}
///
/// 整体替换四个字段，标签集合通过原子替换更新。
pub async fn update_banner(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthToken>,
    path: std::result::Result<Path<i64>, PathRejection>,
    payload: std::result::Result<Json<UpdateBannerRequest>, JsonRejection>,
) -> Result<Json<BannerDto>> {
    let Path(id) = path?;
    let Json(req) = payload?;
    req.validate()?;
    let input = BannerBody::from(req).into_input()?;

    let banner = state
        .banners
        .update_banner(id, &input)
        .await?
        .ok_or(ApiError::BannerNotFound(id))?;

    info!(
        banner_id = id,
        tag_ids = ?banner.tag_ids,
        is_active = banner.is_active,
        operator = %auth.subject,
        "Banner updated"
    );

    Ok(Json(banner.into()))
}

/// 删除横幅
///
/// DELETE /banner/{id}
pub async fn delete_banner(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthToken>,
    path: std::result::Result<Path<i64>, PathRejection>,
) -> Result<StatusCode> {
    let Path(id) = path?;

    if !state.banners.delete_banner(id).await? {
        return Err(ApiError::BannerNotFound(id));
    }

    info!(banner_id = id, operator = %auth.subject, "Banner deleted");

    Ok(StatusCode::NO_CONTENT)
}
