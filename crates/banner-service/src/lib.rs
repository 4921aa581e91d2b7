//! 横幅服务
//!
//! 按 (功能, 标签) 为客户端下发横幅内容，并为管理员提供横幅、功能、标签的维护接口。
//!
//! ## 核心功能
//!
//! - **横幅解析**：`GET /user_banner` 在同一 (功能, 标签) 下返回最近更新的启用横幅
//! - **横幅管理**：创建、修改（整体替换标签集合）、删除与组合过滤查询
//! - **认证授权**：JWT 认证，管理员路由按角色拦截
//!
//! ## 模块结构
//!
//! - `auth`: JWT 与密码哈希
//! - `bootstrap`: 存储后端选择与管理员初始化
//! - `dto`: 请求和响应的数据传输对象
//! - `error`: 接口层错误类型
//! - `handlers`: HTTP 请求处理器
//! - `middleware`: 认证与访问分级
//! - `models`: 实体模型
//! - `repository`: PostgreSQL 与内存两套存储实现
//! - `routes`: 路由配置
//! - `state`: 应用状态
//!
//! ## 技术栈
//!
//! - Web 框架：Axum
//! - 数据访问：sqlx (PostgreSQL)
//! - 数据验证：validator

pub mod auth;
pub mod bootstrap;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod routes;
pub mod state;

// 重新导出核心类型
pub use dto::{BannerDto, CreateBannerRequest, UpdateBannerRequest, UserBannerQuery};
pub use error::{ApiError, Result};
pub use models::{Banner, BannerFilter, BannerInput, Feature, Role, Tag, User};
pub use state::AppState;
