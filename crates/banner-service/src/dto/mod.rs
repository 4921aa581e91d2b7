//! DTO 模块
//!
//! 包含所有请求和响应的数据传输对象，字段统一使用 snake_case

pub mod request;
pub mod response;

pub use request::{
    BannerBody, CreateBannerRequest, CreateFeatureRequest, CreateTagRequest, ListBannersQuery,
    LoginRequest, RegisterRequest, UpdateBannerRequest, UserBannerQuery,
};
pub use response::{BannerDto, FeatureDto, LoginResponse, TagDto, UserDto};
