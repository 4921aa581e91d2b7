//! 认证模块
//!
//! 提供 JWT Token 生成、验证和密码处理功能

mod jwt;
mod password;

pub use jwt::{AuthToken, Claims, JwtConfig, JwtManager, TokenError};
pub use password::{hash_password, verify_password};
