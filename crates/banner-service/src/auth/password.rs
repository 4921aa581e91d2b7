//! 密码哈希
//!
//! 注册与管理员初始化时写入 bcrypt 哈希，登录时校验。明文密码不落库也不进日志。

use bcrypt::{DEFAULT_COST, hash, verify};

use crate::error::ApiError;

/// bcrypt 只使用前 72 字节，超出部分会被静默截断
pub const MAX_PASSWORD_BYTES: usize = 72;

/// 生成用于存储的密码哈希
///
/// 按字节计数，超过 72 字节返回参数错误（请求体校验按字符计数）。
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(ApiError::Validation(format!(
            "密码不能超过 {} 字节",
            MAX_PASSWORD_BYTES
        )));
    }
    hash(password, DEFAULT_COST).map_err(|e| ApiError::Internal(format!("密码哈希失败: {}", e)))
}

/// 登录时比对明文密码与存储的哈希
///
/// 哈希格式损坏属于数据问题，返回内部错误而不是"密码错误"。
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, ApiError> {
    verify(password, stored_hash)
        .map_err(|e| ApiError::Internal(format!("密码哈希格式无效: {}", e)))
}
