//! 领域模型
//!
//! 横幅、功能、标签与用户实体，以及横幅写入和列表过滤的输入结构

mod banner;
mod catalog;
mod user;

pub use banner::{Banner, BannerFilter, BannerInput};
pub(crate) use banner::distinct;
pub use catalog::{Feature, Tag};
pub use user::{Role, User};
