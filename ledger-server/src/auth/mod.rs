//! 认证与访问控制
//!
//! 调用方身份由前置层 (bot/web 网关) 认证后通过请求头传入；
//! 本模块负责提取身份并解析其对店铺的访问权限。

pub mod access;
pub mod extractor;

pub use access::{StoreAccess, require_access, require_owner, resolve_access};
pub use extractor::Caller;
