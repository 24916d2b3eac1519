//! Daftar Ledger Server - 小商户赊账账本服务
//!
//! # 架构概述
//!
//! 本模块是账本服务的主入口，提供以下核心功能：
//!
//! - **账本** (`services/ledger`): 交易记录/冲销，余额快照，原子增量更新
//! - **身份** (`services/identity`): 游客→已验证号码的合并升级
//! - **OTP 登录** (`services/otp`): 持久化双窗口限流的验证码
//! - **订阅计费** (`services/billing`): 开票与支付回调幂等对账
//! - **催款短信** (`services/reminder`): 认证/订阅/配额/冷却闸门
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! ledger-server/src/
//! ├── core/          # 配置、状态、服务器、后台任务
//! ├── auth/          # 调用方提取、店铺访问解析
//! ├── services/      # 业务服务
//! ├── api/           # HTTP 路由和处理器
//! ├── db/            # 数据库层
//! └── utils/         # 工具函数
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod services;
pub mod utils;

// Re-export 公共类型
pub use auth::{Caller, StoreAccess};
pub use core::{Config, Server, ServerState};
pub use services::{BillingProvider, MemoryBilling, MemorySms, SmsProvider};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// 设置运行环境 (dotenv + 日志)
pub fn setup_environment() {
    dotenv::dotenv().ok();
    let config_log_dir = std::env::var("LOG_DIR").ok();
    init_logger_with_file(
        std::env::var("LOG_LEVEL").ok().as_deref(),
        config_log_dir.as_deref(),
    );
}
