//! 服务器状态 - 持有所有服务的单例引用
//!
//! ServerState 是服务的核心数据结构，持有所有共享组件。
//! 使用 Arc 实现浅拷贝，所有权成本极低。
//!
//! # 组件
//!
//! | 字段 | 类型 | 说明 |
//! |------|------|------|
//! | config | Config | 配置项 (不可变) |
//! | pool | SqlitePool | SQLite 连接池 |
//! | sms | Arc<dyn SmsProvider> | 短信网关 |
//! | billing | Arc<dyn BillingProvider> | 支付服务商 |

use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;

use crate::core::tasks::{BackgroundTasks, TaskKind};
use crate::core::Config;
use crate::db::DbService;
use crate::services::{
    BillingProvider, HttpBillingProvider, HttpSmsGateway, MemoryBilling, MemorySms, SmsProvider,
};
use crate::utils::AppError;

#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// SQLite 连接池
    pub pool: SqlitePool,
    /// 短信网关
    pub sms: Arc<dyn SmsProvider>,
    /// 支付服务商
    pub billing: Arc<dyn BillingProvider>,
}

impl ServerState {
    /// 初始化：打开数据库、跑迁移、装配外部网关。
    ///
    /// 未配置网关凭据时退回内存实现（开发/测试环境）。
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        let db = DbService::new(&config.database_path).await?;

        let sms: Arc<dyn SmsProvider> = match HttpSmsGateway::from_config(config) {
            Some(gateway) => Arc::new(gateway),
            None => {
                tracing::warn!("SMS credentials missing, using in-memory gateway");
                Arc::new(MemorySms::new())
            }
        };

        let billing: Arc<dyn BillingProvider> = match HttpBillingProvider::from_config(config) {
            Some(provider) => Arc::new(provider),
            None => {
                tracing::warn!("Billing token missing, using in-memory provider");
                Arc::new(MemoryBilling)
            }
        };

        Ok(Self {
            config: config.clone(),
            pool: db.pool,
            sms,
            billing,
        })
    }

    /// 手动装配（测试用）
    pub fn with_parts(
        config: Config,
        pool: SqlitePool,
        sms: Arc<dyn SmsProvider>,
        billing: Arc<dyn BillingProvider>,
    ) -> Self {
        Self {
            config,
            pool,
            sms,
            billing,
        }
    }

    /// 启动后台任务（出站队列排水）
    pub fn start_background_tasks(&self) -> BackgroundTasks {
        let mut tasks = BackgroundTasks::new();
        let cancel = tasks.cancellation_token();

        let state = self.clone();
        let interval = Duration::from_secs(self.config.outbox_interval_secs);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        match crate::services::outbox::drain_once(
                            &state.pool,
                            &state.sms,
                            state.config.outbox_max_attempts,
                        )
                        .await
                        {
                            Ok(0) => {}
                            Ok(n) => tracing::info!("Outbox drained {n} notification(s)"),
                            Err(e) => tracing::warn!("Outbox drain failed: {e}"),
                        }
                    }
                }
            }
        });
        tasks.register("outbox-drain", TaskKind::Periodic, handle);

        tasks
    }
}
