//! 服务器配置
//!
//! # 环境变量
//!
//! 所有配置项都可以通过环境变量覆盖：
//!
//! | 环境变量 | 默认值 | 说明 |
//! |----------|--------|------|
//! | HTTP_PORT | 3000 | HTTP 服务端口 |
//! | DATABASE_PATH | ledger.db | SQLite 数据库文件 |
//! | LOG_DIR | (无) | 日志目录，设置后按天滚动 |
//! | PUBLIC_BASE_URL | https://daftarapp.tj | 对外链接域名 |
//! | SMS_LOGIN / SMS_TOKEN | (无) | 短信网关凭据，缺省时使用内存网关 |
//! | BILLING_TOKEN | (无) | 支付服务商共享密钥 |
//!
//! # 示例
//!
//! ```ignore
//! HTTP_PORT=8080 DATABASE_PATH=/data/ledger.db cargo run
//! ```

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// 服务器配置
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP API 服务端口
    pub http_port: u16,
    /// SQLite 数据库文件路径
    pub database_path: String,
    /// 日志目录 (可选，按天滚动)
    pub log_dir: Option<String>,
    /// 运行环境: development | staging | production
    pub environment: String,

    // === 域与电话 ===
    /// 对外链接域名（催款短信里的账单页链接）
    pub public_base_url: String,
    /// 本地号码补全用的国家区号
    pub country_code: String,

    // === 短信网关 ===
    pub sms_sender: String,
    pub sms_login: Option<String>,
    pub sms_token: Option<String>,
    pub sms_send_url: String,
    pub sms_status_url: String,

    // === 支付服务商 ===
    pub billing_api_url: String,
    pub billing_token: Option<String>,
    pub billing_return_url: String,
    /// 订阅计费周期（天）
    pub billing_period_days: i64,

    // === OTP 登录 ===
    /// 审核/测试账号：不真正发短信，固定验证码
    pub test_phone: String,
    pub test_code: String,
    pub otp_source_limit: i64,
    pub otp_source_window_hours: i64,
    pub otp_phone_limit: i64,
    pub otp_phone_window_hours: i64,
    pub otp_ttl_minutes: i64,
    pub test_otp_ttl_minutes: i64,

    // === 催款 ===
    /// 同一欠款人两条催款之间的冷却期（天）
    pub reminder_cooldown_days: i64,

    // === 出站队列 ===
    pub outbox_interval_secs: u64,
    pub outbox_max_attempts: i64,

    // === 外呼 ===
    /// 外部服务调用超时（毫秒）
    pub provider_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_port: 3000,
            database_path: "ledger.db".into(),
            log_dir: None,
            environment: "development".into(),

            public_base_url: "https://daftarapp.tj".into(),
            country_code: "992".into(),

            sms_sender: "Daftar".into(),
            sms_login: None,
            sms_token: None,
            sms_send_url: "https://api.osonsms.com/sendsms_v1.php".into(),
            sms_status_url: "https://api.osonsms.com/query_sms.php".into(),

            billing_api_url: "https://ecomm.smartpay.tj/api/merchant/invoices".into(),
            billing_token: None,
            billing_return_url: "https://daftarapp.tj?payment_success=true".into(),
            billing_period_days: 30,

            test_phone: "992987654321".into(),
            test_code: "111111".into(),
            otp_source_limit: 5,
            otp_source_window_hours: 12,
            otp_phone_limit: 3,
            otp_phone_window_hours: 1,
            otp_ttl_minutes: 5,
            test_otp_ttl_minutes: 60,

            reminder_cooldown_days: 3,

            outbox_interval_secs: 30,
            outbox_max_attempts: 5,

            provider_timeout_ms: 10_000,
        }
    }
}

impl Config {
    /// 从环境变量加载配置，未设置的项使用默认值
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            http_port: env_or("HTTP_PORT", defaults.http_port),
            database_path: env_opt("DATABASE_PATH").unwrap_or(defaults.database_path),
            log_dir: env_opt("LOG_DIR"),
            environment: env_opt("ENVIRONMENT").unwrap_or(defaults.environment),

            public_base_url: env_opt("PUBLIC_BASE_URL").unwrap_or(defaults.public_base_url),
            country_code: env_opt("COUNTRY_CODE").unwrap_or(defaults.country_code),

            sms_sender: env_opt("SMS_SENDER").unwrap_or(defaults.sms_sender),
            sms_login: env_opt("SMS_LOGIN"),
            sms_token: env_opt("SMS_TOKEN"),
            sms_send_url: env_opt("SMS_SERVER").unwrap_or(defaults.sms_send_url),
            sms_status_url: env_opt("SMS_STATUS_URL").unwrap_or(defaults.sms_status_url),

            billing_api_url: env_opt("BILLING_API_URL").unwrap_or(defaults.billing_api_url),
            billing_token: env_opt("BILLING_TOKEN"),
            billing_return_url: env_opt("BILLING_RETURN_URL").unwrap_or(defaults.billing_return_url),
            billing_period_days: env_or("BILLING_PERIOD_DAYS", defaults.billing_period_days),

            test_phone: env_opt("TEST_PHONE").unwrap_or(defaults.test_phone),
            test_code: env_opt("TEST_CODE").unwrap_or(defaults.test_code),
            otp_source_limit: env_or("OTP_SOURCE_LIMIT", defaults.otp_source_limit),
            otp_source_window_hours: env_or(
                "OTP_SOURCE_WINDOW_HOURS",
                defaults.otp_source_window_hours,
            ),
            otp_phone_limit: env_or("OTP_PHONE_LIMIT", defaults.otp_phone_limit),
            otp_phone_window_hours: env_or(
                "OTP_PHONE_WINDOW_HOURS",
                defaults.otp_phone_window_hours,
            ),
            otp_ttl_minutes: env_or("OTP_TTL_MINUTES", defaults.otp_ttl_minutes),
            test_otp_ttl_minutes: env_or("TEST_OTP_TTL_MINUTES", defaults.test_otp_ttl_minutes),

            reminder_cooldown_days: env_or(
                "REMINDER_COOLDOWN_DAYS",
                defaults.reminder_cooldown_days,
            ),

            outbox_interval_secs: env_or("OUTBOX_INTERVAL_SECS", defaults.outbox_interval_secs),
            outbox_max_attempts: env_or("OUTBOX_MAX_ATTEMPTS", defaults.outbox_max_attempts),

            provider_timeout_ms: env_or("PROVIDER_TIMEOUT_MS", defaults.provider_timeout_ms),
        }
    }
}
