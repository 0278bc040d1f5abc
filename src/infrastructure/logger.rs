//! 日志模块
//!
//! 特性：
//! - 支持人类可读、紧凑和 JSON 三种格式
//! - 敏感信息脱敏
//! - 钱包调用耗时记录

use std::time::Instant;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 日志格式类型
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum LogFormat {
    /// 人类可读格式
    #[default]
    Pretty,
    /// 紧凑单行格式
    Compact,
    /// JSON 结构化格式
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("unknown log format: {}", s)),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub format: LogFormat,
    /// 是否启用颜色（JSON 格式无效）
    pub enable_color: bool,
    /// 是否显示目标模块
    pub show_target: bool,
    /// 是否显示文件名和行号
    pub show_file: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Pretty,
            enable_color: true,
            show_target: true,
            show_file: false,
        }
    }
}

/// 初始化日志系统
///
/// `RUST_LOG` 控制过滤级别，默认 `info`。重复初始化会被忽略。
pub fn init(config: LogConfig) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::registry().with(env_filter);

    let result = match config.format {
        LogFormat::Pretty => subscriber
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_target(config.show_target)
                    .with_file(config.show_file)
                    .with_line_number(config.show_file)
                    .with_ansi(config.enable_color),
            )
            .try_init(),
        LogFormat::Compact => subscriber
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_target(config.show_target)
                    .with_file(config.show_file)
                    .with_line_number(config.show_file)
                    .with_ansi(config.enable_color),
            )
            .try_init(),
        LogFormat::Json => subscriber
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(config.show_target)
                    .with_file(config.show_file)
                    .with_line_number(config.show_file)
                    .with_current_span(true),
            )
            .try_init(),
    };

    if let Err(e) = result {
        tracing::debug!("logger already initialized: {}", e);
    }
}

/// 性能计时器，drop 时记录耗时
pub struct Timer {
    operation: String,
    start: Instant,
}

impl Timer {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            start: Instant::now(),
        }
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        let elapsed_ms = self.start.elapsed().as_secs_f64() * 1000.0;
        tracing::info!(
            target: "metrics",
            operation = %self.operation,
            elapsed_ms = %format!("{:.2}", elapsed_ms),
            "operation completed"
        );
    }
}

/// 敏感信息脱敏工具
pub struct Sanitizer;

impl Sanitizer {
    /// 脱敏 API 密钥，只保留前 8 个和后 4 个字符
    pub fn api_key(key: &str) -> String {
        if key.chars().count() <= 16 {
            return "***".to_string();
        }
        format!("{}...{}", head(key, 8), tail(key, 4))
    }

    /// 私钥完全隐藏
    pub fn private_key(_key: &str) -> String {
        "***PRIVATE_KEY***".to_string()
    }

    /// 脱敏钱包地址，保留前 6 个和末 4 个字符
    pub fn address(addr: &str) -> String {
        if addr.chars().count() <= 12 {
            return addr.to_string();
        }
        format!("{}...{}", head(addr, 6), tail(addr, 4))
    }
}

/// 前 n 个字符，按字符边界截取
fn head(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// 后 n 个字符
fn tail(s: &str, n: usize) -> &str {
    if n == 0 {
        return "";
    }
    match s.char_indices().rev().nth(n - 1) {
        Some((idx, _)) => &s[idx..],
        None => s,
    }
}
