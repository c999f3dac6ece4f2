// ==========================================
// 日志系统初始化
// ==========================================
// 使用 tracing 和 tracing-subscriber
// 支持环境变量配置日志级别
// 过滤器可在配置加载后重载（配置加载期间的日志不丢失）
// ==========================================

use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter, Registry};

/// 已安装日志系统的过滤器句柄
///
/// 全局订阅者已被其他代码安装时句柄为空,`set_filter` 不做任何事。
pub struct LogHandle {
    handle: Option<reload::Handle<EnvFilter, Registry>>,
}

impl LogHandle {
    /// 本次 init 是否安装了全局订阅者
    pub fn is_installed(&self) -> bool {
        self.handle.is_some()
    }

    /// 切换到配置中的过滤器（RUST_LOG 仍然优先）
    ///
    /// 过滤器语法无效时保持原设置并记录警告。
    pub fn set_filter(&self, configured: &str) {
        let Some(handle) = &self.handle else {
            return;
        };

        let directives = resolve_filter(rust_log().as_deref(), configured);
        match EnvFilter::try_new(&directives) {
            Ok(filter) => {
                if let Err(e) = handle.reload(filter) {
                    tracing::warn!(error = %e, "日志过滤器重载失败");
                } else {
                    tracing::debug!(filter = %directives, "日志过滤器已更新");
                }
            }
            Err(e) => {
                tracing::warn!(filter = %directives, error = %e, "日志过滤器无效,保持原设置");
            }
        }
    }
}

/// 初始化日志系统
///
/// # 参数
/// - default_filter: 未设置 RUST_LOG 时使用的过滤器
///
/// # 环境变量
/// - RUST_LOG: 优先于 default_filter
///   例如: RUST_LOG=debug 或 RUST_LOG=demand_planning=trace
///
/// # 返回
/// - LogHandle: 配置加载后用 `set_filter` 切换到配置的 log_filter
///
/// # 示例
/// ```no_run
/// use demand_planning::logging;
/// let log = logging::init("info");
/// log.set_filter("demand_planning=debug");
/// ```
pub fn init(default_filter: &str) -> LogHandle {
    let directives = resolve_filter(rust_log().as_deref(), default_filter);
    let filter = EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new("info"));
    let (filter_layer, handle) = reload::Layer::new(filter);

    // 日志写到 stderr,stdout 留给 JSON 输出
    let installed = tracing_subscriber::registry()
        .with(filter_layer)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_line_number(true)
                .with_writer(std::io::stderr),
        )
        .try_init()
        .is_ok();

    LogHandle {
        handle: installed.then_some(handle),
    }
}

/// 选择生效的过滤器: 非空的 RUST_LOG 优先,其次为配置值,最后为 "info"
pub fn resolve_filter(rust_log: Option<&str>, configured: &str) -> String {
    [rust_log.unwrap_or(""), configured]
        .iter()
        .map(|s| s.trim())
        .find(|s| !s.is_empty())
        .unwrap_or("info")
        .to_string()
}

fn rust_log() -> Option<String> {
    std::env::var(EnvFilter::DEFAULT_ENV).ok()
}

/// 初始化测试环境的日志系统
///
/// 使用更详细的日志级别，便于调试
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
