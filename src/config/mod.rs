// ==========================================
// 需求计划系统 - 配置层
// ==========================================
// 职责: 会话配置（目录窗口、取数区间、随机种子、日志级别）
// 存储: JSON 文件 + 环境变量覆写
// ==========================================

pub mod config_manager;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigError, ConfigManager, ConfigSource, PlanningConfig};
