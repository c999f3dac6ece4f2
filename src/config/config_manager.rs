// ==========================================
// 需求计划系统 - 配置管理器
// ==========================================
// 职责: 配置加载、校验、环境变量覆写
// 来源优先级: 显式文件 > $DEMAND_PLANNING_CONFIG > 用户配置目录 > 默认值
// 存储: JSON 文件（只读,不回写）
// ==========================================

use crate::domain::catalog::{Catalog, MAX_WINDOW_MONTHS};
use crate::domain::error::DomainError;
use crate::domain::period::Period;
use crate::domain::quantity::QuantityRange;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ==========================================
// 配置错误
// ==========================================
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败: {path}: {message}")]
    FileRead { path: String, message: String },

    #[error("配置解析失败: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("配置值无效 (key: {key}, value: {value}): {message}")]
    InvalidValue {
        key: String,
        value: String,
        message: String,
    },

    #[error("目录构造失败: {0}")]
    Catalog(#[from] DomainError),
}

// ==========================================
// PlanningConfig - 会话配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanningConfig {
    /// 历史窗口起始月
    pub history_start: Period,
    /// 历史月数
    pub history_months: usize,
    /// 预测月数（紧接历史窗口）
    pub forecast_months: usize,
    /// 历史实绩取值区间
    pub sales_range: QuantityRange,
    /// 样例预测取值区间
    pub sample_range: QuantityRange,
    /// 随机种子；None 表示使用系统熵
    pub seed: Option<u64>,
    /// 日志过滤器（RUST_LOG 优先）
    pub log_filter: String,
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self {
            history_start: Period::DEFAULT_HISTORY_START,
            history_months: 4,
            forecast_months: 4,
            sales_range: QuantityRange::default_sales(),
            sample_range: QuantityRange::default_sample(),
            seed: None,
            log_filter: "info".to_string(),
        }
    }
}

impl PlanningConfig {
    /// 校验配置（区间合法性已由 QuantityRange 在反序列化时保证）
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_month_count(config_keys::HISTORY_MONTHS, self.history_months)?;
        check_month_count(config_keys::FORECAST_MONTHS, self.forecast_months)?;
        if self.log_filter.trim().is_empty() {
            return Err(invalid(config_keys::LOG_FILTER, "", "日志过滤器不能为空"));
        }
        Ok(())
    }

    /// 按配置窗口构造目录
    pub fn catalog(&self) -> Result<Catalog, ConfigError> {
        Ok(Catalog::contiguous(
            self.history_start,
            self.history_months,
            self.forecast_months,
        )?)
    }
}

fn check_month_count(key: &str, months: usize) -> Result<(), ConfigError> {
    if months == 0 {
        return Err(invalid(key, "0", "至少 1 个月"));
    }
    if months > MAX_WINDOW_MONTHS {
        return Err(invalid(
            key,
            &months.to_string(),
            &format!("不能超过 {} 个月", MAX_WINDOW_MONTHS),
        ));
    }
    Ok(())
}

fn invalid(key: &str, value: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        message: message.to_string(),
    }
}

// ==========================================
// ConfigSource - 配置来源
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Defaults,
    File(PathBuf),
    Inline,
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    config: PlanningConfig,
    source: ConfigSource,
}

impl ConfigManager {
    /// 使用默认配置
    pub fn new() -> Self {
        Self {
            config: PlanningConfig::default(),
            source: ConfigSource::Defaults,
        }
    }

    /// 从已有配置创建（会先校验）
    pub fn from_config(config: PlanningConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            source: ConfigSource::Inline,
        })
    }

    /// 从 JSON 字符串加载；缺省字段取默认值
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: PlanningConfig = serde_json::from_str(json)?;
        Self::from_config(config)
    }

    /// 从 JSON 文件加载
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let mut manager = Self::from_json_str(&raw)?;
        manager.source = ConfigSource::File(path.to_path_buf());
        tracing::info!(path = %path.display(), "已加载配置文件");
        Ok(manager)
    }

    /// 按优先级解析配置,并应用环境变量覆写
    ///
    /// # 说明
    /// - $DEMAND_PLANNING_CONFIG 指向的文件必须存在
    /// - 用户配置目录下的文件不存在时静默回退到默认值
    pub fn load() -> Result<Self, ConfigError> {
        let mut manager = match std::env::var(config_keys::CONFIG_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(path.trim())?,
            _ => match Self::default_config_path().filter(|p| p.is_file()) {
                Some(path) => Self::from_file(path)?,
                None => Self::new(),
            },
        };

        manager.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(manager)
    }

    /// 用户配置目录下的默认配置文件路径
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(config_keys::APP_DIR).join(config_keys::CONFIG_FILE))
    }

    /// 应用覆写（lookup 通常为环境变量读取）
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(config_keys::SEED_ENV) {
            let seed = raw
                .trim()
                .parse::<u64>()
                .map_err(|e| invalid(config_keys::SEED_ENV, &raw, &e.to_string()))?;
            tracing::debug!(seed, "随机种子由环境变量覆写");
            self.config.seed = Some(seed);
        }

        if let Some(raw) = lookup(config_keys::LOG_ENV) {
            if !raw.trim().is_empty() {
                self.config.log_filter = raw.trim().to_string();
            }
        }

        self.config.validate()
    }

    pub fn config(&self) -> &PlanningConfig {
        &self.config
    }

    pub fn into_config(self) -> PlanningConfig {
        self.config
    }

    pub fn source(&self) -> &ConfigSource {
        &self.source
    }

    /// 获取当前配置的快照（JSON格式）
    pub fn get_config_snapshot(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(&self.config)?)
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// 配置键
// ==========================================
pub mod config_keys {
    // 环境变量
    pub const CONFIG_PATH_ENV: &str = "DEMAND_PLANNING_CONFIG";
    pub const SEED_ENV: &str = "DEMAND_PLANNING_SEED";
    pub const LOG_ENV: &str = "DEMAND_PLANNING_LOG";

    // 配置文件位置
    pub const APP_DIR: &str = "demand-planning";
    pub const CONFIG_FILE: &str = "config.json";

    // 字段名
    pub const HISTORY_MONTHS: &str = "history_months";
    pub const FORECAST_MONTHS: &str = "forecast_months";
    pub const LOG_FILTER: &str = "log_filter";
}
