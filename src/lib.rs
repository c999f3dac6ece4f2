// ==========================================
// 需求计划系统 - 核心库
// ==========================================
// 职责: 滚动预测数据模型与汇总引擎
// 系统定位: 计划分析员录入预测,汇总自动上卷,展示层只读取快照
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 目录、实体与不变量
pub mod domain;

// 引擎层 - 生成、批量加载、投影
pub mod engine;

// 导入层 - 外部历史实绩
pub mod importer;

// 配置层 - 会话配置
pub mod config;

// 日志系统
pub mod logging;

// API 层 - 会话接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    Catalog, CellKey, DomainError, ForecastGrid, HistoricalRecord, HistoricalSalesStore, Metric,
    Period, PeriodKind, Product, ProductGroup, SelectionState, SliceKey, TotalValue,
};

// 引擎
pub use engine::{HistoricalSeeder, SampleLoader, SeriesPoint, SeriesProjection, SeriesProjector};

// 配置
pub use config::{ConfigManager, PlanningConfig};

// API
pub use api::{ApiError, ApiResult, PlanningSession};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "需求计划系统";
