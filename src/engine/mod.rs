// ==========================================
// 需求计划系统 - 引擎层
// ==========================================
// 职责: 历史实绩生成、样例批量加载、汇总校验、时间序列投影
// 红线: 随机源一律由调用方注入,引擎内不使用全局随机数
// ==========================================

pub mod aggregation;
pub mod projection;
pub mod seeding;

// 重导出核心引擎
pub use aggregation::{verify_rollups, RollupViolation, SampleLoader};
pub use projection::{SeriesPoint, SeriesProjection, SeriesProjector, TrendLine};
pub use seeding::HistoricalSeeder;
