// ==========================================
// 需求计划系统 - API 层
// ==========================================
// 职责: 提供会话级业务接口,供展示层 / 命令行调用
// ==========================================

pub mod dto;
pub mod error;
pub mod planning_api;

// 重导出核心类型
pub use dto::{
    CellView, CurrentSelection, ForecastSnapshot, FullForecastSnapshot, HistoricalSnapshot,
    MonthlyTotalRow, TotalView, UpdatedTotal,
};
pub use error::{ApiError, ApiResult};
pub use planning_api::PlanningSession;
