// ==========================================
// 需求计划系统 - 领域模型层
// ==========================================
// 职责: 定义目录、实体、值对象与不变量
// 红线: 不含随机取数逻辑,不含文件读写
// ==========================================

pub mod catalog;
pub mod error;
pub mod forecast;
pub mod historical;
pub mod period;
pub mod quantity;
pub mod selection;
pub mod types;

// 重导出核心类型
pub use catalog::{Catalog, MAX_WINDOW_MONTHS};
pub use error::{DomainError, DomainResult};
pub use forecast::{CellKey, ForecastGrid, SliceKey};
pub use historical::{HistoricalRecord, HistoricalSalesStore};
pub use period::Period;
pub use quantity::{parse_quantity, round_tenths, ParsedQuantity, QuantityRange, TotalValue};
pub use selection::SelectionState;
pub use types::{Metric, PeriodKind, Product, ProductGroup};
