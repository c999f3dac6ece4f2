// ==========================================
// 需求计划系统 - API 数据传输对象
// ==========================================
// 职责: 会话操作的返回快照（均可 serde 序列化,供展示层读取）
// ==========================================

use crate::domain::forecast::{CellKey, ForecastGrid, SliceKey};
use crate::domain::historical::{HistoricalRecord, HistoricalSalesStore};
use crate::domain::period::Period;
use crate::domain::quantity::TotalValue;
use crate::domain::selection::SelectionState;
use crate::domain::types::{Metric, Product, ProductGroup};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==========================================
// 历史实绩快照
// ==========================================

/// 产品月度合计
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTotalRow {
    pub product: Product,
    pub period: Period,
    pub tons: Decimal,
}

/// 历史实绩快照: 产品×期间合计 + 产品组明细
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalSnapshot {
    pub session_id: Uuid,
    pub periods: Vec<Period>,
    pub monthly_totals: Vec<MonthlyTotalRow>,
    pub records: Vec<HistoricalRecord>,
}

impl HistoricalSnapshot {
    pub fn capture(session_id: Uuid, store: &HistoricalSalesStore) -> Self {
        Self {
            session_id,
            periods: store.periods().to_vec(),
            monthly_totals: store
                .monthly_totals()
                .map(|(product, period, tons)| MonthlyTotalRow {
                    product,
                    period,
                    tons,
                })
                .collect(),
            records: store.records().collect(),
        }
    }
}

// ==========================================
// 预测网格快照
// ==========================================

/// 单元格视图；raw 为 None 表示尚未录入
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellView {
    pub product: Product,
    pub period: Period,
    pub group: ProductGroup,
    pub metric: Metric,
    pub raw: Option<String>,
}

/// 切片汇总视图
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TotalView {
    pub product: Product,
    pub period: Period,
    pub metric: Metric,
    pub value: TotalValue,
}

/// 预测网格快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSnapshot {
    pub session_id: Uuid,
    pub periods: Vec<Period>,
    pub cells: Vec<CellView>,
    pub totals: Vec<TotalView>,
}

impl ForecastSnapshot {
    pub fn capture(session_id: Uuid, grid: &ForecastGrid) -> Self {
        Self {
            session_id,
            periods: grid.periods().to_vec(),
            cells: grid
                .cells()
                .map(|(key, raw): (CellKey, Option<&str>)| CellView {
                    product: key.product,
                    period: key.period,
                    group: key.group,
                    metric: key.metric,
                    raw: raw.map(str::to_string),
                })
                .collect(),
            totals: grid
                .totals()
                .map(|(key, value): (SliceKey, TotalValue)| TotalView {
                    product: key.product,
                    period: key.period,
                    metric: key.metric,
                    value,
                })
                .collect(),
        }
    }
}

/// 样例加载后的完整快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullForecastSnapshot {
    pub cells_written: usize,
    #[serde(flatten)]
    pub forecast: ForecastSnapshot,
}

// ==========================================
// 单元格编辑结果
// ==========================================

/// 编辑后重算的切片汇总
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UpdatedTotal {
    pub product: Product,
    pub period: Period,
    pub metric: Metric,
    pub value: TotalValue,
}

// ==========================================
// 展开选择
// ==========================================

/// 当前展开的产品（None 表示全部收起）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentSelection {
    pub expanded: Option<Product>,
}

impl From<SelectionState> for CurrentSelection {
    fn from(state: SelectionState) -> Self {
        Self {
            expanded: state.expanded(),
        }
    }
}
