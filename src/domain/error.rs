// ==========================================
// 需求计划系统 - 领域层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 解析失败不属于错误（按 0 参与汇总）,此处只定义硬失败
// ==========================================

use crate::domain::period::Period;
use crate::domain::types::{Product, ProductGroup};
use rust_decimal::Decimal;
use thiserror::Error;

/// 领域层错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    // ===== 目录键越界（调用方编程错误） =====
    #[error("键超出目录范围: {dimension}={value}")]
    OutOfRangeKey { dimension: String, value: String },

    // ===== 目录构造错误 =====
    #[error("期间列表为空: {0}")]
    EmptyPeriods(String),

    #[error("期间未按时间递增: {list} 中 {previous} 之后出现 {next}")]
    UnorderedPeriods {
        list: String,
        previous: Period,
        next: Period,
    },

    #[error("期间窗口过长: {list} 共 {months} 个月,上限 {max}")]
    WindowTooLarge {
        list: String,
        months: usize,
        max: usize,
    },

    #[error("历史期间与预测期间重叠: 历史末期={last_historical}, 预测首期={first_forecast}")]
    OverlappingPeriods {
        last_historical: Period,
        first_forecast: Period,
    },

    // ===== 历史实绩构造错误 =====
    #[error("历史实绩重复: product={product}, group={group}, period={period}")]
    DuplicateRecord {
        product: Product,
        group: ProductGroup,
        period: Period,
    },

    #[error("历史实绩缺失: product={product}, group={group}, period={period}")]
    MissingRecord {
        product: Product,
        group: ProductGroup,
        period: Period,
    },

    #[error("历史实绩为负数: product={product}, group={group}, period={period}, tons={tons}")]
    NegativeQuantity {
        product: Product,
        group: ProductGroup,
        period: Period,
        tons: Decimal,
    },

    #[error("月度合计超出数值范围: product={product}, period={period}")]
    TotalOverflow { product: Product, period: Period },

    #[error("数量区间无效: [{min}, {max})")]
    InvalidRange { min: Decimal, max: Decimal },
}

impl DomainError {
    pub fn out_of_range(dimension: &str, value: impl ToString) -> Self {
        DomainError::OutOfRangeKey {
            dimension: dimension.to_string(),
            value: value.to_string(),
        }
    }
}

/// Result 类型别名
pub type DomainResult<T> = Result<T, DomainError>;
