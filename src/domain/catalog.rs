// ==========================================
// 需求计划系统 - 目录 (Catalog)
// ==========================================
// 职责: 产品 / 产品组 / 指标 / 历史期间 / 预测期间 的静态参考列表
// 红线: 历史期间与预测期间不相交,且历史期间整体早于预测期间
// ==========================================

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::period::Period;
use crate::domain::types::{Metric, PeriodKind, Product, ProductGroup};
use serde::{Deserialize, Serialize};

/// 单个期间窗口的最大月数（100 年）
pub const MAX_WINDOW_MONTHS: usize = 1200;

/// 会话级目录（会话开始时固定,之后只读）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    historical_periods: Vec<Period>,
    forecast_periods: Vec<Period>,
}

impl Catalog {
    /// 由显式期间列表构造目录
    ///
    /// # 校验
    /// - 两个列表均非空
    /// - 各自严格递增
    /// - 历史末期 < 预测首期
    pub fn new(historical_periods: Vec<Period>, forecast_periods: Vec<Period>) -> DomainResult<Self> {
        check_ascending("historical", &historical_periods)?;
        check_ascending("forecast", &forecast_periods)?;

        if let (Some(&last_historical), Some(&first_forecast)) =
            (historical_periods.last(), forecast_periods.first())
        {
            if last_historical >= first_forecast {
                return Err(DomainError::OverlappingPeriods {
                    last_historical,
                    first_forecast,
                });
            }
        }

        Ok(Self {
            historical_periods,
            forecast_periods,
        })
    }

    /// 连续窗口: 从 history_start 起 history_months 个历史月,紧接 forecast_months 个预测月
    ///
    /// 任一窗口超过 [`MAX_WINDOW_MONTHS`] 时返回 `WindowTooLarge`。
    pub fn contiguous(
        history_start: Period,
        history_months: usize,
        forecast_months: usize,
    ) -> DomainResult<Self> {
        let history_len = window_len("historical", history_months)?;
        let forecast_len = window_len("forecast", forecast_months)?;

        let historical = history_start.run(history_len);
        let forecast = history_start.plus_months(history_len).run(forecast_len);
        Self::new(historical, forecast)
    }

    pub fn products(&self) -> &'static [Product] {
        &Product::ALL
    }

    pub fn groups(&self) -> &'static [ProductGroup] {
        &ProductGroup::ALL
    }

    pub fn metrics(&self) -> &'static [Metric] {
        &Metric::ALL
    }

    pub fn historical_periods(&self) -> &[Period] {
        &self.historical_periods
    }

    pub fn forecast_periods(&self) -> &[Period] {
        &self.forecast_periods
    }

    /// 历史期间下标；不在目录内为硬失败
    pub fn historical_index(&self, period: Period) -> DomainResult<usize> {
        self.historical_periods
            .binary_search(&period)
            .map_err(|_| DomainError::out_of_range("historical_period", period))
    }

    /// 预测期间下标；不在目录内为硬失败
    pub fn forecast_index(&self, period: Period) -> DomainResult<usize> {
        self.forecast_periods
            .binary_search(&period)
            .map_err(|_| DomainError::out_of_range("forecast_period", period))
    }

    /// 完整时间轴: 先历史后预测
    pub fn timeline(&self) -> impl Iterator<Item = (Period, PeriodKind)> + '_ {
        self.historical_periods
            .iter()
            .map(|p| (*p, PeriodKind::Historical))
            .chain(self.forecast_periods.iter().map(|p| (*p, PeriodKind::Forecast)))
    }
}

fn window_len(list: &str, months: usize) -> DomainResult<u32> {
    u32::try_from(months)
        .ok()
        .filter(|_| months <= MAX_WINDOW_MONTHS)
        .ok_or_else(|| DomainError::WindowTooLarge {
            list: list.to_string(),
            months,
            max: MAX_WINDOW_MONTHS,
        })
}

fn check_ascending(list: &str, periods: &[Period]) -> DomainResult<()> {
    if periods.is_empty() {
        return Err(DomainError::EmptyPeriods(list.to_string()));
    }
    for pair in periods.windows(2) {
        if pair[0] >= pair[1] {
            return Err(DomainError::UnorderedPeriods {
                list: list.to_string(),
                previous: pair[0],
                next: pair[1],
            });
        }
    }
    Ok(())
}
