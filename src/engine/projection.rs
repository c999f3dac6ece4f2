// ==========================================
// 需求计划系统 - 时间序列投影引擎
// ==========================================
// 职责: 将历史实绩与预测网格折叠为每个产品一条连续时间序列（供趋势图使用）
// 规则:
// - 历史点 = 产品月度合计
// - 预测点 = 四个指标汇总之和（Backlog + Forecast + Absolute + Final Forecast）
// - 仅当汇总为非有限值时该点无值；0 照常输出
// 说明: 不做缓存,每次调用重新计算
// ==========================================

use crate::domain::catalog::Catalog;
use crate::domain::error::DomainResult;
use crate::domain::forecast::{ForecastGrid, SliceKey};
use crate::domain::historical::HistoricalSalesStore;
use crate::domain::period::Period;
use crate::domain::quantity::{round_tenths, TotalValue};
use crate::domain::types::{Metric, PeriodKind, Product};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::instrument;

/// 时间序列中的一个点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub period: Period,
    pub label: String,
    pub kind: PeriodKind,
    /// None 表示非有限值（不是 0）
    pub value: Option<Decimal>,
}

/// 产品 → 有序时间序列（BTreeMap 按产品目录顺序迭代）
pub type SeriesProjection = BTreeMap<Product, Vec<SeriesPoint>>;

// ==========================================
// SeriesProjector - 时间序列投影器
// ==========================================
pub struct SeriesProjector {}

impl SeriesProjector {
    pub fn new() -> Self {
        Self {}
    }

    /// 生成全部产品的时间序列: 历史期间在前,预测期间在后
    #[instrument(skip_all)]
    pub fn project(
        &self,
        catalog: &Catalog,
        historical: &HistoricalSalesStore,
        grid: &ForecastGrid,
    ) -> DomainResult<SeriesProjection> {
        let mut projection = SeriesProjection::new();

        for &product in catalog.products() {
            let mut points = Vec::with_capacity(
                catalog.historical_periods().len() + catalog.forecast_periods().len(),
            );

            for (period, kind) in catalog.timeline() {
                let value = match kind {
                    PeriodKind::Historical => Some(historical.monthly_total(product, period)?),
                    PeriodKind::Forecast => self.forecast_point(grid, product, period)?,
                };
                points.push(SeriesPoint {
                    period,
                    label: period.label(),
                    kind,
                    value,
                });
            }

            projection.insert(product, points);
        }

        Ok(projection)
    }

    /// 预测点: 对四个指标的切片汇总求和
    ///
    /// 混合异质指标是有意保留的简化,调用方需知悉。
    fn forecast_point(
        &self,
        grid: &ForecastGrid,
        product: Product,
        period: Period,
    ) -> DomainResult<Option<Decimal>> {
        let mut sum = TotalValue::zero();
        for &metric in Metric::ALL.iter() {
            sum = sum.checked_add(grid.total(SliceKey::new(product, period, metric))?);
        }
        Ok(sum.as_decimal().map(round_tenths))
    }

    /// 每个产品的线性趋势线
    pub fn trend_lines(&self, projection: &SeriesProjection) -> BTreeMap<Product, Option<TrendLine>> {
        projection
            .iter()
            .map(|(product, points)| (*product, TrendLine::fit(points)))
            .collect()
    }
}

impl Default for SeriesProjector {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// TrendLine - 线性趋势线（最小二乘）
// ==========================================
// x = 点在序列中的下标,y = 点值；无值的点跳过
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendLine {
    pub slope: f64,
    pub intercept: f64,
}

impl TrendLine {
    /// 拟合；有值的点少于 2 个或 x 方差为 0 时返回 None
    pub fn fit(points: &[SeriesPoint]) -> Option<Self> {
        let samples: Vec<(f64, f64)> = points
            .iter()
            .enumerate()
            .filter_map(|(idx, p)| Some((idx as f64, p.value?.to_f64()?)))
            .collect();

        if samples.len() < 2 {
            return None;
        }

        let n = samples.len() as f64;
        let (sum_x, sum_y, sum_xy, sum_xx) = samples.iter().fold(
            (0.0, 0.0, 0.0, 0.0),
            |(sx, sy, sxy, sxx), (x, y)| (sx + x, sy + y, sxy + x * y, sxx + x * x),
        );

        let denominator = n * sum_xx - sum_x * sum_x;
        if denominator == 0.0 {
            return None;
        }

        let slope = (n * sum_xy - sum_x * sum_y) / denominator;
        let intercept = (sum_y - slope * sum_x) / n;
        Some(Self { slope, intercept })
    }

    /// 趋势线在下标 x 处的取值
    pub fn value_at(&self, index: usize) -> f64 {
        self.intercept + self.slope * index as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(idx: u32, value: Option<f64>) -> SeriesPoint {
        let period = Period::from_ym(2025, 1).unwrap().plus_months(idx);
        SeriesPoint {
            period,
            label: period.label(),
            kind: PeriodKind::Historical,
            value: value.and_then(Decimal::from_f64_retain),
        }
    }

    #[test]
    fn test_trend_line_exact_fit() {
        let points: Vec<SeriesPoint> = (0..4).map(|i| point(i, Some(2.0 * i as f64 + 1.0))).collect();
        let line = TrendLine::fit(&points).unwrap();
        assert!((line.slope - 2.0).abs() < 1e-9);
        assert!((line.intercept - 1.0).abs() < 1e-9);
        assert!((line.value_at(10) - 21.0).abs() < 1e-9);
    }

    #[test]
    fn test_trend_line_skips_missing_points() {
        let points = vec![point(0, Some(1.0)), point(1, None), point(2, Some(3.0))];
        let line = TrendLine::fit(&points).unwrap();
        assert!((line.slope - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_trend_line_needs_two_points() {
        assert!(TrendLine::fit(&[point(0, Some(5.0))]).is_none());
        assert!(TrendLine::fit(&[point(0, None), point(1, None)]).is_none());
    }
}
