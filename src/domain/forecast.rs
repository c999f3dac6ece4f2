// ==========================================
// 需求计划系统 - 预测网格
// ==========================================
// 职责: 保存 (产品, 预测期间, 产品组, 指标) 原始输入,维护 (产品, 预测期间, 指标) 汇总
// 红线: 汇总值只随输入变化而重算,不得单独写入
// 存储: 扁平数组,按枚举下标寻址
// ==========================================

use crate::domain::catalog::Catalog;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::period::Period;
use crate::domain::quantity::{sum_raw_cells, TotalValue};
use crate::domain::types::{Metric, Product, ProductGroup};
use serde::{Deserialize, Serialize};

// ==========================================
// 键类型
// ==========================================

/// 叶子单元格键
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellKey {
    pub product: Product,
    pub period: Period,
    pub group: ProductGroup,
    pub metric: Metric,
}

impl CellKey {
    pub fn new(product: Product, period: Period, group: ProductGroup, metric: Metric) -> Self {
        Self {
            product,
            period,
            group,
            metric,
        }
    }

    /// 所属汇总切片
    pub fn slice(&self) -> SliceKey {
        SliceKey {
            product: self.product,
            period: self.period,
            metric: self.metric,
        }
    }
}

/// 汇总切片键（对产品组求和）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SliceKey {
    pub product: Product,
    pub period: Period,
    pub metric: Metric,
}

impl SliceKey {
    pub fn new(product: Product, period: Period, metric: Metric) -> Self {
        Self {
            product,
            period,
            metric,
        }
    }
}

// ==========================================
// ForecastGrid - 预测网格
// ==========================================
// 布局: cells[product][period][group][metric], totals[product][period][metric]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastGrid {
    periods: Vec<Period>,
    cells: Vec<Option<String>>,
    totals: Vec<TotalValue>,
}

impl ForecastGrid {
    /// 创建全空网格（所有单元格缺失,所有汇总为 0）
    pub fn new(catalog: &Catalog) -> Self {
        let periods = catalog.forecast_periods().to_vec();
        let slice_count = Product::ALL.len() * periods.len() * Metric::ALL.len();
        Self {
            cells: vec![None; slice_count * ProductGroup::ALL.len()],
            totals: vec![TotalValue::zero(); slice_count],
            periods,
        }
    }

    /// 重置: 全部单元格缺失,全部汇总为 0
    pub fn initialize(&mut self) {
        self.cells.iter_mut().for_each(|c| *c = None);
        self.totals.iter_mut().for_each(|t| *t = TotalValue::zero());
    }

    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    // ==========================================
    // 单元格编辑
    // ==========================================

    /// 写入原始输入并重算所属切片的汇总
    ///
    /// 原始字符串原样保存（包括 ""、"-"、"1." 等中间态）,
    /// 重算只涉及同一 (产品, 期间, 指标) 下的各产品组。
    ///
    /// # 返回
    /// - Ok(TotalValue): 重算后的切片汇总
    /// - Err(OutOfRangeKey): 期间不在预测目录内
    pub fn set_cell(&mut self, key: CellKey, raw: impl Into<String>) -> DomainResult<TotalValue> {
        let period_idx = self.period_index(key.period)?;
        let raw = raw.into();

        tracing::debug!(
            product = %key.product,
            period = %key.period,
            group = %key.group,
            metric = %key.metric,
            raw = %raw,
            "写入预测单元格"
        );

        let offset = self.cell_offset(key.product, period_idx, key.group, key.metric);
        self.cells[offset] = Some(raw);

        let total = self.recompute_slice(key.product, period_idx, key.metric);
        if !total.is_finite() {
            tracing::warn!(
                product = %key.product,
                period = %key.period,
                metric = %key.metric,
                "切片汇总为非有限值"
            );
        }
        Ok(total)
    }

    /// 批量覆写全部单元格,然后一次性重算全部汇总
    ///
    /// 遍历顺序: 产品 → 期间 → 产品组 → 指标
    ///
    /// # 返回
    /// - 写入的单元格数量
    pub fn overwrite_all<F>(&mut self, mut value_for: F) -> usize
    where
        F: FnMut(CellKey) -> String,
    {
        let mut written = 0;
        for product in Product::ALL {
            for period_idx in 0..self.periods.len() {
                let period = self.periods[period_idx];
                for group in ProductGroup::ALL {
                    for metric in Metric::ALL {
                        let raw = value_for(CellKey::new(product, period, group, metric));
                        let offset = self.cell_offset(product, period_idx, group, metric);
                        self.cells[offset] = Some(raw);
                        written += 1;
                    }
                }
            }
        }
        self.recompute_all_totals();
        written
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 原始输入；None 表示尚未录入（区别于 "0"）
    pub fn cell(&self, key: CellKey) -> DomainResult<Option<&str>> {
        let period_idx = self.period_index(key.period)?;
        Ok(self.cells[self.cell_offset(key.product, period_idx, key.group, key.metric)].as_deref())
    }

    /// 切片汇总
    pub fn total(&self, key: SliceKey) -> DomainResult<TotalValue> {
        let period_idx = self.period_index(key.period)?;
        Ok(self.totals[self.total_offset(key.product, period_idx, key.metric)])
    }

    /// 切片下各产品组的原始输入（产品组目录顺序）
    pub fn slice_cells(&self, key: SliceKey) -> DomainResult<Vec<Option<&str>>> {
        let period_idx = self.period_index(key.period)?;
        Ok(ProductGroup::ALL
            .iter()
            .map(|g| self.cells[self.cell_offset(key.product, period_idx, *g, key.metric)].as_deref())
            .collect())
    }

    /// 全部单元格（产品 → 期间 → 产品组 → 指标 顺序）
    pub fn cells(&self) -> impl Iterator<Item = (CellKey, Option<&str>)> + '_ {
        Product::ALL.into_iter().flat_map(move |product| {
            self.periods.iter().enumerate().flat_map(move |(period_idx, period)| {
                ProductGroup::ALL.into_iter().flat_map(move |group| {
                    Metric::ALL.into_iter().map(move |metric| {
                        (
                            CellKey::new(product, *period, group, metric),
                            self.cells[self.cell_offset(product, period_idx, group, metric)].as_deref(),
                        )
                    })
                })
            })
        })
    }

    /// 全部切片汇总（产品 → 期间 → 指标 顺序）
    pub fn totals(&self) -> impl Iterator<Item = (SliceKey, TotalValue)> + '_ {
        Product::ALL.into_iter().flat_map(move |product| {
            self.periods.iter().enumerate().flat_map(move |(period_idx, period)| {
                Metric::ALL.into_iter().map(move |metric| {
                    (
                        SliceKey::new(product, *period, metric),
                        self.totals[self.total_offset(product, period_idx, metric)],
                    )
                })
            })
        })
    }

    // ==========================================
    // 内部: 汇总重算
    // ==========================================

    fn recompute_slice(&mut self, product: Product, period_idx: usize, metric: Metric) -> TotalValue {
        let total = sum_raw_cells(
            ProductGroup::ALL
                .iter()
                .map(|g| self.cells[self.cell_offset(product, period_idx, *g, metric)].as_deref()),
        );
        let offset = self.total_offset(product, period_idx, metric);
        self.totals[offset] = total;
        total
    }

    fn recompute_all_totals(&mut self) {
        for product in Product::ALL {
            for period_idx in 0..self.periods.len() {
                for metric in Metric::ALL {
                    self.recompute_slice(product, period_idx, metric);
                }
            }
        }
    }

    // ==========================================
    // 内部: 寻址
    // ==========================================

    fn period_index(&self, period: Period) -> DomainResult<usize> {
        self.periods
            .binary_search(&period)
            .map_err(|_| DomainError::out_of_range("forecast_period", period))
    }

    fn cell_offset(&self, product: Product, period_idx: usize, group: ProductGroup, metric: Metric) -> usize {
        ((product.index() * self.periods.len() + period_idx) * ProductGroup::ALL.len() + group.index())
            * Metric::ALL.len()
            + metric.index()
    }

    fn total_offset(&self, product: Product, period_idx: usize, metric: Metric) -> usize {
        (product.index() * self.periods.len() + period_idx) * Metric::ALL.len() + metric.index()
    }
}
