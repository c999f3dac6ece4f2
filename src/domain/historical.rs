// ==========================================
// 需求计划系统 - 历史实绩存储
// ==========================================
// 职责: 保存 (产品, 产品组, 历史期间) 实绩吨位,派生产品月度合计
// 红线: 一次写入,之后只读（无任何修改方法）
// ==========================================

use crate::domain::catalog::Catalog;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::period::Period;
use crate::domain::quantity::round_tenths;
use crate::domain::types::{Product, ProductGroup};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ==========================================
// HistoricalRecord - 单条历史实绩
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalRecord {
    pub product: Product,
    pub group: ProductGroup,
    pub period: Period,
    pub tons: Decimal, // 实绩吨位（非负）
}

// ==========================================
// HistoricalSalesStore - 历史实绩存储
// ==========================================
// 布局: values[product][period][group], monthly_totals[product][period]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoricalSalesStore {
    periods: Vec<Period>,
    values: Vec<Decimal>,
    monthly_totals: Vec<Decimal>,
}

impl HistoricalSalesStore {
    /// 由完整的实绩记录集构造
    ///
    /// # 校验
    /// - 期间必须属于目录的历史期间
    /// - 吨位非负
    /// - 每个 (产品, 产品组, 期间) 恰好一条
    pub fn from_records<I>(catalog: &Catalog, records: I) -> DomainResult<Self>
    where
        I: IntoIterator<Item = HistoricalRecord>,
    {
        let periods = catalog.historical_periods().to_vec();
        let group_count = ProductGroup::ALL.len();
        let mut slots: Vec<Option<Decimal>> =
            vec![None; Product::ALL.len() * periods.len() * group_count];

        for record in records {
            let period_idx = catalog.historical_index(record.period)?;
            if record.tons < Decimal::ZERO {
                return Err(DomainError::NegativeQuantity {
                    product: record.product,
                    group: record.group,
                    period: record.period,
                    tons: record.tons,
                });
            }

            let slot = &mut slots[value_offset(periods.len(), record.product, period_idx, record.group)];
            if slot.is_some() {
                return Err(DomainError::DuplicateRecord {
                    product: record.product,
                    group: record.group,
                    period: record.period,
                });
            }
            *slot = Some(record.tons);
        }

        // 按 [product][period][group] 顺序展开,同时检查缺失
        let mut values = Vec::with_capacity(slots.len());
        let mut monthly_totals = Vec::with_capacity(Product::ALL.len() * periods.len());
        for product in Product::ALL {
            for (period_idx, period) in periods.iter().enumerate() {
                let mut sum = Decimal::ZERO;
                for group in ProductGroup::ALL {
                    let tons = slots[value_offset(periods.len(), product, period_idx, group)]
                        .ok_or(DomainError::MissingRecord {
                            product,
                            group,
                            period: *period,
                        })?;
                    sum = sum.checked_add(tons).ok_or(DomainError::TotalOverflow {
                        product,
                        period: *period,
                    })?;
                    values.push(tons);
                }
                // 先精确求和,再一次舍入
                monthly_totals.push(round_tenths(sum));
            }
        }

        tracing::debug!(
            periods = periods.len(),
            records = values.len(),
            "历史实绩存储已构建"
        );

        Ok(Self {
            periods,
            values,
            monthly_totals,
        })
    }

    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    /// 单条实绩
    pub fn value(&self, product: Product, group: ProductGroup, period: Period) -> DomainResult<Decimal> {
        let period_idx = self.period_index(period)?;
        Ok(self.values[value_offset(self.periods.len(), product, period_idx, group)])
    }

    /// 产品月度合计（全部产品组之和）
    pub fn monthly_total(&self, product: Product, period: Period) -> DomainResult<Decimal> {
        let period_idx = self.period_index(period)?;
        Ok(self.monthly_totals[product.index() * self.periods.len() + period_idx])
    }

    /// 全部实绩记录（产品 → 期间 → 产品组 顺序）
    pub fn records(&self) -> impl Iterator<Item = HistoricalRecord> + '_ {
        Product::ALL.into_iter().flat_map(move |product| {
            self.periods.iter().enumerate().flat_map(move |(period_idx, period)| {
                ProductGroup::ALL.into_iter().map(move |group| HistoricalRecord {
                    product,
                    group,
                    period: *period,
                    tons: self.values[value_offset(self.periods.len(), product, period_idx, group)],
                })
            })
        })
    }

    /// 全部月度合计（产品 → 期间 顺序）
    pub fn monthly_totals(&self) -> impl Iterator<Item = (Product, Period, Decimal)> + '_ {
        Product::ALL.into_iter().flat_map(move |product| {
            self.periods.iter().enumerate().map(move |(period_idx, period)| {
                (
                    product,
                    *period,
                    self.monthly_totals[product.index() * self.periods.len() + period_idx],
                )
            })
        })
    }

    fn period_index(&self, period: Period) -> DomainResult<usize> {
        self.periods
            .binary_search(&period)
            .map_err(|_| DomainError::out_of_range("historical_period", period))
    }
}

fn value_offset(period_count: usize, product: Product, period_idx: usize, group: ProductGroup) -> usize {
    (product.index() * period_count + period_idx) * ProductGroup::ALL.len() + group.index()
}
