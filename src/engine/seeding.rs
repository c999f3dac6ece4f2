// ==========================================
// 需求计划系统 - 历史实绩生成引擎
// ==========================================
// 职责: 会话开始时一次性生成全部历史实绩
// 输入: 目录 + 外部注入的随机源
// 输出: HistoricalSalesStore（之后只读）
// ==========================================

use crate::domain::catalog::Catalog;
use crate::domain::error::DomainResult;
use crate::domain::historical::{HistoricalRecord, HistoricalSalesStore};
use crate::domain::quantity::QuantityRange;
use rand::Rng;
use tracing::instrument;

// ==========================================
// HistoricalSeeder - 历史实绩生成器
// ==========================================
pub struct HistoricalSeeder {
    range: QuantityRange,
}

impl HistoricalSeeder {
    /// 创建生成器
    ///
    /// # 参数
    /// - range: 单条实绩的取值区间（一位小数网格上的半开区间）
    pub fn new(range: QuantityRange) -> Self {
        Self { range }
    }

    pub fn range(&self) -> QuantityRange {
        self.range
    }

    /// 为 产品 × 历史期间 × 产品组 全空间生成实绩
    ///
    /// 月度合计由存储按"先精确求和,后舍入"派生。
    #[instrument(skip(self, catalog, rng), fields(periods = catalog.historical_periods().len()))]
    pub fn generate<R: Rng + ?Sized>(
        &self,
        catalog: &Catalog,
        rng: &mut R,
    ) -> DomainResult<HistoricalSalesStore> {
        let mut records = Vec::with_capacity(
            catalog.products().len() * catalog.historical_periods().len() * catalog.groups().len(),
        );

        for &product in catalog.products() {
            for &period in catalog.historical_periods() {
                for &group in catalog.groups() {
                    records.push(HistoricalRecord {
                        product,
                        group,
                        period,
                        tons: self.range.sample(rng),
                    });
                }
            }
        }

        tracing::info!(records = records.len(), "历史实绩已生成");
        HistoricalSalesStore::from_records(catalog, records)
    }
}

impl Default for HistoricalSeeder {
    fn default() -> Self {
        Self::new(QuantityRange::default_sales())
    }
}
