// ==========================================
// 需求计划系统 - 汇总引擎
// ==========================================
// 职责:
// 1. 样例数据批量加载（覆写全部单元格 + 全量重算）
// 2. 汇总不变量校验（逐切片重新求和比对）
// 说明: 单元格编辑的切片级重算由 ForecastGrid::set_cell 完成
// ==========================================

use crate::domain::forecast::{ForecastGrid, SliceKey};
use crate::domain::quantity::{sum_raw_cells, QuantityRange, TotalValue};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::instrument;

// ==========================================
// SampleLoader - 样例预测加载器
// ==========================================
pub struct SampleLoader {
    range: QuantityRange,
}

impl SampleLoader {
    pub fn new(range: QuantityRange) -> Self {
        Self { range }
    }

    pub fn range(&self) -> QuantityRange {
        self.range
    }

    /// 用随机样例覆写整个网格（破坏性操作,包括人工录入值）
    ///
    /// 每个汇总按完整精度求和后只舍入一次。
    ///
    /// # 返回
    /// - 写入的单元格数量
    #[instrument(skip_all, fields(cells = grid.cell_count()))]
    pub fn load<R: Rng + ?Sized>(&self, grid: &mut ForecastGrid, rng: &mut R) -> usize {
        let range = self.range;
        let written = grid.overwrite_all(|_| range.sample(&mut *rng).to_string());
        tracing::info!(written, "样例预测已加载");
        written
    }
}

impl Default for SampleLoader {
    fn default() -> Self {
        Self::new(QuantityRange::default_sample())
    }
}

// ==========================================
// 汇总不变量校验
// ==========================================

/// 汇总不一致记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollupViolation {
    pub slice: SliceKey,
    pub stored: TotalValue,
    pub expected: TotalValue,
}

/// 逐切片重新求和,返回与存储值不一致的切片
#[instrument(skip_all)]
pub fn verify_rollups(grid: &ForecastGrid) -> Vec<RollupViolation> {
    let violations: Vec<RollupViolation> = grid
        .totals()
        .filter_map(|(slice, stored)| {
            let cells = grid.slice_cells(slice).ok()?;
            let expected = sum_raw_cells(cells);
            (expected != stored).then_some(RollupViolation {
                slice,
                stored,
                expected,
            })
        })
        .collect();

    if !violations.is_empty() {
        tracing::warn!(count = violations.len(), "发现汇总不一致");
    }
    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::Catalog;
    use crate::domain::forecast::CellKey;
    use crate::domain::period::Period;
    use crate::domain::quantity::{parse_quantity, ParsedQuantity};
    use crate::domain::types::{Metric, Product, ProductGroup};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rust_decimal::Decimal;

    fn grid() -> ForecastGrid {
        ForecastGrid::new(&Catalog::contiguous(Period::from_ym(2024, 11).unwrap(), 4, 4).unwrap())
    }

    #[test]
    fn test_load_overwrites_every_cell_within_range() {
        let mut g = grid();
        let key = CellKey::new(
            Product::Agriculture,
            Period::from_ym(2025, 3).unwrap(),
            ProductGroup::RebarTieWire,
            Metric::Backlog,
        );
        g.set_cell(key, "999").unwrap();

        let loader = SampleLoader::default();
        let written = loader.load(&mut g, &mut StdRng::seed_from_u64(11));
        assert_eq!(written, g.cell_count());

        for (_, raw) in g.cells() {
            let raw = raw.expect("每个单元格都应有值");
            match parse_quantity(raw) {
                ParsedQuantity::Value(v) => assert!(loader.range().contains(v), "v={}", v),
                other => panic!("样例值无法解析: {:?}", other),
            }
        }
        assert_ne!(g.cell(key).unwrap(), Some("999"));
        assert!(verify_rollups(&g).is_empty());
    }

    #[test]
    fn test_totals_fresh_after_reload() {
        let mut g = grid();
        let loader = SampleLoader::default();
        loader.load(&mut g, &mut StdRng::seed_from_u64(1));
        let first: Vec<TotalValue> = g.totals().map(|(_, t)| t).collect();

        loader.load(&mut g, &mut StdRng::seed_from_u64(2));
        let second: Vec<TotalValue> = g.totals().map(|(_, t)| t).collect();

        assert_ne!(first, second);
        assert!(verify_rollups(&g).is_empty());
    }

    #[test]
    fn test_totals_bounded_by_group_count() {
        let mut g = grid();
        SampleLoader::default().load(&mut g, &mut StdRng::seed_from_u64(5));
        let groups = Decimal::from(ProductGroup::ALL.len());
        for (_, total) in g.totals() {
            let v = total.as_decimal().unwrap();
            assert!(v >= Decimal::new(50, 1) * groups);
            assert!(v < Decimal::new(550, 1) * groups);
        }
    }
}
