// ==========================================
// 需求计划系统 - 计划会话 API
// ==========================================
// 职责: 单会话门面,持有目录、历史实绩、预测网格、选择状态与随机源
// 红线:
// - 历史实绩会话开始时一次写入,之后只读
// - 预测单元格只能经 edit_cell / load_sample_forecast 修改,汇总同步重算
// - 目录外的键一律报错,不做静默忽略
// 并发: 单线程独占（操作取 &mut self,跨线程使用需调用方串行化）
// ==========================================

use crate::api::dto::{
    CurrentSelection, ForecastSnapshot, FullForecastSnapshot, HistoricalSnapshot, UpdatedTotal,
};
use crate::api::error::ApiResult;
use crate::config::PlanningConfig;
use crate::domain::catalog::Catalog;
use crate::domain::forecast::{CellKey, ForecastGrid, SliceKey};
use crate::domain::historical::{HistoricalRecord, HistoricalSalesStore};
use crate::domain::period::Period;
use crate::domain::quantity::TotalValue;
use crate::domain::selection::SelectionState;
use crate::domain::types::{Metric, Product, ProductGroup};
use crate::engine::{HistoricalSeeder, SampleLoader, SeriesProjection, SeriesProjector, TrendLine};
use crate::importer::HistoricalImporter;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use tracing::instrument;
use uuid::Uuid;

// ==========================================
// PlanningSession - 计划会话
// ==========================================

/// 计划会话
///
/// 会话结束即丢弃全部状态,不做持久化。
pub struct PlanningSession {
    session_id: Uuid,
    config: PlanningConfig,
    catalog: Catalog,
    historical: HistoricalSalesStore,
    forecast: ForecastGrid,
    selection: SelectionState,
    rng: StdRng,
    loader: SampleLoader,
    projector: SeriesProjector,
}

impl PlanningSession {
    // ==========================================
    // 构造
    // ==========================================

    /// 按配置创建会话（配置了种子则可复现,否则使用系统熵）
    pub fn new(config: PlanningConfig) -> ApiResult<Self> {
        let rng = rng_for(&config);
        Self::with_rng(config, rng)
    }

    /// 使用调用方提供的随机源创建会话,历史实绩随机生成
    ///
    /// # 参数
    /// - config: 会话配置（目录窗口、取数区间）
    /// - rng: 随机源,后续样例加载沿用同一随机源
    pub fn with_rng(config: PlanningConfig, mut rng: StdRng) -> ApiResult<Self> {
        config.validate()?;
        let catalog = config.catalog()?;
        let historical = HistoricalSeeder::new(config.sales_range).generate(&catalog, &mut rng)?;
        Ok(Self::assemble(config, catalog, historical, rng))
    }

    /// 使用外部历史实绩创建会话
    ///
    /// # 返回
    /// - Err(Domain): 记录不完整、重复、为负或期间不在目录内
    pub fn from_historical_records<I>(
        config: PlanningConfig,
        records: I,
        rng: StdRng,
    ) -> ApiResult<Self>
    where
        I: IntoIterator<Item = HistoricalRecord>,
    {
        config.validate()?;
        let catalog = config.catalog()?;
        let historical = HistoricalSalesStore::from_records(&catalog, records)?;
        Ok(Self::assemble(config, catalog, historical, rng))
    }

    /// 从 CSV / Excel 文件导入历史实绩并创建会话
    pub fn from_historical_file<P: AsRef<Path>>(config: PlanningConfig, path: P) -> ApiResult<Self> {
        let records = HistoricalImporter::new().import_file(path)?;
        let rng = rng_for(&config);
        Self::from_historical_records(config, records, rng)
    }

    /// 从 CSV 输入流导入历史实绩并创建会话
    pub fn from_historical_csv<R: Read>(config: PlanningConfig, input: R) -> ApiResult<Self> {
        let records = HistoricalImporter::new().import_csv(input)?;
        let rng = rng_for(&config);
        Self::from_historical_records(config, records, rng)
    }

    fn assemble(
        config: PlanningConfig,
        catalog: Catalog,
        historical: HistoricalSalesStore,
        rng: StdRng,
    ) -> Self {
        let session = Self {
            session_id: Uuid::new_v4(),
            forecast: ForecastGrid::new(&catalog),
            loader: SampleLoader::new(config.sample_range),
            projector: SeriesProjector::new(),
            selection: SelectionState::new(),
            config,
            catalog,
            historical,
            rng,
        };

        tracing::info!(
            session_id = %session.session_id,
            historical_periods = session.catalog.historical_periods().len(),
            forecast_periods = session.catalog.forecast_periods().len(),
            "计划会话已创建"
        );
        session
    }

    // ==========================================
    // 对外操作
    // ==========================================

    /// 历史实绩快照
    ///
    /// 历史实绩在会话创建时一次生成,重复调用返回同一份数据。
    pub fn seed_historical(&self) -> HistoricalSnapshot {
        HistoricalSnapshot::capture(self.session_id, &self.historical)
    }

    /// 重置预测网格: 全部单元格缺失,全部汇总为 0
    #[instrument(skip(self), fields(session_id = %self.session_id))]
    pub fn seed_forecast(&mut self) -> ForecastSnapshot {
        self.forecast.initialize();
        tracing::info!("预测网格已重置");
        ForecastSnapshot::capture(self.session_id, &self.forecast)
    }

    /// 编辑单元格并返回重算后的切片汇总
    ///
    /// # 参数
    /// - raw: 原始输入,原样保存（无法解析的输入按 0 参与汇总,不报错）
    ///
    /// # 返回
    /// - Ok(UpdatedTotal): (产品, 期间, 指标) 的新汇总
    /// - Err(Domain(OutOfRangeKey)): 期间不在预测目录内
    pub fn edit_cell(
        &mut self,
        product: Product,
        period: Period,
        group: ProductGroup,
        metric: Metric,
        raw: &str,
    ) -> ApiResult<UpdatedTotal> {
        let value = self
            .forecast
            .set_cell(CellKey::new(product, period, group, metric), raw)?;

        Ok(UpdatedTotal {
            product,
            period,
            metric,
            value,
        })
    }

    /// 用随机样例覆写整个预测网格（会覆盖人工录入值）
    #[instrument(skip(self), fields(session_id = %self.session_id))]
    pub fn load_sample_forecast(&mut self) -> FullForecastSnapshot {
        let cells_written = self.loader.load(&mut self.forecast, &mut self.rng);
        FullForecastSnapshot {
            cells_written,
            forecast: ForecastSnapshot::capture(self.session_id, &self.forecast),
        }
    }

    /// 每个产品的连续时间序列（历史在前,预测在后）
    pub fn project_series(&self) -> ApiResult<SeriesProjection> {
        Ok(self
            .projector
            .project(&self.catalog, &self.historical, &self.forecast)?)
    }

    /// 每个产品时间序列的线性趋势
    pub fn project_trends(&self) -> ApiResult<BTreeMap<Product, Option<TrendLine>>> {
        let projection = self.project_series()?;
        Ok(self.projector.trend_lines(&projection))
    }

    /// 切换产品展开状态
    pub fn toggle_selection(&mut self, product: Product) -> CurrentSelection {
        self.selection.toggle(product);
        tracing::debug!(expanded = ?self.selection.expanded(), "展开状态已切换");
        self.selection.into()
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 单元格原始输入；None 表示尚未录入
    pub fn cell(
        &self,
        product: Product,
        period: Period,
        group: ProductGroup,
        metric: Metric,
    ) -> ApiResult<Option<String>> {
        let raw = self
            .forecast
            .cell(CellKey::new(product, period, group, metric))?;
        Ok(raw.map(str::to_string))
    }

    /// 切片汇总
    pub fn total(&self, product: Product, period: Period, metric: Metric) -> ApiResult<TotalValue> {
        Ok(self.forecast.total(SliceKey::new(product, period, metric))?)
    }

    /// 产品月度历史合计
    pub fn monthly_total(&self, product: Product, period: Period) -> ApiResult<Decimal> {
        Ok(self.historical.monthly_total(product, period)?)
    }

    pub fn forecast_snapshot(&self) -> ForecastSnapshot {
        ForecastSnapshot::capture(self.session_id, &self.forecast)
    }

    pub fn current_selection(&self) -> CurrentSelection {
        self.selection.into()
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn config(&self) -> &PlanningConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn historical(&self) -> &HistoricalSalesStore {
        &self.historical
    }

    pub fn forecast(&self) -> &ForecastGrid {
        &self.forecast
    }
}

fn rng_for(config: &PlanningConfig) -> StdRng {
    match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::error::ApiError;
    use crate::domain::error::DomainError;

    fn session() -> PlanningSession {
        PlanningSession::with_rng(PlanningConfig::default(), StdRng::seed_from_u64(1)).unwrap()
    }

    #[test]
    fn test_new_session_has_empty_forecast() {
        let session = session();
        let snapshot = session.forecast_snapshot();
        assert!(snapshot.cells.iter().all(|c| c.raw.is_none()));
        assert!(snapshot.totals.iter().all(|t| t.value == TotalValue::zero()));
        assert_eq!(session.current_selection().expanded, None);
    }

    #[test]
    fn test_edit_cell_outside_catalog_fails() {
        let mut session = session();
        let outside = Period::from_ym(2030, 1).unwrap();
        let result = session.edit_cell(
            Product::Wire,
            outside,
            ProductGroup::BarTies,
            Metric::Forecast,
            "1",
        );
        assert!(matches!(
            result,
            Err(ApiError::Domain(DomainError::OutOfRangeKey { .. }))
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = PlanningConfig {
            forecast_months: 0,
            ..PlanningConfig::default()
        };
        assert!(matches!(
            PlanningSession::with_rng(config, StdRng::seed_from_u64(1)),
            Err(ApiError::Config(_))
        ));
    }
}
