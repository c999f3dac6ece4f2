// ==========================================
// 需求计划系统 - 命令行入口
// ==========================================
// 用法: demand-planning [historical_file|-] [--sample]
// - historical_file: CSV / Excel 历史实绩；"-" 表示从标准输入读 CSV；省略则随机生成
// - --sample: 输出前先加载样例预测
// 输出: 历史合计 + 时间序列投影（JSON,写到 stdout）
// ==========================================

use anyhow::{bail, Context};
use demand_planning::api::{MonthlyTotalRow, PlanningSession};
use demand_planning::config::ConfigManager;
use demand_planning::engine::{SeriesProjection, TrendLine};
use demand_planning::{logging, Period, Product};
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

/// 命令行输出
#[derive(Serialize)]
struct Report {
    session_id: Uuid,
    historical_periods: Vec<Period>,
    monthly_totals: Vec<MonthlyTotalRow>,
    series: SeriesProjection,
    trends: BTreeMap<Product, Option<TrendLine>>,
}

fn main() -> anyhow::Result<()> {
    // 先用默认过滤器启动日志,配置加载过程也能输出
    let log = logging::init("info");
    let manager = ConfigManager::load().context("加载配置失败")?;
    log.set_filter(&manager.config().log_filter);

    let mut source: Option<String> = None;
    let mut load_sample = false;
    for arg in std::env::args().skip(1) {
        if arg == "--sample" {
            load_sample = true;
        } else if arg.starts_with("--") {
            bail!("未知参数: {}", arg);
        } else if source.is_some() {
            bail!("只能指定一个历史实绩文件");
        } else {
            source = Some(arg);
        }
    }

    tracing::info!("==================================================");
    tracing::info!("{} v{}", demand_planning::APP_NAME, demand_planning::VERSION);
    tracing::info!(source = ?manager.source(), "配置来源");
    tracing::info!("==================================================");

    let config = manager.into_config();
    let mut session = match source.as_deref() {
        Some("-") => PlanningSession::from_historical_csv(config, std::io::stdin().lock())
            .context("从标准输入导入历史实绩失败")?,
        Some(path) => PlanningSession::from_historical_file(config, path)
            .with_context(|| format!("导入历史实绩失败: {}", path))?,
        None => PlanningSession::new(config).context("创建计划会话失败")?,
    };

    if load_sample {
        let loaded = session.load_sample_forecast();
        tracing::info!(cells = loaded.cells_written, "已加载样例预测");
    }

    let historical = session.seed_historical();
    let report = Report {
        session_id: session.session_id(),
        historical_periods: historical.periods,
        monthly_totals: historical.monthly_totals,
        series: session.project_series()?,
        trends: session.project_trends()?,
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
