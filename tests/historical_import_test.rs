// ==========================================
// 历史实绩导入 集成测试
// ==========================================
// 测试目标: 验证 文件 → 导入 → 会话 的完整流程
// ==========================================


use demand_planning::api::{ApiError, PlanningSession};
use demand_planning::config::PlanningConfig;
use demand_planning::domain::{DomainError, Product, ProductGroup};
use demand_planning::importer::{HistoricalImporter, ImportError};
use demand_planning::logging;
use rand::rngs::StdRng;
use rand::SeedableRng;
use test_helpers::{dec, history_with, period, write_history_csv};

#[test]
fn test_import_file_builds_session() {
    logging::init_test();
    let config = PlanningConfig::default();
    let catalog = config.catalog().unwrap();
    let records = history_with(
        &catalog,
        &[
            (Product::Wire, ProductGroup::RebarTieWire, 2, dec("40.4")),
            (Product::Wire, ProductGroup::MeshPanels, 2, dec("0.25")),
        ],
    );
    let file = write_history_csv(&records).expect("Failed to write csv");

    let session = PlanningSession::from_historical_file(config, file.path())
        .expect("Failed to import history");

    // 先精确求和,再舍入
    assert_eq!(
        session.monthly_total(Product::Wire, period(2025, 1)).unwrap(),
        dec("40.7")
    );
    assert_eq!(
        session
            .historical()
            .value(Product::Wire, ProductGroup::MeshPanels, period(2025, 1))
            .unwrap(),
        dec("0.25")
    );
}

#[test]
fn test_import_excel_workbook_builds_session() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/history_sample.xlsx");

    let session = PlanningSession::from_historical_file(PlanningConfig::default(), &path)
        .expect("Failed to import workbook");

    // 每月合计 = 150 + 7.5 × 月序；Wire 首月 Bar Ties 改为 12.3
    assert_eq!(
        session.monthly_total(Product::Mesh, period(2025, 2)).unwrap(),
        dec("172.5")
    );
    assert_eq!(
        session.monthly_total(Product::Wire, period(2024, 11)).unwrap(),
        dec("122.3")
    );
    assert_eq!(
        session
            .historical()
            .value(Product::Stucco, ProductGroup::GalvanizedWire, period(2024, 12))
            .unwrap(),
        dec("31.5")
    );
}

#[test]
fn test_import_from_reader_matches_file() {
    let config = PlanningConfig::default();
    let catalog = config.catalog().unwrap();
    let records = history_with(&catalog, &[(Product::Mesh, ProductGroup::BarTies, 0, dec("7.5"))]);
    let file = write_history_csv(&records).unwrap();

    let from_file = HistoricalImporter::new().import_file(file.path()).unwrap();
    let csv = std::fs::read(file.path()).unwrap();
    let from_reader = HistoricalImporter::new().import_csv(csv.as_slice()).unwrap();
    assert_eq!(from_file, from_reader);
    assert_eq!(from_file.len(), 5 * 4 * 5);
}

#[test]
fn test_incomplete_history_rejected() {
    let config = PlanningConfig::default();
    let catalog = config.catalog().unwrap();
    let mut records = history_with(&catalog, &[]);
    records.pop();

    let result = PlanningSession::from_historical_records(config, records, StdRng::seed_from_u64(1));
    assert!(matches!(
        result,
        Err(ApiError::Domain(DomainError::MissingRecord { .. }))
    ));
}

#[test]
fn test_duplicate_and_out_of_window_records_rejected() {
    let config = PlanningConfig::default();
    let catalog = config.catalog().unwrap();

    let mut duplicated = history_with(&catalog, &[]);
    duplicated.push(duplicated[0]);
    assert!(matches!(
        PlanningSession::from_historical_records(config.clone(), duplicated, StdRng::seed_from_u64(1)),
        Err(ApiError::Domain(DomainError::DuplicateRecord { .. }))
    ));

    let mut shifted = history_with(&catalog, &[]);
    shifted[0].period = period(2025, 3);
    assert!(matches!(
        PlanningSession::from_historical_records(config, shifted, StdRng::seed_from_u64(1)),
        Err(ApiError::Domain(DomainError::OutOfRangeKey { .. }))
    ));
}

#[test]
fn test_bad_file_surfaces_import_error() {
    let result = PlanningSession::from_historical_file(PlanningConfig::default(), "missing.csv");
    assert!(matches!(
        result,
        Err(ApiError::Import(ImportError::FileNotFound(_)))
    ));

    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    std::io::Write::write_all(&mut file, b"product,group,period,tons\nWire,Bar Ties,Nov 2024,-x\n")
        .unwrap();
    let result = PlanningSession::from_historical_file(PlanningConfig::default(), file.path());
    assert!(matches!(
        result,
        Err(ApiError::Import(ImportError::TypeConversionError { row: 1, .. }))
    ));
}
