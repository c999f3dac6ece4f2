// ==========================================
// 测试数据生成器
// ==========================================
// 用途: 生成历史实绩导入用的测试数据集CSV文件
// 输出: tests/fixtures/datasets/*.csv
// 说明: 固定随机种子,重复运行结果一致
// ==========================================

use csv::Writer;
use demand_planning::domain::{Catalog, Period};
use demand_planning::engine::HistoricalSeeder;
use demand_planning::HistoricalRecord;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::error::Error;
use std::fs::{self, File};

const OUTPUT_DIR: &str = "tests/fixtures/datasets";

// CSV 表头（英文列名）
const CSV_HEADER: &[&str] = &["product", "group", "period", "tons"];

// CSV 表头（中文列名,验证别名映射）
const CSV_HEADER_ZH: &[&str] = &["产品", "产品组", "期间", "吨位"];

fn to_row(record: &HistoricalRecord) -> Vec<String> {
    vec![
        record.product.to_string(),
        record.group.to_string(),
        record.period.to_string(),
        record.tons.to_string(),
    ]
}

fn default_records(seed: u64) -> Result<Vec<HistoricalRecord>, Box<dyn Error>> {
    let catalog = Catalog::contiguous(Period::DEFAULT_HISTORY_START, 4, 4)?;
    let mut rng = StdRng::seed_from_u64(seed);
    let store = HistoricalSeeder::default().generate(&catalog, &mut rng)?;
    Ok(store.records().collect())
}

fn write_dataset(
    name: &str,
    header: &[&str],
    rows: impl IntoIterator<Item = Vec<String>>,
) -> Result<usize, Box<dyn Error>> {
    let file = File::create(format!("{}/{}", OUTPUT_DIR, name))?;
    let mut wtr = Writer::from_writer(file);
    wtr.write_record(header)?;

    let mut count = 0;
    for row in rows {
        wtr.write_record(&row)?;
        count += 1;
    }

    wtr.flush()?;
    Ok(count)
}

fn main() -> Result<(), Box<dyn Error>> {
    println!("开始生成测试数据集...");
    fs::create_dir_all(OUTPUT_DIR)?;

    // 1. 完整历史实绩（默认目录 5 产品 × 4 月 × 5 产品组）
    let records = default_records(42)?;
    let count = write_dataset("01_complete_history.csv", CSV_HEADER, records.iter().map(to_row))?;
    println!("✓ 生成 01_complete_history.csv ({}条)", count);

    // 2. 中文表头
    let count = write_dataset("02_chinese_headers.csv", CSV_HEADER_ZH, records.iter().map(to_row))?;
    println!("✓ 生成 02_chinese_headers.csv ({}条)", count);

    // 3. 缺失记录（去掉最后一条,导入后构造存储应失败）
    let truncated = records.iter().take(records.len().saturating_sub(1)).map(to_row);
    let count = write_dataset("03_missing_record.csv", CSV_HEADER, truncated)?;
    println!("✓ 生成 03_missing_record.csv ({}条，缺 1 条)", count);

    // 4. 吨位类型错误
    let invalid = records.iter().enumerate().map(|(idx, record)| {
        let mut row = to_row(record);
        if idx == 3 {
            row[3] = "twelve".to_string();
        }
        row
    });
    let count = write_dataset("04_invalid_tons.csv", CSV_HEADER, invalid)?;
    println!("✓ 生成 04_invalid_tons.csv ({}条，第 4 行吨位非法)", count);

    println!("✓ 所有测试数据集生成完成！");
    Ok(())
}
