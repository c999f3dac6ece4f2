// ==========================================
// 需求计划系统 - 文件解析器实现
// ==========================================
// 职责: 表格文件 → 原始行（表头 → 单元格文本）
// 支持: Excel (.xlsx/.xls) / CSV (.csv)
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook_auto, Reader};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// 原始行: 表头 → 去空白后的单元格文本
pub type RawRow = HashMap<String, String>;

// ==========================================
// FileParser Trait
// ==========================================
pub trait FileParser {
    /// 解析文件为原始行（跳过完全空白的行）
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<Vec<RawRow>>;
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl CsvParser {
    /// 从任意输入流解析 CSV（首行为表头）
    pub fn parse_reader<R: Read>(&self, input: R) -> ImportResult<Vec<RawRow>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(input);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut records = Vec::new();
        for result in reader.records() {
            let record = result?;
            let row_map: RawRow = headers
                .iter()
                .zip(record.iter())
                .map(|(header, value)| (header.clone(), value.trim().to_string()))
                .collect();

            if row_map.values().all(|v| v.is_empty()) {
                continue;
            }
            records.push(row_map);
        }

        Ok(records)
    }
}

impl FileParser for CsvParser {
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<Vec<RawRow>> {
        if !file_path.exists() {
            return Err(ImportError::FileNotFound(file_path.display().to_string()));
        }

        if let Some(ext) = file_path.extension() {
            if !ext.eq_ignore_ascii_case("csv") {
                return Err(ImportError::UnsupportedFormat(
                    ext.to_string_lossy().to_string(),
                ));
            }
        }

        self.parse_reader(File::open(file_path)?)
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<Vec<RawRow>> {
        if !file_path.exists() {
            return Err(ImportError::FileNotFound(file_path.display().to_string()));
        }

        let ext = file_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        if ext != "xlsx" && ext != "xls" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        // 按扩展名选择 xlsx / xls(BIFF) 读取器
        let mut workbook = open_workbook_auto(file_path)?;

        // 只读第一个 sheet
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;

        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| ImportError::ExcelParseError(e.to_string()))?;

        let mut rows = range.rows();
        let header_row = rows
            .next()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无数据行".to_string()))?;

        let headers: Vec<String> = header_row
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();

        let mut records = Vec::new();
        for data_row in rows {
            let row_map: RawRow = headers
                .iter()
                .zip(data_row.iter())
                .map(|(header, cell)| (header.clone(), cell.to_string().trim().to_string()))
                .collect();

            if row_map.values().all(|v| v.is_empty()) {
                continue;
            }
            records.push(row_map);
        }

        Ok(records)
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl UniversalFileParser {
    pub fn parse<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<Vec<RawRow>> {
        let path = file_path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" => CsvParser.parse_to_raw_records(path),
            "xlsx" | "xls" => ExcelParser.parse_to_raw_records(path),
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn csv_file(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file
    }

    #[test]
    fn test_csv_parser_valid_file() {
        let file = csv_file(&["product,group,period,tons", "Mesh, Bar Ties ,Nov 2024,12.5"]);

        let records = CsvParser.parse_to_raw_records(file.path()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("group"), Some(&"Bar Ties".to_string()));
        assert_eq!(records[0].get("tons"), Some(&"12.5".to_string()));
    }

    #[test]
    fn test_csv_parser_skip_empty_rows() {
        let file = csv_file(&["product,tons", "Mesh,1.0", ",", "Wire,2.0"]);
        let records = CsvParser.parse_to_raw_records(file.path()).unwrap();
        assert_eq!(records.len(), 2);
    }

    fn fixture(name: &str) -> std::path::PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests/fixtures")
            .join(name)
    }

    #[test]
    fn test_excel_parser_reads_first_sheet() {
        let records = ExcelParser
            .parse_to_raw_records(&fixture("history_sample.xlsx"))
            .unwrap();
        assert_eq!(records.len(), 5 * 4 * 5);

        let first = &records[0];
        assert_eq!(first.get("product"), Some(&"Agriculture".to_string()));
        assert_eq!(first.get("product group"), Some(&"Rebar Tie Wire".to_string()));
        assert_eq!(first.get("month"), Some(&"Nov 2024".to_string()));
        // 数值单元格按显示文本读出
        assert_eq!(first.get("tons"), Some(&"10".to_string()));
        assert_eq!(records[1].get("tons"), Some(&"20".to_string()));
        assert_eq!(records[5].get("tons"), Some(&"11.5".to_string()));

        let via_universal = UniversalFileParser
            .parse(fixture("history_sample.xlsx"))
            .unwrap();
        assert_eq!(via_universal, records);
    }

    #[test]
    fn test_excel_parser_rejects_corrupt_workbooks() {
        for suffix in [".xlsx", ".xls"] {
            let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
            file.write_all(b"product,group,period,tons\n").unwrap();
            let result = ExcelParser.parse_to_raw_records(file.path());
            assert!(
                matches!(result, Err(ImportError::ExcelParseError(_))),
                "suffix={}",
                suffix
            );
        }
    }

    #[test]
    fn test_file_not_found_and_unsupported_format() {
        let missing = CsvParser.parse_to_raw_records(Path::new("non_existent.csv"));
        assert!(matches!(missing, Err(ImportError::FileNotFound(_))));

        let unsupported = UniversalFileParser.parse("sales.json");
        assert!(matches!(unsupported, Err(ImportError::UnsupportedFormat(_))));
    }
}
