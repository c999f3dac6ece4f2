// ==========================================
// 需求计划系统 - 导入层
// ==========================================
// 职责: 外部历史实绩导入（核心之外唯一读文件的位置）
// 支持: Excel, CSV
// ==========================================

pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod historical_importer;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use field_mapper::FieldMapper;
pub use file_parser::{CsvParser, ExcelParser, FileParser, RawRow, UniversalFileParser};
pub use historical_importer::HistoricalImporter;
