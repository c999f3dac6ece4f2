// ==========================================
// 需求计划系统 - 历史实绩导入器
// ==========================================
// 职责: 从 CSV / Excel 读取历史实绩,作为随机生成之外的另一种种子来源
// 流程: 文件解析 → 字段映射 → 返回记录（完整性校验由 HistoricalSalesStore 负责）
// ==========================================

use crate::domain::historical::HistoricalRecord;
use crate::importer::error::ImportResult;
use crate::importer::field_mapper::FieldMapper;
use crate::importer::file_parser::{CsvParser, RawRow, UniversalFileParser};
use std::io::Read;
use std::path::Path;
use tracing::instrument;

pub struct HistoricalImporter {
    parser: UniversalFileParser,
    mapper: FieldMapper,
}

impl HistoricalImporter {
    pub fn new() -> Self {
        Self {
            parser: UniversalFileParser,
            mapper: FieldMapper,
        }
    }

    /// 从文件导入（按扩展名选择 CSV / Excel）
    #[instrument(skip(self, file_path), fields(path = %file_path.as_ref().display()))]
    pub fn import_file<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<Vec<HistoricalRecord>> {
        let rows = self.parser.parse(file_path)?;
        self.map_rows(&rows)
    }

    /// 从 CSV 输入流导入（例如标准输入）
    pub fn import_csv<R: Read>(&self, input: R) -> ImportResult<Vec<HistoricalRecord>> {
        let rows = CsvParser.parse_reader(input)?;
        self.map_rows(&rows)
    }

    fn map_rows(&self, rows: &[RawRow]) -> ImportResult<Vec<HistoricalRecord>> {
        let records = rows
            .iter()
            .enumerate()
            .map(|(idx, row)| self.mapper.map_historical(row, idx + 1))
            .collect::<ImportResult<Vec<_>>>()?;

        tracing::info!(rows = records.len(), "历史实绩导入完成");
        Ok(records)
    }
}

impl Default for HistoricalImporter {
    fn default() -> Self {
        Self::new()
    }
}
