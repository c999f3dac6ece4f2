// ==========================================
// 需求计划系统 - 字段映射器
// ==========================================
// 职责: 原始行 → HistoricalRecord（列名别名 + 类型转换）
// 标准列: product / group / period / tons
// ==========================================

use crate::domain::historical::HistoricalRecord;
use crate::domain::period::Period;
use crate::domain::types::{Product, ProductGroup};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::RawRow;
use rust_decimal::Decimal;
use std::str::FromStr;

pub struct FieldMapper;

impl FieldMapper {
    /// 映射一行；row_number 从 1 开始（不含表头）
    pub fn map_historical(&self, row: &RawRow, row_number: usize) -> ImportResult<HistoricalRecord> {
        let product = self.parse_field::<Product>(row, "product", row_number)?;
        let group = self.parse_field::<ProductGroup>(row, "group", row_number)?;
        let period = self.parse_field::<Period>(row, "period", row_number)?;

        let tons_text = self.required(row, "tons", row_number)?;
        let tons = Decimal::from_str(&tons_text).map_err(|e| ImportError::TypeConversionError {
            row: row_number,
            field: "tons".to_string(),
            message: format!("无法解析为十进制数 {}: {}", tons_text, e),
        })?;

        Ok(HistoricalRecord {
            product,
            group,
            period,
            tons,
        })
    }

    /// 提取字符串字段,支持多个可能的列名（别名,大小写不敏感）
    fn get_string(&self, row: &RawRow, key: &str) -> Option<String> {
        let aliases: &[&str] = match key {
            "product" => &["product", "产品"],
            "group" => &["group", "product_group", "product group", "产品组"],
            "period" => &["period", "month", "期间", "月份"],
            "tons" => &["tons", "quantity", "sales", "吨位", "销量"],
            _ => &[],
        };

        row.iter()
            .find(|(header, value)| {
                !value.trim().is_empty()
                    && aliases.iter().any(|alias| header.trim().eq_ignore_ascii_case(alias))
            })
            .map(|(_, value)| value.trim().to_string())
    }

    fn required(&self, row: &RawRow, key: &str, row_number: usize) -> ImportResult<String> {
        self.get_string(row, key)
            .ok_or_else(|| ImportError::FieldMappingError {
                row: row_number,
                message: format!("缺少字段: {}", key),
            })
    }

    fn parse_field<T>(&self, row: &RawRow, key: &str, row_number: usize) -> ImportResult<T>
    where
        T: FromStr<Err = String>,
    {
        let text = self.required(row, key, row_number)?;
        text.parse::<T>().map_err(|message| ImportError::TypeConversionError {
            row: row_number,
            field: key.to_string(),
            message,
        })
    }
}
