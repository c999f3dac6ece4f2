// ==========================================
// 需求计划系统 - API层错误类型
// ==========================================
// 职责: 汇聚领域/导入/配置错误,对外暴露统一错误类型
// 说明: 单元格解析失败不是错误（按 0 参与汇总）,不会出现在这里
// ==========================================

use crate::config::ConfigError;
use crate::domain::error::DomainError;
use crate::importer::error::ImportError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    /// 领域错误（键越界、目录构造失败、历史实绩不完整等）
    #[error("领域错误: {0}")]
    Domain(#[from] DomainError),

    /// 历史实绩导入失败
    #[error("导入失败: {0}")]
    Import(#[from] ImportError),

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// API层Result类型
pub type ApiResult<T> = Result<T, ApiError>;
