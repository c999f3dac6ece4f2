// ==========================================
// 需求计划系统 - 展开选择状态
// ==========================================
// 互斥选择: 同一时刻最多展开一个产品
// ==========================================

use crate::domain::types::Product;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionState {
    expanded: Option<Product>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 切换展开状态
    ///
    /// 与当前展开产品相同则收起,否则替换为该产品（其余产品隐式收起）。
    pub fn toggle(&mut self, product: Product) -> Option<Product> {
        self.expanded = match self.expanded {
            Some(current) if current == product => None,
            _ => Some(product),
        };
        self.expanded
    }

    pub fn expanded(&self) -> Option<Product> {
        self.expanded
    }

    pub fn is_expanded(&self, product: Product) -> bool {
        self.expanded == Some(product)
    }
}
