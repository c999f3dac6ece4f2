// ==========================================
// 需求计划系统 - 领域类型定义
// ==========================================
// 依据: 目录（Catalog）- 产品 / 产品组 / 预测指标
// 红线: 目录为封闭集合,顺序即展示顺序
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 产品 (Product)
// ==========================================
// 声明顺序 = 目录顺序 = 展示顺序（Ord 依赖此顺序）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Product {
    Agriculture,
    Mesh,
    Nails,
    Stucco,
    Wire,
}

impl Product {
    /// 目录中的全部产品（按展示顺序）
    pub const ALL: [Product; 5] = [
        Product::Agriculture,
        Product::Mesh,
        Product::Nails,
        Product::Stucco,
        Product::Wire,
    ];

    /// 在目录中的下标
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(&self) -> &'static str {
        match self {
            Product::Agriculture => "Agriculture",
            Product::Mesh => "Mesh",
            Product::Nails => "Nails",
            Product::Stucco => "Stucco",
            Product::Wire => "Wire",
        }
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Product {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Product::ALL
            .iter()
            .copied()
            .find(|p| p.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("未知产品: {}", wanted))
    }
}

// ==========================================
// 产品组 (Product Group)
// ==========================================
// 每个产品共享同一组产品组,仅作为拆分维度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ProductGroup {
    #[serde(rename = "Rebar Tie Wire")]
    RebarTieWire,
    #[serde(rename = "Bright Annealed Wire")]
    BrightAnnealedWire,
    #[serde(rename = "Galvanized Wire")]
    GalvanizedWire,
    #[serde(rename = "Bar Ties")]
    BarTies,
    #[serde(rename = "Mesh Panels")]
    MeshPanels,
}

impl ProductGroup {
    pub const ALL: [ProductGroup; 5] = [
        ProductGroup::RebarTieWire,
        ProductGroup::BrightAnnealedWire,
        ProductGroup::GalvanizedWire,
        ProductGroup::BarTies,
        ProductGroup::MeshPanels,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProductGroup::RebarTieWire => "Rebar Tie Wire",
            ProductGroup::BrightAnnealedWire => "Bright Annealed Wire",
            ProductGroup::GalvanizedWire => "Galvanized Wire",
            ProductGroup::BarTies => "Bar Ties",
            ProductGroup::MeshPanels => "Mesh Panels",
        }
    }
}

impl fmt::Display for ProductGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for ProductGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ProductGroup::ALL
            .iter()
            .copied()
            .find(|g| g.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("未知产品组: {}", wanted))
    }
}

// ==========================================
// 预测指标 (Metric)
// ==========================================
// 仅在预测期间内有意义
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Metric {
    Backlog,
    Forecast,
    Absolute,
    #[serde(rename = "Final Forecast")]
    FinalForecast,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::Backlog,
        Metric::Forecast,
        Metric::Absolute,
        Metric::FinalForecast,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(&self) -> &'static str {
        match self {
            Metric::Backlog => "Backlog",
            Metric::Forecast => "Forecast",
            Metric::Absolute => "Absolute",
            Metric::FinalForecast => "Final Forecast",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        // 兼容 "FinalForecast" / "final_forecast" 写法
        let compact: String = wanted
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_')
            .collect();
        Metric::ALL
            .iter()
            .copied()
            .find(|m| {
                m.label().eq_ignore_ascii_case(wanted)
                    || m.label().replace(' ', "").eq_ignore_ascii_case(&compact)
            })
            .ok_or_else(|| format!("未知预测指标: {}", wanted))
    }
}

// ==========================================
// 期间类型 (Period Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PeriodKind {
    Historical, // 历史实绩
    Forecast,   // 滚动预测
}

impl fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodKind::Historical => write!(f, "HISTORICAL"),
            PeriodKind::Forecast => write!(f, "FORECAST"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_order_is_display_order() {
        let labels: Vec<&str> = Product::ALL.iter().map(|p| p.label()).collect();
        assert_eq!(labels, vec!["Agriculture", "Mesh", "Nails", "Stucco", "Wire"]);
        assert!(Product::Agriculture < Product::Wire);
        for (idx, p) in Product::ALL.iter().enumerate() {
            assert_eq!(p.index(), idx);
        }
    }

    #[test]
    fn test_parse_labels() {
        assert_eq!("mesh".parse::<Product>().unwrap(), Product::Mesh);
        assert_eq!(
            " Bright Annealed Wire ".parse::<ProductGroup>().unwrap(),
            ProductGroup::BrightAnnealedWire
        );
        assert_eq!("Final Forecast".parse::<Metric>().unwrap(), Metric::FinalForecast);
        assert_eq!("final_forecast".parse::<Metric>().unwrap(), Metric::FinalForecast);
        assert!("Rope".parse::<Product>().is_err());
    }

    #[test]
    fn test_serde_uses_display_labels() {
        let json = serde_json::to_string(&ProductGroup::RebarTieWire).unwrap();
        assert_eq!(json, "\"Rebar Tie Wire\"");
        let metric: Metric = serde_json::from_str("\"Final Forecast\"").unwrap();
        assert_eq!(metric, Metric::FinalForecast);
    }
}
