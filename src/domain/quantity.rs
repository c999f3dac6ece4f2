// ==========================================
// 需求计划系统 - 数量值对象
// ==========================================
// 职责: 原始输入解析、一位小数舍入、汇总值、随机取数区间
// 红线: 解析失败按 0 计入汇总,原始字符串原样保留
// ==========================================

use crate::domain::error::DomainError;
use rand::Rng;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// 指数位移上限（超过后必然溢出或归零）
const MAX_EXPONENT_STEPS: u64 = 64;

/// Decimal 最多保留的小数位
const MAX_FRACTION_DIGITS: usize = 28;

// ==========================================
// 原始输入解析
// ==========================================

/// 单元格原始字符串的解析结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedQuantity {
    /// 可解析的数值
    Value(Decimal),
    /// 无前导数字（"", "-", "abc"）,汇总时按 0
    Unparseable,
    /// "Infinity" 或超出 Decimal 表示范围
    NonFinite,
}

/// 宽松解析: 取最长的前导数字串
///
/// 规则:
/// - 跳过前导空白
/// - `[+-]? (digits [. digits?] | . digits) ([eE] [+-]? digits)?`
/// - "12abc" → 12, "1." → 1, ".5" → 0.5
/// - "-" / "abc" / "" → Unparseable
/// - "Infinity" / "-Infinity" → NonFinite
///
/// 数值本身有限但超出 Decimal 表示范围（约 ±7.9e28,如 "1e30" 或 30 位整数）
/// 同样返回 NonFinite,汇总为非有限值,图表上该点无值。
/// 低于最小精度的极小值（"1e-400"）归零。
pub fn parse_quantity(raw: &str) -> ParsedQuantity {
    let text = raw.trim_start();
    let (negative, body) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    if body.starts_with("Infinity") {
        return ParsedQuantity::NonFinite;
    }

    let bytes = body.as_bytes();
    let digits_from = |start: usize| {
        let mut end = start;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
        end
    };

    // 整数部分
    let int_end = digits_from(0);
    let int_digits = &body[..int_end];
    let mut pos = int_end;

    // 小数部分
    let mut frac_digits = "";
    if pos < bytes.len() && bytes[pos] == b'.' {
        let frac_end = digits_from(pos + 1);
        frac_digits = &body[pos + 1..frac_end];
        if !int_digits.is_empty() || !frac_digits.is_empty() {
            pos = frac_end;
        }
    }

    if int_digits.is_empty() && frac_digits.is_empty() {
        return ParsedQuantity::Unparseable;
    }

    // 指数部分（不完整的指数不消费,例如 "3e" → 3）
    let mut exponent: i64 = 0;
    if pos < bytes.len() && (bytes[pos] == b'e' || bytes[pos] == b'E') {
        let mut cursor = pos + 1;
        let mut exp_negative = false;
        if cursor < bytes.len() && (bytes[cursor] == b'+' || bytes[cursor] == b'-') {
            exp_negative = bytes[cursor] == b'-';
            cursor += 1;
        }
        let exp_end = digits_from(cursor);
        if exp_end > cursor {
            let magnitude = body[cursor..exp_end].parse::<i64>().unwrap_or(i64::MAX);
            exponent = if exp_negative { -magnitude } else { magnitude };
        }
    }

    let int_part = match int_digits.trim_start_matches('0') {
        "" => "0",
        digits => digits,
    };
    let frac_part = match frac_digits {
        "" => "0",
        digits => &digits[..digits.len().min(MAX_FRACTION_DIGITS)],
    };
    let mantissa_text = format!(
        "{}{}.{}",
        if negative { "-" } else { "" },
        int_part,
        frac_part
    );

    match Decimal::from_str(&mantissa_text) {
        Ok(mantissa) => shift_by_power_of_ten(mantissa, exponent),
        Err(_) => ParsedQuantity::NonFinite,
    }
}

fn shift_by_power_of_ten(mut value: Decimal, exponent: i64) -> ParsedQuantity {
    if value.is_zero() || exponent == 0 {
        return ParsedQuantity::Value(value);
    }

    let steps = exponent.unsigned_abs().min(MAX_EXPONENT_STEPS);
    for _ in 0..steps {
        if exponent > 0 {
            match value.checked_mul(Decimal::TEN) {
                Some(v) => value = v,
                None => return ParsedQuantity::NonFinite,
            }
        } else {
            // 除以 10 不会上溢,失败只可能是精度耗尽
            match value.checked_div(Decimal::TEN) {
                Some(v) if !v.is_zero() => value = v,
                _ => return ParsedQuantity::Value(Decimal::ZERO),
            }
        }
    }
    ParsedQuantity::Value(value)
}

// ==========================================
// 舍入
// ==========================================

/// 舍入到一位小数（四舍五入,远离零）,固定 scale=1
pub fn round_tenths(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        rounded = Decimal::ZERO;
    }
    rounded.rescale(1);
    rounded
}

// ==========================================
// 汇总值 (Total Value)
// ==========================================

/// 汇总结果
///
/// `NonFinite` 仅在原始输入表示非有限值或求和超出 Decimal 范围时出现,
/// 序列化为 `null`。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalValue {
    Finite(Decimal),
    NonFinite,
}

impl TotalValue {
    pub fn zero() -> Self {
        TotalValue::Finite(round_tenths(Decimal::ZERO))
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            TotalValue::Finite(v) => Some(*v),
            TotalValue::NonFinite => None,
        }
    }

    pub fn is_finite(&self) -> bool {
        matches!(self, TotalValue::Finite(_))
    }

    /// 两个汇总值相加；任一非有限或溢出则为非有限
    pub fn checked_add(self, other: TotalValue) -> TotalValue {
        match (self, other) {
            (TotalValue::Finite(a), TotalValue::Finite(b)) => a
                .checked_add(b)
                .map(TotalValue::Finite)
                .unwrap_or(TotalValue::NonFinite),
            _ => TotalValue::NonFinite,
        }
    }
}

impl fmt::Display for TotalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TotalValue::Finite(v) => write!(f, "{}", v),
            TotalValue::NonFinite => write!(f, "NaN"),
        }
    }
}

impl Serialize for TotalValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TotalValue::Finite(v) => Serialize::serialize(v, serializer),
            TotalValue::NonFinite => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for TotalValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<Decimal>::deserialize(deserializer)? {
            Some(v) => TotalValue::Finite(v),
            None => TotalValue::NonFinite,
        })
    }
}

/// 对一组原始单元格求和
///
/// 缺失 / 无法解析按 0；先以完整精度求和,最后只舍入一次。
pub fn sum_raw_cells<'a, I>(cells: I) -> TotalValue
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut total = Decimal::ZERO;
    for raw in cells.into_iter().flatten() {
        match parse_quantity(raw) {
            ParsedQuantity::Value(v) => match total.checked_add(v) {
                Some(sum) => total = sum,
                None => return TotalValue::NonFinite,
            },
            ParsedQuantity::Unparseable => {}
            ParsedQuantity::NonFinite => return TotalValue::NonFinite,
        }
    }
    TotalValue::Finite(round_tenths(total))
}

// ==========================================
// 随机取数区间 (Quantity Range)
// ==========================================

/// 半开区间 [min, max),边界最多一位小数
///
/// 构造时同时记录以 0.1 为单位的整数边界,取数时不再换算。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RangeBounds", into = "RangeBounds")]
pub struct QuantityRange {
    min: Decimal,
    max: Decimal,
    low_tenths: i64,
    high_tenths: i64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RangeBounds {
    min: Decimal,
    max: Decimal,
}

impl QuantityRange {
    /// 校验并构造区间
    ///
    /// 边界须非负、min < max、落在一位小数网格上,
    /// 且换算成 0.1 的个数后能放进 i64。
    pub fn new(min: Decimal, max: Decimal) -> Result<Self, DomainError> {
        let invalid = || DomainError::InvalidRange { min, max };
        if min.is_sign_negative() || min >= max {
            return Err(invalid());
        }
        let low_tenths = to_tenths(min).ok_or_else(invalid)?;
        let high_tenths = to_tenths(max).ok_or_else(invalid)?;
        Ok(Self {
            min,
            max,
            low_tenths,
            high_tenths,
        })
    }

    fn from_tenths(low_tenths: i64, high_tenths: i64) -> Self {
        Self {
            min: Decimal::new(low_tenths, 1),
            max: Decimal::new(high_tenths, 1),
            low_tenths,
            high_tenths,
        }
    }

    /// 历史实绩默认区间 [10.0, 110.0)
    pub fn default_sales() -> Self {
        Self::from_tenths(100, 1100)
    }

    /// 样例预测默认区间 [5.0, 55.0)
    pub fn default_sample() -> Self {
        Self::from_tenths(50, 550)
    }

    pub fn min(&self) -> Decimal {
        self.min
    }

    pub fn max(&self) -> Decimal {
        self.max
    }

    pub fn contains(&self, value: Decimal) -> bool {
        value >= self.min && value < self.max
    }

    /// 在一位小数网格上均匀取值
    ///
    /// 直接抽取整数个 0.1,结果必然落在 [min, max) 内。
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Decimal {
        Decimal::new(rng.gen_range(self.low_tenths..self.high_tenths), 1)
    }
}

/// 换算成 0.1 的整数个数；不在网格上或超出 i64 时为 None
fn to_tenths(value: Decimal) -> Option<i64> {
    let tenths = value.checked_mul(Decimal::TEN)?;
    if !tenths.fract().is_zero() {
        return None;
    }
    tenths.to_i64()
}

impl TryFrom<RangeBounds> for QuantityRange {
    type Error = DomainError;

    fn try_from(bounds: RangeBounds) -> Result<Self, Self::Error> {
        QuantityRange::new(bounds.min, bounds.max)
    }
}

impl From<QuantityRange> for RangeBounds {
    fn from(range: QuantityRange) -> Self {
        RangeBounds {
            min: range.min,
            max: range.max,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_plain_and_partial_input() {
        assert_eq!(parse_quantity("20"), ParsedQuantity::Value(dec("20")));
        assert_eq!(parse_quantity("1."), ParsedQuantity::Value(dec("1")));
        assert_eq!(parse_quantity(".5"), ParsedQuantity::Value(dec("0.5")));
        assert_eq!(parse_quantity("  -2.25"), ParsedQuantity::Value(dec("-2.25")));
        assert_eq!(parse_quantity("12abc"), ParsedQuantity::Value(dec("12")));
        assert_eq!(parse_quantity("3e"), ParsedQuantity::Value(dec("3")));
    }

    #[test]
    fn test_parse_unparseable_input() {
        for raw in ["", "-", "abc", ".", "+", "e5", " "] {
            assert_eq!(parse_quantity(raw), ParsedQuantity::Unparseable, "raw={:?}", raw);
        }
    }

    #[test]
    fn test_parse_exponent_and_non_finite() {
        assert_eq!(parse_quantity("1.5e2"), ParsedQuantity::Value(dec("150")));
        assert_eq!(parse_quantity("25E-1"), ParsedQuantity::Value(dec("2.5")));
        assert_eq!(parse_quantity("1e400"), ParsedQuantity::NonFinite);
        assert_eq!(parse_quantity("-Infinity"), ParsedQuantity::NonFinite);
        assert_eq!(parse_quantity("1e-400"), ParsedQuantity::Value(Decimal::ZERO));
    }

    #[test]
    fn test_round_tenths_fixed_scale() {
        assert_eq!(round_tenths(dec("25")).to_string(), "25.0");
        assert_eq!(round_tenths(dec("0.05")).to_string(), "0.1");
        assert_eq!(round_tenths(dec("-0.04")).to_string(), "0.0");
        assert_eq!(round_tenths(dec("12.349")).to_string(), "12.3");
    }

    #[test]
    fn test_sum_treats_absent_and_malformed_as_zero() {
        let total = sum_raw_cells(vec![Some("20"), None, Some("abc"), Some("5"), Some("-")]);
        assert_eq!(total, TotalValue::Finite(dec("25.0")));
    }

    #[test]
    fn test_sum_rounds_once_at_the_end() {
        // 0.04 * 3 = 0.12 → 0.1；逐个舍入会得到 0.0
        let total = sum_raw_cells(vec![Some("0.04"), Some("0.04"), Some("0.04")]);
        assert_eq!(total, TotalValue::Finite(dec("0.1")));
    }

    #[test]
    fn test_sum_non_finite_propagates() {
        let total = sum_raw_cells(vec![Some("1"), Some("Infinity")]);
        assert_eq!(total, TotalValue::NonFinite);
        assert_eq!(serde_json::to_string(&total).unwrap(), "null");
    }

    #[test]
    fn test_finite_total_serializes_as_decimal_string() {
        let total = sum_raw_cells(vec![Some("20"), Some("5")]);
        assert_eq!(serde_json::to_string(&total).unwrap(), "\"25.0\"");

        let back: TotalValue = serde_json::from_str("\"25.0\"").unwrap();
        assert_eq!(back, total);
    }

    #[test]
    fn test_parse_beyond_decimal_range_is_non_finite() {
        assert_eq!(parse_quantity("1e30"), ParsedQuantity::NonFinite);
        assert_eq!(
            parse_quantity("123456789012345678901234567890"),
            ParsedQuantity::NonFinite
        );
        // 上限附近仍可表示
        assert!(matches!(parse_quantity("1e27"), ParsedQuantity::Value(_)));
    }

    #[test]
    fn test_range_validation_and_sampling() {
        assert!(QuantityRange::new(dec("10"), dec("10")).is_err());
        assert!(QuantityRange::new(dec("-1"), dec("10")).is_err());
        assert!(QuantityRange::new(dec("1.25"), dec("10")).is_err());
        // 以 0.1 计超出 i64
        assert!(matches!(
            QuantityRange::new(dec("10.0"), dec("1000000000000000000.0")),
            Err(DomainError::InvalidRange { .. })
        ));
        assert!(QuantityRange::new(dec("10.0"), dec("922337203685477580.7")).is_ok());

        let range = QuantityRange::new(dec("5.0"), dec("55.0")).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let v = range.sample(&mut rng);
            assert!(range.contains(v), "v={}", v);
            assert_eq!(v.scale(), 1);
        }
    }

    #[test]
    fn test_range_deserialize_validates() {
        let ok: QuantityRange = serde_json::from_str(r#"{"min": "10.0", "max": "110.0"}"#).unwrap();
        assert_eq!(ok.max(), dec("110"));
        assert_eq!(ok, QuantityRange::default_sales());
        let bad = serde_json::from_str::<QuantityRange>(r#"{"min": "9", "max": "3"}"#);
        assert!(bad.is_err());
    }
}
