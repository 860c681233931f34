//! 数值字面量到基准单位（毫米）的换算。

use crate::errors::UnitError;

/// 支持的单位后缀及其相对毫米的倍率；空后缀即毫米。
const I64_LIMIT: f64 = 9_223_372_036_854_775_808.0;

const UNIT_FACTORS: [(&str, f64); 4] = [("", 1.0), ("mm", 1.0), ("cm", 10.0), ("m", 1000.0)];

/// 解析形如 `<数值><单位>` 的文本，返回截断后的毫米整数。
///
/// 数值部分只允许 `[0-9+\-.]`，单位部分只允许小写字母。
/// 换算结果超出 `i64` 范围时返回 [`UnitError::OutOfRange`]。
pub fn to_base_unit(text: &str) -> Result<i64, UnitError> {
    let split = text
        .find(|c: char| c.is_ascii_lowercase())
        .unwrap_or(text.len());
    let (number, unit) = text.split_at(split);

    if let Some(found) = number.chars().find(|c| !is_number_char(*c)) {
        return Err(UnitError::InvalidNumberChar {
            found,
            text: text.to_string(),
        });
    }
    if let Some(found) = unit.chars().find(|c| !c.is_ascii_lowercase()) {
        return Err(UnitError::InvalidUnitChar {
            found,
            text: text.to_string(),
        });
    }
    if number.is_empty() {
        return Err(UnitError::MissingNumber {
            text: text.to_string(),
        });
    }

    let value: f64 = number.parse().map_err(|_| UnitError::InvalidNumber {
        number: number.to_string(),
    })?;
    let factor = unit_factor(unit)?;
    let scaled = value * factor;
    if !scaled.is_finite() {
        return Err(UnitError::InvalidNumber {
            number: number.to_string(),
        });
    }
    if scaled.abs() >= I64_LIMIT {
        return Err(UnitError::OutOfRange {
            text: text.to_string(),
        });
    }

    Ok(scaled as i64)
}

fn unit_factor(unit: &str) -> Result<f64, UnitError> {
    UNIT_FACTORS
        .iter()
        .find(|(suffix, _)| *suffix == unit)
        .map(|(_, factor)| *factor)
        .ok_or_else(|| UnitError::UnknownUnit {
            unit: unit.to_string(),
        })
}

#[inline]
fn is_number_char(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '+' | '-' | '.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_known_units() {
        assert_eq!(to_base_unit("10").unwrap(), 10);
        assert_eq!(to_base_unit("10mm").unwrap(), 10);
        assert_eq!(to_base_unit("2.5cm").unwrap(), 25);
        assert_eq!(to_base_unit("2.5m").unwrap(), 2500);
        assert_eq!(to_base_unit("-1.5cm").unwrap(), -15);
        assert_eq!(to_base_unit("+4").unwrap(), 4);
    }

    #[test]
    fn unit_scaling_is_consistent() {
        assert_eq!(to_base_unit("100cm").unwrap(), to_base_unit("1m").unwrap());
        for n in [0, 1, 7, 42, 1234] {
            assert_eq!(to_base_unit(&format!("{n}cm")).unwrap(), n * 10);
            assert_eq!(to_base_unit(&format!("{n}m")).unwrap(), n * 1000);
        }
    }

    #[test]
    fn fractional_millimetres_truncate_toward_zero() {
        assert_eq!(to_base_unit("1.9").unwrap(), 1);
        assert_eq!(to_base_unit("-1.9").unwrap(), -1);
        assert_eq!(to_base_unit("0.05cm").unwrap(), 0);
    }

    #[test]
    fn rejects_values_beyond_i64() {
        assert!(matches!(
            to_base_unit("9999999999999999999999"),
            Err(UnitError::OutOfRange { .. })
        ));
        assert!(matches!(
            to_base_unit("-99999999999999999999999"),
            Err(UnitError::OutOfRange { .. })
        ));
        assert!(matches!(
            to_base_unit("9300000000000000m"),
            Err(UnitError::OutOfRange { .. })
        ));
        assert_eq!(to_base_unit("9000000000000000000").unwrap(), 9_000_000_000_000_000_000);
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(matches!(
            to_base_unit("10km"),
            Err(UnitError::UnknownUnit { unit }) if unit == "km"
        ));
        assert!(matches!(
            to_base_unit("1 0"),
            Err(UnitError::InvalidNumberChar { found: ' ', .. })
        ));
        assert!(matches!(
            to_base_unit("10M"),
            Err(UnitError::InvalidNumberChar { found: 'M', .. })
        ));
        assert!(matches!(
            to_base_unit("10c2"),
            Err(UnitError::InvalidUnitChar { found: '2', .. })
        ));
        assert!(matches!(to_base_unit("cm"), Err(UnitError::MissingNumber { .. })));
        assert!(matches!(to_base_unit(""), Err(UnitError::MissingNumber { .. })));
        assert!(matches!(to_base_unit("1.2.3"), Err(UnitError::InvalidNumber { .. })));
        assert!(matches!(to_base_unit("-"), Err(UnitError::InvalidNumber { .. })));
    }
}
