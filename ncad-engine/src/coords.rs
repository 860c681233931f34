//! 坐标字面量解析：绝对 `x<n>;y<n>` 与相对 `w<n>` / `h<n>`。

use ncad_core::geometry::Coordinate;

use crate::errors::CoordError;
use crate::units::to_base_unit;

/// 解析单个坐标。`w`/`h` 形式相对于 `base` 偏移，缺少基准点时报错。
///
/// 坐标内部的空白被忽略，`x0; y0` 与 `x0;y0` 等价。
pub fn parse_coordinates(text: &str, base: Option<Coordinate>) -> Result<Coordinate, CoordError> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let text = compact.as_str();
    let mut chars = text.chars();
    match chars.next() {
        None => Err(CoordError::Empty),
        Some('x') => parse_absolute(text, chars.as_str()),
        Some(axis @ ('w' | 'h')) => {
            let delta = to_base_unit(chars.as_str())?;
            let base = base.ok_or_else(|| CoordError::MissingBase {
                text: text.to_string(),
            })?;
            let moved = match axis {
                'w' => base.checked_translate(delta, 0),
                _ => base.checked_translate(0, delta),
            };
            moved.ok_or_else(|| CoordError::OutOfRange {
                text: text.to_string(),
            })
        }
        Some(found) => Err(CoordError::UnknownLeading {
            found,
            text: text.to_string(),
        }),
    }
}

fn parse_absolute(text: &str, rest: &str) -> Result<Coordinate, CoordError> {
    let Some((x_part, y_section)) = rest.split_once(';') else {
        return Err(CoordError::MissingY {
            text: text.to_string(),
        });
    };

    let mut y_chars = y_section.chars();
    match y_chars.next() {
        Some('y') => {}
        Some(found) => {
            return Err(CoordError::ExpectedY {
                found,
                text: text.to_string(),
            });
        }
        None => {
            return Err(CoordError::MissingY {
                text: text.to_string(),
            });
        }
    }

    let x = to_base_unit(x_part)?;
    let y = to_base_unit(y_chars.as_str())?;
    Ok(Coordinate::new(x, y))
}

/// 坐标的字面量形式，可被 [`parse_coordinates`] 原样解析回来。
pub fn to_literal(coordinate: Coordinate) -> String {
    format!("x{};y{}", coordinate.x(), coordinate.y())
}
