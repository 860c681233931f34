//! 尺寸标注：`dimen` 直接给出标注线端点，`odimen` 由方向与偏移距离推算。

use glam::{DVec2, I64Vec2};
use ncad_core::document::{DEFAULT_LAYER_ID, Dimension};
use ncad_core::geometry::Coordinate;

use crate::coords::parse_coordinates;
use crate::errors::{CommandError, EngineError};
use crate::objects::take_layer_modifier;
use crate::units::to_base_unit;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimensionMode {
    Explicit,
    Offset,
}

impl DimensionMode {
    pub fn command_name(self) -> &'static str {
        match self {
            DimensionMode::Explicit => "dimen",
            DimensionMode::Offset => "odimen",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    UpLeft,
    UpRight,
    DownLeft,
    DownRight,
}

impl Direction {
    /// 从文本开头识别方向码，返回方向与剩余部分（可能是距离）。
    pub fn split_prefix(text: &str) -> Option<(Self, &str)> {
        const CODES: [(&str, Direction); 8] = [
            ("ul", Direction::UpLeft),
            ("ur", Direction::UpRight),
            ("dl", Direction::DownLeft),
            ("dr", Direction::DownRight),
            ("u", Direction::Up),
            ("d", Direction::Down),
            ("l", Direction::Left),
            ("r", Direction::Right),
        ];
        CODES
            .iter()
            .find_map(|(code, direction)| text.strip_prefix(code).map(|rest| (*direction, rest)))
    }
}

pub fn build_dimension(args: &[String], mode: DimensionMode) -> Result<Dimension, EngineError> {
    let command = mode.command_name();
    let positional = match mode {
        DimensionMode::Explicit => 4,
        DimensionMode::Offset => 3,
    };
    let (positionals, layer) = take_layer_modifier(args, positional)?;
    let count_error = || CommandError::ArgumentCount {
        command: command.to_string(),
        expected: match mode {
            DimensionMode::Explicit => "4 or 5",
            DimensionMode::Offset => "3 to 5",
        },
        found: args.len(),
    };

    let (measured, line_spec) = match positionals {
        [start, end, rest @ ..] => ([start, end], rest),
        _ => return Err(count_error().into()),
    };
    let measured_start = parse_coordinates(measured[0], None)?;
    let measured_end = parse_coordinates(measured[1], None)?;

    let (line_start, line_end) = match (mode, line_spec) {
        (DimensionMode::Explicit, [line_start, line_end]) => (
            parse_coordinates(line_start, None)?,
            parse_coordinates(line_end, None)?,
        ),
        (DimensionMode::Offset, [combined]) => {
            let (direction, distance) = parse_direction(combined)?;
            offset_line(measured_start, measured_end, direction, to_base_unit(distance)?)?
        }
        (DimensionMode::Offset, [code, distance]) => {
            let (direction, rest) = parse_direction(code)?;
            if !rest.is_empty() {
                return Err(CommandError::UnknownDirection { text: code.clone() }.into());
            }
            offset_line(measured_start, measured_end, direction, to_base_unit(distance)?)?
        }
        _ => return Err(count_error().into()),
    };

    Ok(Dimension {
        measured_start,
        measured_end,
        line_start,
        line_end,
        layer_id: layer.unwrap_or(DEFAULT_LAYER_ID),
    })
}

fn parse_direction(text: &str) -> Result<(Direction, &str), CommandError> {
    Direction::split_prefix(text).ok_or_else(|| CommandError::UnknownDirection {
        text: text.to_string(),
    })
}

/// 计算偏移标注线端点。
///
/// 先将被测线段规范为从左到右、从上到下的方向，以此求单位方向向量（分量四舍五入为整数），
/// 再把偏移量施加到原始端点上。
pub fn offset_line(
    start: Coordinate,
    end: Coordinate,
    direction: Direction,
    offset: i64,
) -> Result<(Coordinate, Coordinate), CommandError> {
    let vertical = start.x() == end.x() && start.y() != end.y();
    let (ostart, oend) = match vertical {
        true if start.y() > end.y() => (start, end),
        true => (end, start),
        false if start.x() < end.x() => (start, end),
        false => (end, start),
    };

    let delta: I64Vec2 = oend
        .checked_delta_to(ostart)
        .ok_or(CommandError::OffsetOutOfRange)?;
    let length = delta.as_dvec2().length().round();
    if length == 0.0 {
        return Err(CommandError::DegenerateDimension);
    }
    let unit: DVec2 = delta.as_dvec2() / length;
    let ux = unit.x.round_ties_even() as i64;
    let uy = unit.y.round_ties_even() as i64;

    let scaled = |factor: i64| offset.checked_mul(factor);
    let shift = match direction {
        Direction::Up => Some(0).zip(scaled(-ux)),
        Direction::UpLeft | Direction::UpRight => scaled(uy).zip(scaled(-ux)),
        Direction::Down => Some(0).zip(scaled(ux)),
        Direction::DownLeft | Direction::DownRight => scaled(-uy).zip(scaled(ux)),
        Direction::Right => scaled(uy).zip(Some(0)),
        Direction::Left => scaled(-uy).zip(Some(0)),
    };
    let (dx, dy) = shift.ok_or(CommandError::OffsetOutOfRange)?;
    start
        .checked_translate(dx, dy)
        .zip(end.checked_translate(dx, dy))
        .ok_or(CommandError::OffsetOutOfRange)
}
