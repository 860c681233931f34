//! 图层表维护：定义/更新图层、十六进制颜色与图层修饰参数解析。

use ncad_core::document::{DEFAULT_LAYER_ID, Document, Layer, LayerId};
use ncad_core::geometry::Color;
use tracing::{debug, info};

use crate::errors::LayerError;

/// 新建图层默认使用的颜色。
pub const NEW_LAYER_COLOR: Color = Color::rgb(255, 255, 255);

pub fn parse_layer_id(text: &str) -> Result<LayerId, LayerError> {
    let text = text.trim();
    if text.is_empty() || !text.chars().all(|c| c.is_ascii_digit()) {
        return Err(LayerError::InvalidId {
            text: text.to_string(),
        });
    }
    text.parse().map_err(|_| LayerError::InvalidId {
        text: text.to_string(),
    })
}

/// 解析 `rrggbb` 颜色，大小写均可，alpha 固定为 255。
pub fn parse_hex_color(text: &str) -> Result<Color, LayerError> {
    let digits = text
        .chars()
        .map(|c| {
            hex_value(c).ok_or_else(|| LayerError::InvalidHexDigit {
                found: c,
                text: text.to_string(),
            })
        })
        .collect::<Result<Vec<u8>, _>>()?;

    let &[r1, r0, g1, g0, b1, b0] = digits.as_slice() else {
        return Err(LayerError::InvalidColorLength {
            text: text.to_string(),
        });
    };
    Ok(Color::rgb(r1 * 16 + r0, g1 * 16 + g0, b1 * 16 + b0))
}

fn hex_value(c: char) -> Option<u8> {
    match c {
        '0'..='9' => Some(c as u8 - b'0'),
        'a'..='f' => Some(c as u8 - b'a' + 10),
        'A'..='F' => Some(c as u8 - b'A' + 10),
        _ => None,
    }
}

/// 定义或更新图层。0 号图层只读；已存在的图层原地更新，否则追加。
pub fn create_or_update(
    document: &mut Document,
    id: LayerId,
    name: &str,
    hex_color: &str,
) -> Result<Layer, LayerError> {
    if id == DEFAULT_LAYER_ID {
        return Err(LayerError::ReadOnlyDefault);
    }
    if name.is_empty() {
        return Err(LayerError::EmptyName);
    }
    let color = parse_hex_color(hex_color)?;

    if let Some(layer) = document.layer_mut(id) {
        layer.name = name.to_string();
        layer.color = color;
        debug!(id, name, "已更新图层");
        return Ok(layer.clone());
    }

    let layer = document.push_layer(Layer::new(id, name, color)).clone();
    info!(id, name, "已创建图层");
    Ok(layer)
}

/// 以现有最大图层 ID 加一追加新图层。
pub fn create_next(document: &mut Document, name: &str, color: Color) -> Result<Layer, LayerError> {
    if name.is_empty() {
        return Err(LayerError::EmptyName);
    }
    let last = document.max_layer_id();
    let id = last.checked_add(1).ok_or(LayerError::TableFull { last })?;

    let layer = document.push_layer(Layer::new(id, name, color)).clone();
    info!(id, name, "已创建图层");
    Ok(layer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_colors_case_insensitively() {
        assert_eq!(parse_hex_color("ff0000").unwrap(), Color::rgb(255, 0, 0));
        assert_eq!(parse_hex_color("00FF7f").unwrap(), Color::rgb(0, 255, 127));
        assert_eq!(parse_hex_color("ff0000").unwrap().alpha, 255);
    }

    #[test]
    fn rejects_bad_hex_colors() {
        assert!(matches!(
            parse_hex_color("ff00zz"),
            Err(LayerError::InvalidHexDigit { found: 'z', .. })
        ));
        assert!(matches!(
            parse_hex_color("fff"),
            Err(LayerError::InvalidColorLength { .. })
        ));
        assert!(matches!(
            parse_hex_color("ff00000"),
            Err(LayerError::InvalidColorLength { .. })
        ));
    }

    #[test]
    fn creates_then_updates_in_place() {
        let mut doc = Document::new();
        create_or_update(&mut doc, 1, "Walls", "ff0000").unwrap();
        create_or_update(&mut doc, 1, "Outer Walls", "00ff00").unwrap();

        assert_eq!(doc.layer_count(), 2);
        let layer = doc.layer(1).unwrap();
        assert_eq!(layer.name, "Outer Walls");
        assert_eq!(layer.color, Color::rgb(0, 255, 0));
    }

    #[test]
    fn default_layer_is_read_only() {
        let mut doc = Document::new();
        let err = create_or_update(&mut doc, 0, "Hacked", "000000").unwrap_err();
        assert_eq!(err, LayerError::ReadOnlyDefault);
        assert_eq!(doc.layer(0).unwrap().name, "Default");
    }

    #[test]
    fn parses_layer_ids() {
        assert_eq!(parse_layer_id("12").unwrap(), 12);
        assert!(parse_layer_id("256").is_err());
        assert!(parse_layer_id("-1").is_err());
        assert!(parse_layer_id("").is_err());
    }

    #[test]
    fn next_layer_skips_past_highest_id() {
        let mut doc = Document::new();
        create_or_update(&mut doc, 5, "Five", "ff0000").unwrap();
        create_or_update(&mut doc, 4, "Four", "00ff00").unwrap();
        let layer = create_next(&mut doc, "Six", NEW_LAYER_COLOR).unwrap();
        assert_eq!(layer.id, 6);
        assert_eq!(doc.layer(5).unwrap().name, "Five");
    }

    #[test]
    fn next_layer_follows_last_id() {
        let mut doc = Document::new();
        create_or_update(&mut doc, 4, "Notes", "0000ff").unwrap();
        let layer = create_next(&mut doc, "Extra", NEW_LAYER_COLOR).unwrap();
        assert_eq!(layer.id, 5);
        assert_eq!(layer.color, Color::rgb(255, 255, 255));

        create_or_update(&mut doc, 255, "Top", "ffffff").unwrap();
        assert!(matches!(
            create_next(&mut doc, "Overflow", NEW_LAYER_COLOR),
            Err(LayerError::TableFull { last: 255 })
        ));
    }
}
