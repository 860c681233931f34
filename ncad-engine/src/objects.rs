//! 图元创建命令的参数解析：`<kind> p1, p2 [, l<n>]`。

use ncad_core::document::{LayerId, Primitive, PrimitiveKind};

use crate::coords::parse_coordinates;
use crate::errors::{CommandError, EngineError};
use crate::layers::parse_layer_id;

/// 分离末尾的 `l<n>` 图层修饰参数。仅当参数数量多于 `positional` 时才识别。
pub(crate) fn take_layer_modifier<'a>(
    args: &'a [String],
    positional: usize,
) -> Result<(&'a [String], Option<LayerId>), CommandError> {
    match args.split_last() {
        Some((last, rest)) if args.len() > positional && last.starts_with('l') => {
            let id = parse_layer_id(&last[1..]).map_err(|_| CommandError::InvalidLayerModifier {
                text: last.clone(),
            })?;
            Ok((rest, Some(id)))
        }
        _ => Ok((args, None)),
    }
}

/// 由命令参数构造图元：第一个坐标为绝对坐标，第二个可相对于第一个给出。
pub fn build_primitive(kind: PrimitiveKind, args: &[String]) -> Result<Primitive, EngineError> {
    let (points, layer) = take_layer_modifier(args, 2)?;
    let [start, end] = points else {
        return Err(CommandError::ArgumentCount {
            command: kind.command_name().to_string(),
            expected: "2 or 3",
            found: args.len(),
        }
        .into());
    };

    let start = parse_coordinates(start, None)?;
    let end = parse_coordinates(end, Some(start))?;
    let primitive = Primitive::new(kind, vec![start, end]);
    Ok(match layer {
        Some(id) => primitive.with_layer(id),
        None => primitive,
    })
}
