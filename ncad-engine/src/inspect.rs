//! `inspect` 的结构化文本输出。

use std::fmt::Write;

use ncad_core::document::{Document, Layer, ObjectIndex, Primitive};

use crate::coords::to_literal;
use crate::layers::parse_layer_id;
use crate::variables::{Sigil, Variable, VariableStore, VariableValue};

/// 查询结果。找不到目标不是错误，只是不记入历史。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inspection {
    Report(String),
    Missing(String),
}

/// 按 `<sigil><name>` 或 `l<id>` 查询变量或图层。
///
/// `&<数字>` 在没有同名变量时按对象容器索引查询。
pub fn inspect(target: &str, variables: &VariableStore, document: &Document) -> Inspection {
    let mut chars = target.chars();
    let Some(kind) = chars.next() else {
        return Inspection::Missing("Nothing to inspect.".to_string());
    };
    let name = chars.as_str();

    match kind {
        'l' => match parse_layer_id(name).ok().and_then(|id| document.layer(id)) {
            Some(layer) => Inspection::Report(describe_layer(layer)),
            None => Inspection::Missing(format!("Layer '{name}' not found.")),
        },
        sigil if Sigil::from_char(sigil).is_some() => {
            if let Some(variable) = variables.get(name) {
                return Inspection::Report(describe_variable(variable, variables, document));
            }
            let object = (sigil == '&')
                .then(|| name.parse::<ObjectIndex>().ok())
                .flatten()
                .and_then(|index| document.object(index).map(|object| (index, object)));
            match object {
                Some((index, object)) => Inspection::Report(format!(
                    "Object #{index}:\n{}",
                    describe_object(object, document)
                )),
                None => Inspection::Missing(format!("Variable '{sigil}{name}' not found.")),
            }
        }
        other => Inspection::Missing(format!("Invalid type of thing to inspect: '{other}'.")),
    }
}

pub fn describe_layer(layer: &Layer) -> String {
    format!(
        "Layer {} '{}':\n    Color: RGB({}, {}, {})\n    Alpha: {}",
        layer.id, layer.name, layer.color.r, layer.color.g, layer.color.b, layer.color.alpha
    )
}

pub fn describe_object(object: &Primitive, document: &Document) -> String {
    let mut out = format!(
        "Object Type: {} - {}\nCoordinates ({} total):",
        object.kind.type_code(),
        object.kind.command_name(),
        object.coordinates.len()
    );
    for (i, coordinate) in object.coordinates.iter().enumerate() {
        let _ = write!(out, "\n    {i}. {coordinate}");
    }

    match document.layer_or_default(object.layer_id) {
        Some((layer, false)) => {
            let _ = write!(out, "\n{}", describe_layer(layer));
        }
        Some((layer, true)) => {
            let _ = write!(
                out,
                "\nLayer {} not found, using:\n{}",
                object.layer_id,
                describe_layer(layer)
            );
        }
        None => {
            let _ = write!(out, "\nLayer {} not found.", object.layer_id);
        }
    }
    out
}

pub fn describe_variable(variable: &Variable, variables: &VariableStore, document: &Document) -> String {
    let sigil = variable.value.sigil();
    let mut out = format!(
        "Variable Type: {} - {}\nName: {} - Value: ",
        sigil.as_char(),
        sigil.label(),
        variable.name
    );

    match variable.value {
        VariableValue::Fixed(value) => {
            let _ = write!(out, "{value:.6} - String: {value:.6}");
        }
        VariableValue::Coord(coordinate) => {
            let _ = write!(out, "{coordinate} - String: {}", to_literal(coordinate));
        }
        VariableValue::Object(index) => match document.object(index) {
            Some(object) => {
                out.push_str(&describe_object(object, document));
                out.push_str("\nString Representation:");
                for i in 0..object.coordinates.len() {
                    if let Ok(text) = variables.string_value(&variable.name, i, document) {
                        let _ = write!(out, "\n&{}[{i}] -> {text}", variable.name);
                    }
                }
            }
            None => {
                let _ = write!(out, "object #{index} (missing)");
            }
        },
    }
    out
}
