//! 类型化变量表与参数中的变量替换。
//!
//! 三种类型符号：`$` 定值、`@` 坐标、`&` 对象引用。名称共享同一命名空间，
//! 定义后不可重定义；`^` 为保留名，始终指向最近创建的图元。

use std::collections::BTreeMap;

use ncad_core::document::{Document, ObjectIndex};
use ncad_core::geometry::Coordinate;
use tracing::trace;

use crate::coords::{parse_coordinates, to_literal};
use crate::errors::VariableError;

/// 保留的「最近创建对象」变量名。
pub const LAST_OBJECT: &str = "^";

/// 替换循环的最大轮数。
pub const MAX_SUBSTITUTION_PASSES: usize = 32;

/// 不做变量替换的命令，参数按字面传给处理器。
pub const VERBATIM_COMMANDS: [&str; 2] = ["inspect", "set"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sigil {
    Fixed,
    Coord,
    Object,
}

impl Sigil {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '$' => Some(Sigil::Fixed),
            '@' => Some(Sigil::Coord),
            '&' => Some(Sigil::Object),
            _ => None,
        }
    }

    #[inline]
    pub fn as_char(self) -> char {
        match self {
            Sigil::Fixed => '$',
            Sigil::Coord => '@',
            Sigil::Object => '&',
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Sigil::Fixed => "Fixed Value",
            Sigil::Coord => "Coordinate",
            Sigil::Object => "Object",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VariableValue {
    Fixed(f64),
    Coord(Coordinate),
    Object(ObjectIndex),
}

impl VariableValue {
    #[inline]
    pub fn sigil(&self) -> Sigil {
        match self {
            VariableValue::Fixed(_) => Sigil::Fixed,
            VariableValue::Coord(_) => Sigil::Coord,
            VariableValue::Object(_) => Sigil::Object,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub value: VariableValue,
}

/// 替换结果：替换后的文本与替换次数。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    pub text: String,
    pub count: usize,
}

#[derive(Debug, Default)]
pub struct VariableStore {
    variables: BTreeMap<String, Variable>,
    last_object: Option<Variable>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// 按名称排序遍历用户定义的变量（不含 `^`）。
    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.variables.values()
    }

    pub fn get(&self, name: &str) -> Option<&Variable> {
        if name == LAST_OBJECT {
            return self.last_object.as_ref();
        }
        self.variables.get(name)
    }

    #[inline]
    pub fn last_object(&self) -> Option<ObjectIndex> {
        match self.last_object {
            Some(Variable {
                value: VariableValue::Object(index),
                ..
            }) => Some(index),
            _ => None,
        }
    }

    pub fn set_last_object(&mut self, index: ObjectIndex) {
        self.last_object = Some(Variable {
            name: LAST_OBJECT.to_string(),
            value: VariableValue::Object(index),
        });
    }

    /// 检查名称是否合法且尚未被占用。
    pub fn check_available(&self, name: &str) -> Result<(), VariableError> {
        validate_name(name)?;
        if name == LAST_OBJECT || self.variables.contains_key(name) {
            return Err(VariableError::AlreadyExists {
                name: name.to_string(),
            });
        }
        Ok(())
    }

    /// 解析 `<sigil><name>` 形式的声明后调用 [`VariableStore::set`]。
    pub fn set_declaration(
        &mut self,
        declaration: &str,
        raw: &str,
        document: &Document,
    ) -> Result<&Variable, VariableError> {
        let mut chars = declaration.chars();
        let first = chars.next().ok_or_else(|| VariableError::InvalidName {
            name: declaration.to_string(),
        })?;
        let sigil = Sigil::from_char(first).ok_or_else(|| VariableError::InvalidSigil {
            sigil: first,
            text: declaration.to_string(),
        })?;
        self.set(sigil, chars.as_str(), raw, document)
    }

    pub fn set(
        &mut self,
        sigil: Sigil,
        name: &str,
        raw: &str,
        document: &Document,
    ) -> Result<&Variable, VariableError> {
        if name == LAST_OBJECT {
            if sigil != Sigil::Object {
                return Err(VariableError::InvalidName {
                    name: name.to_string(),
                });
            }
            let index = parse_object_index(raw, document)?;
            self.set_last_object(index);
            return self.get(LAST_OBJECT).ok_or_else(|| VariableError::NotFound {
                name: LAST_OBJECT.to_string(),
            });
        }

        self.check_available(name)?;
        let value = match sigil {
            Sigil::Fixed => VariableValue::Fixed(raw.trim().parse().map_err(|_| {
                VariableError::InvalidFixed {
                    name: name.to_string(),
                    value: raw.to_string(),
                }
            })?),
            Sigil::Coord => VariableValue::Coord(parse_coordinates(raw, None).map_err(
                |source| VariableError::InvalidCoord {
                    name: name.to_string(),
                    source,
                },
            )?),
            Sigil::Object => VariableValue::Object(parse_object_index(raw, document)?),
        };
        Ok(self.insert(name, value))
    }

    /// 将图元索引绑定到新名称，调用方已保证索引有效。
    pub fn bind_object(&mut self, name: &str, index: ObjectIndex) -> Result<&Variable, VariableError> {
        self.check_available(name)?;
        Ok(self.insert(name, VariableValue::Object(index)))
    }

    fn insert(&mut self, name: &str, value: VariableValue) -> &Variable {
        trace!(name, sigil = %value.sigil().as_char(), "已定义变量");
        self.variables
            .entry(name.to_string())
            .or_insert(Variable {
                name: name.to_string(),
                value,
            })
    }

    /// 变量的替换文本。`coord_index` 仅对对象变量有效，选择其第几个坐标。
    pub fn string_value(
        &self,
        name: &str,
        coord_index: usize,
        document: &Document,
    ) -> Result<String, VariableError> {
        let variable = self.get(name).ok_or_else(|| VariableError::NotFound {
            name: name.to_string(),
        })?;

        match variable.value {
            VariableValue::Fixed(value) => Ok(format!("{value:.6}")),
            VariableValue::Coord(coordinate) => Ok(to_literal(coordinate)),
            VariableValue::Object(index) => {
                let object = document
                    .object(index)
                    .ok_or(VariableError::UnknownObject { index })?;
                let coordinate = object.coordinates.get(coord_index).ok_or_else(|| {
                    VariableError::IndexOutOfRange {
                        name: name.to_string(),
                        index: coord_index,
                        count: object.coordinates.len(),
                    }
                })?;
                Ok(to_literal(*coordinate))
            }
        }
    }

    /// 把参数中的变量引用替换为其文本值，直至不再出现引用。
    ///
    /// `inspect` 与 `set` 的参数保持原样。
    pub fn substitute(
        &self,
        command: &str,
        text: &str,
        document: &Document,
    ) -> Result<Substitution, VariableError> {
        let mut current = text.to_string();
        let mut count = 0;
        if VERBATIM_COMMANDS.contains(&command) {
            return Ok(Substitution {
                text: current,
                count,
            });
        }

        for _ in 0..MAX_SUBSTITUTION_PASSES {
            let segments = split_segments(&current)?;
            let references = segments
                .iter()
                .filter(|segment| matches!(segment, Segment::Reference { .. }))
                .count();
            if references == 0 {
                return Ok(Substitution {
                    text: current,
                    count,
                });
            }

            let mut rendered = String::with_capacity(current.len());
            for segment in &segments {
                match segment {
                    Segment::Literal(literal) => rendered.push_str(literal),
                    Segment::Reference { name, index } => {
                        rendered.push_str(&self.string_value(name, *index, document)?);
                    }
                }
            }
            count += references;
            current = rendered;
        }

        Err(VariableError::SubstitutionDepth {
            limit: MAX_SUBSTITUTION_PASSES,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment<'a> {
    Literal(&'a str),
    Reference { name: &'a str, index: usize },
}

#[inline]
fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '^'
}

fn validate_name(name: &str) -> Result<(), VariableError> {
    if name.is_empty() || !name.chars().all(is_name_char) {
        return Err(VariableError::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(())
}

fn parse_object_index(raw: &str, document: &Document) -> Result<ObjectIndex, VariableError> {
    let index: ObjectIndex = raw
        .trim()
        .parse()
        .map_err(|_| VariableError::InvalidObjectIndex {
            value: raw.to_string(),
        })?;
    if document.object(index).is_none() {
        return Err(VariableError::UnknownObject { index });
    }
    Ok(index)
}

/// 将文本切分为字面量片段与 `<sigil><name>[<index>]` 引用片段。
fn split_segments(text: &str) -> Result<Vec<Segment<'_>>, VariableError> {
    let mut segments = Vec::new();
    let mut literal_start = 0;
    let mut cursor = 0;

    while let Some(offset) = text[cursor..].find(|c: char| Sigil::from_char(c).is_some()) {
        let sigil_pos = cursor + offset;
        let name_start = sigil_pos + 1;
        let name_end = text[name_start..]
            .find(|c: char| !is_name_char(c))
            .map_or(text.len(), |pos| name_start + pos);
        let name = &text[name_start..name_end];
        if name.is_empty() {
            return Err(VariableError::InvalidName {
                name: text[sigil_pos..name_start].to_string(),
            });
        }

        let (index, reference_end) = match text[name_end..].strip_prefix('[') {
            Some(rest) => {
                let digits = rest
                    .find(|c: char| !c.is_ascii_digit())
                    .unwrap_or(rest.len());
                let closed = rest[digits..].starts_with(']');
                let index = rest[..digits].parse::<usize>().ok().filter(|_| closed);
                match index {
                    Some(index) => (index, name_end + 1 + digits + 1),
                    None => {
                        return Err(VariableError::UnterminatedIndex {
                            name: name.to_string(),
                            text: text.to_string(),
                        });
                    }
                }
            }
            None => (0, name_end),
        };

        if literal_start < sigil_pos {
            segments.push(Segment::Literal(&text[literal_start..sigil_pos]));
        }
        segments.push(Segment::Reference { name, index });
        literal_start = reference_end;
        cursor = reference_end;
    }

    if literal_start < text.len() {
        segments.push(Segment::Literal(&text[literal_start..]));
    }
    Ok(segments)
}
