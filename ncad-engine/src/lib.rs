pub mod command;
pub mod coords;
pub mod dimensions;
pub mod embed;
pub mod history;
pub mod inspect;
pub mod interpreter;
pub mod layers;
pub mod lexer;
pub mod objects;
pub mod shared;
pub mod units;
pub mod variables;

pub mod errors {
    use thiserror::Error;

    /// 行结构错误：命令过长、参数过多、对象变量后缀格式不对等。
    #[derive(Debug, Clone, PartialEq, Error)]
    pub enum LexError {
        #[error("command maximum character limit exceeded (max {limit})")]
        CommandTooLong { limit: usize },
        #[error("maximum number of arguments exceeded (max {limit})")]
        TooManyArguments { limit: usize },
        #[error("maximum argument character size exceeded on argument number {index} (max {limit})")]
        ArgumentTooLong { index: usize, limit: usize },
        #[error("argument number {index} is empty")]
        EmptyArgument { index: usize },
        #[error("unknown first character for an object variable '{found}'")]
        InvalidAssignment { found: char },
        #[error("missing object variable name after '='")]
        MissingAssignment,
        #[error("unexpected input after the object variable: '{rest}'")]
        TrailingInput { rest: String },
    }

    #[derive(Debug, Clone, PartialEq, Error)]
    pub enum UnitError {
        #[error("invalid character found while trying to parse a number: '{found}' in '{text}'")]
        InvalidNumberChar { found: char, text: String },
        #[error("invalid character found while trying to parse a unit: '{found}' in '{text}'")]
        InvalidUnitChar { found: char, text: String },
        #[error("missing numeric value in '{text}'")]
        MissingNumber { text: String },
        #[error("invalid number '{number}'")]
        InvalidNumber { number: String },
        #[error("invalid unit: {unit}")]
        UnknownUnit { unit: String },
        #[error("value '{text}' is out of range")]
        OutOfRange { text: String },
    }

    #[derive(Debug, Clone, PartialEq, Error)]
    pub enum CoordError {
        #[error("empty coordinate")]
        Empty,
        #[error("unknown first coordinate letter '{found}' in '{text}'")]
        UnknownLeading { found: char, text: String },
        #[error("unknown next argument start for coordinate '{found}' in '{text}'")]
        ExpectedY { found: char, text: String },
        #[error("coordinate '{text}' is missing its y section")]
        MissingY { text: String },
        #[error("relative coordinate '{text}' needs a base coordinate")]
        MissingBase { text: String },
        #[error("coordinate '{text}' is out of range")]
        OutOfRange { text: String },
        #[error(transparent)]
        Unit(#[from] UnitError),
    }

    #[derive(Debug, Clone, PartialEq, Error)]
    pub enum VariableError {
        #[error("variable '{name}' not found")]
        NotFound { name: String },
        #[error("variable '{name}' already exists, can't set a new value")]
        AlreadyExists { name: String },
        #[error("invalid variable type '{sigil}' in '{text}'")]
        InvalidSigil { sigil: char, text: String },
        #[error("invalid variable name '{name}'")]
        InvalidName { name: String },
        #[error(
            "variable '&{name}[{index}]' index is greater than the maximum allowed for this type of object: {count}"
        )]
        IndexOutOfRange {
            name: String,
            index: usize,
            count: usize,
        },
        #[error("variable '{name}' index ending not found in '{text}'")]
        UnterminatedIndex { name: String, text: String },
        #[error("couldn't parse object index '{value}' when assigning object to variable")]
        InvalidObjectIndex { value: String },
        #[error("object #{index} does not exist")]
        UnknownObject { index: usize },
        #[error("invalid fixed value '{value}' for variable '{name}'")]
        InvalidFixed { name: String, value: String },
        #[error("invalid coordinate for variable '{name}': {source}")]
        InvalidCoord {
            name: String,
            #[source]
            source: CoordError,
        },
        #[error("variable substitution did not settle after {limit} passes")]
        SubstitutionDepth { limit: usize },
    }

    #[derive(Debug, Clone, PartialEq, Error)]
    pub enum LayerError {
        #[error("can't alter any parameters of the 0 layer, the 0 layer is read-only")]
        ReadOnlyDefault,
        #[error("invalid layer number '{text}'")]
        InvalidId { text: String },
        #[error("invalid hexadecimal character '{found}' in '{text}'")]
        InvalidHexDigit { found: char, text: String },
        #[error("color '{text}' must have exactly 6 hexadecimal digits")]
        InvalidColorLength { text: String },
        #[error("layer name can't be empty")]
        EmptyName,
        #[error("layer {id} not found")]
        NotFound { id: u8 },
        #[error("no free layer number left after {last}")]
        TableFull { last: u8 },
    }

    #[derive(Debug, Clone, PartialEq, Error)]
    pub enum CommandError {
        #[error("unknown command '{name}'")]
        Unknown { name: String },
        #[error("'{command}' expects {expected} arguments, got {found}")]
        ArgumentCount {
            command: String,
            expected: &'static str,
            found: usize,
        },
        #[error("'{command}' does not accept an object variable assignment")]
        UnexpectedAssignment { command: String },
        #[error("invalid layer modifier '{text}'")]
        InvalidLayerModifier { text: String },
        #[error("unknown dimension offset direction: '{text}'")]
        UnknownDirection { text: String },
        #[error("can't offset a dimension over a zero-length segment")]
        DegenerateDimension,
        #[error("dimension offset moves the line out of range")]
        OffsetOutOfRange,
        #[error("'{kind}' needs {expected} coordinate pairs, got {found}")]
        CoordinatePairs {
            kind: &'static str,
            expected: &'static str,
            found: usize,
        },
    }

    /// 单行处理可能出现的全部错误，均可恢复：调用方报告后继续处理下一行。
    #[derive(Debug, Clone, PartialEq, Error)]
    pub enum EngineError {
        #[error(transparent)]
        Lex(#[from] LexError),
        #[error(transparent)]
        Unit(#[from] UnitError),
        #[error(transparent)]
        Coord(#[from] CoordError),
        #[error(transparent)]
        Variable(#[from] VariableError),
        #[error(transparent)]
        Layer(#[from] LayerError),
        #[error(transparent)]
        Command(#[from] CommandError),
    }

    impl EngineError {
        /// 错误类别名称，便于日志与诊断输出。
        pub fn kind(&self) -> &'static str {
            match self {
                EngineError::Lex(_) => "LexError",
                EngineError::Unit(_) => "UnitError",
                EngineError::Coord(_) => "CoordError",
                EngineError::Variable(_) => "VariableError",
                EngineError::Layer(_) => "LayerError",
                EngineError::Command(_) => "CommandError",
            }
        }
    }
}

pub mod scene {
    use ncad_core::document::{Document, Layer, ObjectIndex, Primitive, PrimitiveKind};
    use ncad_core::geometry::Color;
    use tracing::debug;

    use crate::dimensions::{self, DimensionMode};
    use crate::errors::EngineError;
    use crate::history::History;
    use crate::layers;
    use crate::objects;
    use crate::variables::{Substitution, Variable, VariableStore};

    /// 引擎会话状态：文档容器、变量表与历史记录。所有操作显式作用于该结构，没有全局状态。
    #[derive(Debug, Default)]
    pub struct Scene {
        document: Document,
        variables: VariableStore,
        history: History,
    }

    impl Scene {
        pub fn new() -> Self {
            Self {
                document: Document::new(),
                variables: VariableStore::new(),
                history: History::new(),
            }
        }

        #[inline]
        pub fn document(&self) -> &Document {
            &self.document
        }

        #[inline]
        pub fn variables(&self) -> &VariableStore {
            &self.variables
        }

        #[inline]
        pub fn history(&self) -> &History {
            &self.history
        }

        pub(crate) fn record_line(&mut self, line: &str) {
            self.history.push(line);
        }

        /// 按命令参数创建图元，返回其在对象容器中的索引。
        pub fn create_object(
            &mut self,
            kind: PrimitiveKind,
            args: &[String],
            assignment: Option<&str>,
        ) -> Result<ObjectIndex, EngineError> {
            let primitive = objects::build_primitive(kind, args)?;
            self.insert_object(primitive, assignment)
        }

        /// 追加图元并更新 `^`；若给出 `&name` 则同时绑定。名称冲突在写入前检查，保证失败时场景不变。
        pub fn insert_object(
            &mut self,
            primitive: Primitive,
            assignment: Option<&str>,
        ) -> Result<ObjectIndex, EngineError> {
            if let Some(name) = assignment {
                self.variables.check_available(name)?;
            }

            let kind = primitive.kind;
            let layer_id = primitive.layer_id;
            let index = self.document.add_object(primitive);
            self.variables.set_last_object(index);
            if let Some(name) = assignment {
                self.variables.bind_object(name, index)?;
            }

            debug!(index, kind = kind.command_name(), layer_id, "已创建图元");
            Ok(index)
        }

        pub fn create_dimension(
            &mut self,
            args: &[String],
            mode: DimensionMode,
        ) -> Result<usize, EngineError> {
            let dimension = dimensions::build_dimension(args, mode)?;
            let index = self.document.add_dimension(dimension);
            debug!(index, ?mode, layer_id = dimension.layer_id, "已创建尺寸标注");
            Ok(index)
        }

        /// `set` 命令：`declaration` 为带类型符号的变量名，`raw` 为未替换的原始值。
        pub fn set_variable(&mut self, declaration: &str, raw: &str) -> Result<&Variable, EngineError> {
            let variable = self
                .variables
                .set_declaration(declaration, raw, &self.document)?;
            Ok(variable)
        }

        pub fn define_layer(
            &mut self,
            id_text: &str,
            name: &str,
            hex_color: &str,
        ) -> Result<Layer, EngineError> {
            let id = layers::parse_layer_id(id_text)?;
            let layer = layers::create_or_update(&mut self.document, id, name, hex_color)?;
            Ok(layer)
        }

        /// 以「最后图层 ID + 1」追加新图层。
        pub fn create_layer(&mut self, layer_name: &str, color: Color) -> Result<Layer, EngineError> {
            Ok(layers::create_next(&mut self.document, layer_name, color)?)
        }

        pub fn substitute(&self, command: &str, text: &str) -> Result<Substitution, EngineError> {
            Ok(self.variables.substitute(command, text, &self.document)?)
        }
    }

}
