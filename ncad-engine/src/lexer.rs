//! 单行命令的分词：命令名、逗号分隔的参数、可选的 `= &name` 后缀。

use crate::errors::LexError;

/// 分词长度限制，默认值可由配置覆盖。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_command_len: usize,
    pub max_argument_len: usize,
    pub max_arguments: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_command_len: 15,
            max_argument_len: 64,
            max_arguments: 8,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedLine {
    pub command: String,
    pub arguments: Vec<String>,
    /// `= &name` 中的 `name`，不含类型符号。
    pub assignment: Option<String>,
}

impl ParsedLine {
    /// 空行或纯注释行。
    #[inline]
    pub fn is_blank(&self) -> bool {
        self.command.is_empty()
    }
}

/// 去掉 `#` 之后的注释内容。
pub fn strip_comment(line: &str) -> &str {
    line.split_once('#').map_or(line, |(head, _)| head)
}

pub fn parse_line(line: &str, limits: &Limits) -> Result<ParsedLine, LexError> {
    let content = strip_comment(line).trim();
    let mut parsed = ParsedLine::default();
    if content.is_empty() {
        return Ok(parsed);
    }

    let (command, rest) = match content.find(char::is_whitespace) {
        Some(pos) => content.split_at(pos),
        None => (content, ""),
    };
    if command.chars().count() > limits.max_command_len {
        return Err(LexError::CommandTooLong {
            limit: limits.max_command_len,
        });
    }
    parsed.command = command.to_string();

    let (arguments, assignment) = match rest.split_once('=') {
        Some((arguments, assignment)) => (arguments, Some(assignment)),
        None => (rest, None),
    };
    parsed.arguments = split_arguments(arguments, limits)?;
    if let Some(text) = assignment {
        parsed.assignment = Some(parse_assignment(text)?);
    }

    Ok(parsed)
}

fn split_arguments(text: &str, limits: &Limits) -> Result<Vec<String>, LexError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(Vec::new());
    }

    // 允许末尾多一个逗号。
    let text = text.strip_suffix(',').unwrap_or(text);
    let mut arguments = Vec::new();
    for (position, raw) in text.split(',').enumerate() {
        let index = position + 1;
        let argument = raw.trim();
        if argument.is_empty() {
            return Err(LexError::EmptyArgument { index });
        }
        if arguments.len() == limits.max_arguments {
            return Err(LexError::TooManyArguments {
                limit: limits.max_arguments,
            });
        }
        if argument.chars().count() > limits.max_argument_len {
            return Err(LexError::ArgumentTooLong {
                index,
                limit: limits.max_argument_len,
            });
        }
        arguments.push(argument.to_string());
    }
    Ok(arguments)
}

fn parse_assignment(text: &str) -> Result<String, LexError> {
    let text = text.trim_start();
    let mut chars = text.chars();
    match chars.next() {
        Some('&') => {}
        Some(found) => return Err(LexError::InvalidAssignment { found }),
        None => return Err(LexError::MissingAssignment),
    }

    let rest = chars.as_str();
    let (name, trailing) = match rest.find(char::is_whitespace) {
        Some(pos) => rest.split_at(pos),
        None => (rest, ""),
    };
    if name.is_empty() {
        return Err(LexError::MissingAssignment);
    }
    let trailing = trailing.trim();
    if !trailing.is_empty() {
        return Err(LexError::TrailingInput {
            rest: trailing.to_string(),
        });
    }
    Ok(name.to_string())
}
