/// 成功执行的原始命令行（含空行与注释行），按执行顺序追加。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    lines: Vec<String>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// `list` 命令的输出：每行 `NNN: <line>`，序号从 1 开始。
    pub fn render(&self) -> String {
        self.lines
            .iter()
            .enumerate()
            .map(|(i, line)| format!("{:03}: {}", i + 1, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
