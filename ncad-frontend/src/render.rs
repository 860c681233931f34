//! 渲染适配层：把文档交给 [`Canvas`] 实现绘制，渲染端只读。

use std::fmt::Write as _;
use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};

use ncad_core::document::{Dimension, Document, PrimitiveKind};
use ncad_core::geometry::{Color, Coordinate};
use ncad_engine::shared::SharedInterpreter;
use tracing::{debug, info, warn};

use crate::errors::FrontendError;

/// 绘图后端需要实现的最小接口。
pub trait Canvas {
    fn set_color(&mut self, color: Color);
    fn draw_line(&mut self, start: Coordinate, end: Coordinate);
    fn draw_rect(&mut self, corner: Coordinate, opposite: Coordinate);

    /// 圆只保存圆心与圆上一点，默认不绘制。
    fn draw_circle(&mut self, center: Coordinate, point: Coordinate) {
        debug!(%center, %point, "当前画布未实现圆的绘制");
    }

    /// 默认绘制标注线与两条尺寸界线。
    fn draw_dimension(&mut self, dimension: &Dimension) {
        self.draw_line(dimension.line_start, dimension.line_end);
        self.draw_line(dimension.measured_start, dimension.line_start);
        self.draw_line(dimension.measured_end, dimension.line_end);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub objects: usize,
    pub dimensions: usize,
    pub layer_fallbacks: usize,
}

/// 绘制整个文档。引用不存在图层的元素回退到 0 号图层并记录警告。
pub fn render_document(document: &Document, canvas: &mut impl Canvas) -> RenderStats {
    let mut stats = RenderStats::default();

    for (index, object) in document.objects().iter().enumerate() {
        if !apply_layer(document, object.layer_id, canvas) {
            warn!(index, layer_id = object.layer_id, "图元引用的图层不存在，改用 0 号图层");
            stats.layer_fallbacks += 1;
        }

        let points = &object.coordinates;
        match object.kind {
            PrimitiveKind::Line => {
                for pair in points.windows(2) {
                    canvas.draw_line(pair[0], pair[1]);
                }
            }
            PrimitiveKind::Rect => {
                if let &[corner, opposite] = points.as_slice() {
                    canvas.draw_rect(corner, opposite);
                }
            }
            PrimitiveKind::Circle => {
                if let &[center, point] = points.as_slice() {
                    canvas.draw_circle(center, point);
                }
            }
        }
        stats.objects += 1;
    }

    for (index, dimension) in document.dimensions().iter().enumerate() {
        if !apply_layer(document, dimension.layer_id, canvas) {
            warn!(index, layer_id = dimension.layer_id, "尺寸标注引用的图层不存在，改用 0 号图层");
            stats.layer_fallbacks += 1;
        }
        canvas.draw_dimension(dimension);
        stats.dimensions += 1;
    }

    stats
}

/// 设置图层颜色，返回图层是否按原 ID 找到。
fn apply_layer(document: &Document, layer_id: u8, canvas: &mut impl Canvas) -> bool {
    match document.layer_or_default(layer_id) {
        Some((layer, fell_back)) => {
            canvas.set_color(layer.color);
            !fell_back
        }
        None => false,
    }
}

/// 把绘制调用记录为文本，供无图形环境与测试使用。
#[derive(Debug, Default)]
pub struct TextCanvas {
    output: String,
}

impl TextCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn into_output(self) -> String {
        self.output
    }

    fn record(&mut self, args: std::fmt::Arguments<'_>) {
        let _ = self.output.write_fmt(args);
        self.output.push('\n');
    }
}

impl Canvas for TextCanvas {
    fn set_color(&mut self, color: Color) {
        self.record(format_args!(
            "color #{:02x}{:02x}{:02x}",
            color.r, color.g, color.b
        ));
    }

    fn draw_line(&mut self, start: Coordinate, end: Coordinate) {
        self.record(format_args!("line {start} -> {end}"));
    }

    fn draw_rect(&mut self, corner: Coordinate, opposite: Coordinate) {
        self.record(format_args!("rect {corner} -> {opposite}"));
    }

    fn draw_circle(&mut self, center: Coordinate, point: Coordinate) {
        self.record(format_args!("circle {center} -> {point}"));
    }
}

enum RenderSignal {
    Frame,
    Shutdown,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderReport {
    pub frames: usize,
    pub last_frame: Option<String>,
    pub last_stats: RenderStats,
}

/// 独立的渲染线程。每次请求在持锁状态下完成一整次绘制。
pub struct RenderWorker {
    sender: Sender<RenderSignal>,
    handle: JoinHandle<RenderReport>,
}

impl RenderWorker {
    pub fn spawn(shared: SharedInterpreter) -> Self {
        let (sender, receiver) = mpsc::channel();
        let handle = thread::spawn(move || {
            let mut report = RenderReport::default();
            while let Ok(RenderSignal::Frame) = receiver.recv() {
                let mut canvas = TextCanvas::new();
                let stats = shared.read(|scene| render_document(scene.document(), &mut canvas));
                report.frames += 1;
                report.last_stats = stats;
                report.last_frame = Some(canvas.into_output());
                debug!(frame = report.frames, objects = stats.objects, "已完成一帧渲染");
            }
            report
        });
        info!("渲染线程已启动");
        Self { sender, handle }
    }

    pub fn request_frame(&self) {
        if self.sender.send(RenderSignal::Frame).is_err() {
            warn!("渲染线程已退出，忽略渲染请求");
        }
    }

    /// 处理完已排队的请求后结束线程并返回统计。
    pub fn finish(self) -> Result<RenderReport, FrontendError> {
        let _ = self.sender.send(RenderSignal::Shutdown);
        self.handle.join().map_err(|_| FrontendError::RenderThread)
    }
}
