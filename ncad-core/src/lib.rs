pub mod geometry {
    use std::fmt;

    use glam::{DVec2, I64Vec2};
    use serde::{Deserialize, Serialize};

    /// 二维坐标，基准单位为毫米，内部以 `glam::I64Vec2` 表示。
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Coordinate(pub I64Vec2);

    impl Coordinate {
        #[inline]
        pub fn new(x: i64, y: i64) -> Self {
            Self(I64Vec2::new(x, y))
        }

        #[inline]
        pub fn x(self) -> i64 {
            self.0.x
        }

        #[inline]
        pub fn y(self) -> i64 {
            self.0.y
        }

        /// 平移坐标；任一分量溢出时返回 `None`。
        #[inline]
        pub fn checked_translate(self, dx: i64, dy: i64) -> Option<Self> {
            Some(Self::new(self.0.x.checked_add(dx)?, self.0.y.checked_add(dy)?))
        }

        /// 从当前点指向 `other` 的差值，溢出时返回 `None`。
        #[inline]
        pub fn checked_delta_to(self, other: Coordinate) -> Option<I64Vec2> {
            Some(I64Vec2::new(
                other.0.x.checked_sub(self.0.x)?,
                other.0.y.checked_sub(self.0.y)?,
            ))
        }

        #[inline]
        pub fn as_dvec2(self) -> DVec2 {
            self.0.as_dvec2()
        }
    }

    impl From<I64Vec2> for Coordinate {
        fn from(value: I64Vec2) -> Self {
            Self(value)
        }
    }

    impl fmt::Display for Coordinate {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "({}, {})", self.x(), self.y())
        }
    }

    /// RGBA 颜色。
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Color {
        pub r: u8,
        pub g: u8,
        pub b: u8,
        pub alpha: u8,
    }

    impl Color {
        #[inline]
        pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
            Self::rgba(r, g, b, 255)
        }

        #[inline]
        pub const fn rgba(r: u8, g: u8, b: u8, alpha: u8) -> Self {
            Self { r, g, b, alpha }
        }
    }

    impl Default for Color {
        fn default() -> Self {
            Self::rgb(255, 255, 255)
        }
    }
}

pub mod document {
    use serde::{Deserialize, Serialize};

    use crate::geometry::{Color, Coordinate};

    pub type LayerId = u8;
    pub type ObjectIndex = usize;

    pub const DEFAULT_LAYER_ID: LayerId = 0;
    pub const DEFAULT_LAYER_NAME: &str = "Default";
    pub const DEFAULT_LAYER_COLOR: Color = Color::rgb(0xf9, 0xf9, 0xf9);

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Layer {
        pub id: LayerId,
        pub name: String,
        pub color: Color,
    }

    impl Layer {
        #[inline]
        pub fn new(id: LayerId, name: impl Into<String>, color: Color) -> Self {
            Self {
                id,
                name: name.into(),
                color,
            }
        }
    }

    /// 图元类型。数值编码沿用命令表顺序（line=1, rect=2, circle=3）。
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum PrimitiveKind {
        Line,
        Rect,
        Circle,
    }

    impl PrimitiveKind {
        pub const ALL: [PrimitiveKind; 3] =
            [PrimitiveKind::Line, PrimitiveKind::Rect, PrimitiveKind::Circle];

        pub fn from_command(command: &str) -> Option<Self> {
            Self::ALL
                .into_iter()
                .find(|kind| kind.command_name() == command)
        }

        #[inline]
        pub fn command_name(self) -> &'static str {
            match self {
                PrimitiveKind::Line => "line",
                PrimitiveKind::Rect => "rect",
                PrimitiveKind::Circle => "circle",
            }
        }

        #[inline]
        pub fn type_code(self) -> u8 {
            match self {
                PrimitiveKind::Line => 1,
                PrimitiveKind::Rect => 2,
                PrimitiveKind::Circle => 3,
            }
        }
    }

    /// 基础图元。创建后仅图层可在同一命令内被修饰参数改写。
    ///
    /// `Circle` 只保存「圆心 + 圆上一点」两个坐标，几何含义留给渲染端扩展。
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Primitive {
        pub kind: PrimitiveKind,
        pub layer_id: LayerId,
        pub coordinates: Vec<Coordinate>,
    }

    impl Primitive {
        pub fn new(kind: PrimitiveKind, coordinates: Vec<Coordinate>) -> Self {
            Self {
                kind,
                layer_id: DEFAULT_LAYER_ID,
                coordinates,
            }
        }

        #[inline]
        pub fn with_layer(mut self, layer_id: LayerId) -> Self {
            self.layer_id = layer_id;
            self
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Dimension {
        pub measured_start: Coordinate,
        pub measured_end: Coordinate,
        pub line_start: Coordinate,
        pub line_end: Coordinate,
        pub layer_id: LayerId,
    }

    /// 场景数据容器：图层表、图元与尺寸标注，三者均只追加不删除。
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Document {
        layers: Vec<Layer>,
        objects: Vec<Primitive>,
        dimensions: Vec<Dimension>,
    }

    impl Document {
        pub fn new() -> Self {
            Self {
                layers: vec![Layer::new(
                    DEFAULT_LAYER_ID,
                    DEFAULT_LAYER_NAME,
                    DEFAULT_LAYER_COLOR,
                )],
                objects: Vec::new(),
                dimensions: Vec::new(),
            }
        }

        #[inline]
        pub fn layers(&self) -> impl Iterator<Item = &Layer> {
            self.layers.iter()
        }

        #[inline]
        pub fn layer_count(&self) -> usize {
            self.layers.len()
        }

        pub fn layer(&self, id: LayerId) -> Option<&Layer> {
            self.layers.iter().find(|layer| layer.id == id)
        }

        pub fn layer_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
            self.layers.iter_mut().find(|layer| layer.id == id)
        }

        /// 表中最大的图层 ID。
        pub fn max_layer_id(&self) -> LayerId {
            self.layers
                .iter()
                .map(|layer| layer.id)
                .max()
                .unwrap_or(DEFAULT_LAYER_ID)
        }

        /// 直接追加图层，不做任何校验；校验由引擎层负责。
        pub fn push_layer(&mut self, layer: Layer) -> &Layer {
            self.layers.push(layer);
            &self.layers[self.layers.len() - 1]
        }

        /// 查找图层，找不到时退化为 0 号图层。第二个返回值表示是否发生了退化。
        pub fn layer_or_default(&self, id: LayerId) -> Option<(&Layer, bool)> {
            match self.layer(id) {
                Some(layer) => Some((layer, false)),
                None => self.layer(DEFAULT_LAYER_ID).map(|layer| (layer, true)),
            }
        }

        pub fn add_object(&mut self, object: Primitive) -> ObjectIndex {
            self.objects.push(object);
            self.objects.len() - 1
        }

        #[inline]
        pub fn object(&self, index: ObjectIndex) -> Option<&Primitive> {
            self.objects.get(index)
        }

        #[inline]
        pub fn objects(&self) -> &[Primitive] {
            &self.objects
        }

        pub fn add_dimension(&mut self, dimension: Dimension) -> usize {
            self.dimensions.push(dimension);
            self.dimensions.len() - 1
        }

        #[inline]
        pub fn dimensions(&self) -> &[Dimension] {
            &self.dimensions
        }
    }

    impl Default for Document {
        fn default() -> Self {
            Self::new()
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn segment(x1: i64, y1: i64, x2: i64, y2: i64) -> Primitive {
            Primitive::new(
                PrimitiveKind::Line,
                vec![Coordinate::new(x1, y1), Coordinate::new(x2, y2)],
            )
        }

        #[test]
        fn new_document_has_default_layer() {
            let doc = Document::new();
            let layer = doc.layer(DEFAULT_LAYER_ID).expect("layer 0 must exist");
            assert_eq!(layer.name, "Default");
            assert_eq!(layer.color, Color::rgb(0xf9, 0xf9, 0xf9));
            assert_eq!(doc.layer_count(), 1);
            assert_eq!(Document::default().layer_count(), 1);
        }

        #[test]
        fn coordinate_arithmetic_reports_overflow() {
            let origin = Coordinate::new(5, -5);
            assert_eq!(origin.checked_translate(10, 5), Some(Coordinate::new(15, 0)));
            assert_eq!(Coordinate::new(i64::MAX, 0).checked_translate(1, 0), None);
            assert_eq!(Coordinate::new(0, i64::MIN).checked_translate(0, -1), None);

            let far = Coordinate::new(i64::MAX, 0);
            assert_eq!(Coordinate::new(-1, 0).checked_delta_to(far), None);
            assert_eq!(
                origin.checked_delta_to(Coordinate::new(6, 0)),
                Some(glam::I64Vec2::new(1, 5))
            );
        }

        #[test]
        fn max_layer_id_is_not_the_last_pushed() {
            let mut doc = Document::new();
            doc.push_layer(Layer::new(5, "Five", Color::default()));
            doc.push_layer(Layer::new(4, "Four", Color::default()));
            assert_eq!(doc.max_layer_id(), 5);
        }

        #[test]
        fn object_indices_follow_insertion_order() {
            let mut doc = Document::new();
            assert_eq!(doc.add_object(segment(0, 0, 10, 0)), 0);
            assert_eq!(doc.add_object(segment(0, 0, 0, 10).with_layer(3)), 1);
            assert_eq!(doc.objects().len(), 2);
            assert_eq!(doc.object(1).map(|o| o.layer_id), Some(3));
            assert!(doc.object(2).is_none());
        }

        #[test]
        fn missing_layer_falls_back_to_default() {
            let mut doc = Document::new();
            doc.push_layer(Layer::new(2, "Walls", Color::rgb(255, 0, 0)));

            let (layer, fell_back) = doc.layer_or_default(2).unwrap();
            assert_eq!(layer.name, "Walls");
            assert!(!fell_back);

            let (layer, fell_back) = doc.layer_or_default(9).unwrap();
            assert_eq!(layer.id, DEFAULT_LAYER_ID);
            assert!(fell_back);
            assert_eq!(doc.max_layer_id(), 2);
        }

        #[test]
        fn primitive_kind_maps_command_names() {
            assert_eq!(PrimitiveKind::from_command("rect"), Some(PrimitiveKind::Rect));
            assert_eq!(PrimitiveKind::from_command("arc"), None);
            assert_eq!(PrimitiveKind::Circle.type_code(), 3);
        }
    }
}
