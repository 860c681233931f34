//! 供嵌入式扩展语言调用的函数接口。
//!
//! 所有调用都返回 [`CallOutcome`]，失败时附带可读消息，不向调用方抛出错误类型。

use ncad_core::document::{Layer, LayerId, ObjectIndex, Primitive, PrimitiveKind};
use ncad_core::geometry::{Color, Coordinate};
use tracing::warn;

use crate::errors::{CommandError, EngineError, LayerError};
use crate::scene::Scene;

#[derive(Debug, Clone, PartialEq)]
pub struct CallOutcome<T> {
    pub success: bool,
    pub message: Option<String>,
    pub value: Option<T>,
}

impl<T> CallOutcome<T> {
    fn from_result(result: Result<T, EngineError>) -> Self {
        match result {
            Ok(value) => Self {
                success: true,
                message: None,
                value: Some(value),
            },
            Err(err) => {
                warn!(error = %err, "扩展调用失败");
                Self {
                    success: false,
                    message: Some(err.to_string()),
                    value: None,
                }
            }
        }
    }
}

pub struct EmbedApi<'a> {
    scene: &'a mut Scene,
}

impl<'a> EmbedApi<'a> {
    pub fn new(scene: &'a mut Scene) -> Self {
        Self { scene }
    }

    /// 由坐标对创建图元：`line` 至少两对，`rect`/`circle` 恰好两对。图层为 0。
    pub fn create_object(
        &mut self,
        kind: PrimitiveKind,
        pairs: &[(i64, i64)],
    ) -> CallOutcome<ObjectIndex> {
        let result = check_pairs(kind, pairs.len()).and_then(|_| {
            let coordinates = pairs.iter().map(|&(x, y)| Coordinate::new(x, y)).collect();
            self.scene.insert_object(Primitive::new(kind, coordinates), None)
        });
        CallOutcome::from_result(result)
    }

    pub fn layer(&self, id: LayerId) -> CallOutcome<Layer> {
        let result: Result<Layer, EngineError> = self
            .scene
            .document()
            .layer(id)
            .cloned()
            .ok_or_else(|| LayerError::NotFound { id }.into());
        CallOutcome::from_result(result)
    }

    pub fn create_layer(&mut self, name: &str, color: Color) -> CallOutcome<Layer> {
        CallOutcome::from_result(self.scene.create_layer(name, color))
    }
}

fn check_pairs(kind: PrimitiveKind, found: usize) -> Result<(), EngineError> {
    let (valid, expected) = match kind {
        PrimitiveKind::Line => (found >= 2, "at least 2"),
        PrimitiveKind::Rect | PrimitiveKind::Circle => (found == 2, "exactly 2"),
    };
    if valid {
        return Ok(());
    }
    Err(CommandError::CoordinatePairs {
        kind: kind.command_name(),
        expected,
        found,
    }
    .into())
}
