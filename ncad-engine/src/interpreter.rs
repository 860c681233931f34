//! 逐行解释入口：分词、变量替换、分发命令、记录历史。

use tracing::{debug, trace};

use crate::command::{CommandBus, CommandContext, CommandRequest, CommandResponse};
use crate::errors::EngineError;
use crate::lexer::{self, Limits};
use crate::scene::Scene;

#[derive(Debug, Default)]
pub struct Interpreter {
    scene: Scene,
    bus: CommandBus,
    limits: Limits,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_limits(Limits::default())
    }

    pub fn with_limits(limits: Limits) -> Self {
        Self {
            scene: Scene::new(),
            bus: CommandBus::new(),
            limits,
        }
    }

    #[inline]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    #[inline]
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    #[inline]
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub fn bus_mut(&mut self) -> &mut CommandBus {
        &mut self.bus
    }

    /// 处理一行命令。
    ///
    /// 空行与注释行直接记入历史；其余行仅在命令成功时记入历史。
    /// 返回 `Err` 时场景保持该行执行前的状态。
    pub fn execute_line(&mut self, line: &str) -> Result<CommandResponse, EngineError> {
        let parsed = lexer::parse_line(line, &self.limits)?;
        if parsed.is_blank() {
            self.scene.record_line(line);
            return Ok(CommandResponse::silent());
        }

        let mut args = Vec::with_capacity(parsed.arguments.len());
        for argument in &parsed.arguments {
            let substitution = self.scene.substitute(&parsed.command, argument)?;
            if substitution.count > 0 {
                trace!(from = %argument, to = %substitution.text, "变量替换");
            }
            args.push(substitution.text);
        }

        let request = CommandRequest {
            name: parsed.command,
            args,
            assignment: parsed.assignment,
        };
        let response = self.bus.dispatch(
            &request,
            &mut CommandContext {
                scene: &mut self.scene,
            },
        )?;

        if response.success {
            self.scene.record_line(line);
        }
        debug!(command = %request.name, success = response.success, "命令已执行");
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{CommandError, CoordError, LayerError, UnitError, VariableError};
    use ncad_core::document::PrimitiveKind;
    use ncad_core::geometry::{Color, Coordinate};

    #[test]
    fn red_layer_scenario_reports_line_on_layer_one() {
        let mut interpreter = Interpreter::new();
        interpreter.execute_line("layer 1, Dimensions, ff0000").unwrap();
        interpreter.execute_line("line x0;y0, x100;y0, l1").unwrap();
        let response = interpreter.execute_line("inspect &0").unwrap();

        assert!(response.success);
        let text = response.message.unwrap();
        assert!(text.contains("Object Type: 1 - line"));
        assert!(text.contains("    0. (0, 0)\n    1. (100, 0)"));
        assert!(text.contains("Layer 1 'Dimensions':\n    Color: RGB(255, 0, 0)"));

        let object = &interpreter.scene().document().objects()[0];
        assert_eq!(object.kind, PrimitiveKind::Line);
        let layer = interpreter.scene().document().layer(object.layer_id).unwrap();
        assert_eq!(layer.color, Color::rgb(255, 0, 0));
    }

    #[test]
    fn variables_flow_into_later_commands() {
        let mut interpreter = Interpreter::new();
        interpreter.execute_line("set @origin, x1cm;y2cm").unwrap();
        interpreter.execute_line("line @origin, w5 = &base").unwrap();
        interpreter.execute_line("rect &base[1], h1m").unwrap();
        interpreter.execute_line("circle &^[0], w3").unwrap();

        let objects = interpreter.scene().document().objects();
        assert_eq!(objects[0].coordinates[1], Coordinate::new(15, 20));
        assert_eq!(
            objects[1].coordinates,
            vec![Coordinate::new(15, 20), Coordinate::new(15, 1020)]
        );
        assert_eq!(objects[2].coordinates[0], Coordinate::new(15, 20));
        assert_eq!(interpreter.scene().variables().last_object(), Some(2));
    }

    #[test]
    fn history_keeps_successful_and_trivial_lines_only() {
        let mut interpreter = Interpreter::new();
        interpreter.execute_line("# header").unwrap();
        interpreter.execute_line("set $w, 5").unwrap();
        assert!(interpreter.execute_line("set $w, 6").is_err());
        assert!(interpreter.execute_line("bogus").is_err());
        let missing = interpreter.execute_line("inspect $nope").unwrap();
        assert!(!missing.success);
        let listing = interpreter.execute_line("list").unwrap();

        assert_eq!(
            listing.message.as_deref(),
            Some("001: # header\n002: set $w, 5")
        );
        assert_eq!(interpreter.scene().history().len(), 3);
    }

    #[test]
    fn errors_are_recoverable_per_line() {
        let mut interpreter = Interpreter::new();
        let err = interpreter.execute_line("layer 0, Mine, 000000").unwrap_err();
        assert_eq!(err, EngineError::Layer(LayerError::ReadOnlyDefault));
        assert_eq!(err.kind(), "LayerError");

        let err = interpreter.execute_line("line @missing, w1").unwrap_err();
        assert!(matches!(err, EngineError::Variable(VariableError::NotFound { .. })));

        interpreter.execute_line("line x0;y0, x1;y1").unwrap();
        assert_eq!(interpreter.scene().document().objects().len(), 1);
    }

    #[test]
    fn oversized_values_fail_the_line_only() {
        let mut interpreter = Interpreter::new();
        let err = interpreter
            .execute_line("line x9999999999999999999999;y0, w1")
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Coord(CoordError::Unit(UnitError::OutOfRange { .. }))
        ));

        let err = interpreter
            .execute_line("line x9000000000000000000;y0, w1000000000000000000")
            .unwrap_err();
        assert!(matches!(err, EngineError::Coord(CoordError::OutOfRange { .. })));

        let err = interpreter
            .execute_line("odimen x0;y0, x10;y0, u-99999999999999999999999")
            .unwrap_err();
        assert!(matches!(err, EngineError::Unit(UnitError::OutOfRange { .. })));

        let line = "odimen x0;y9000000000000000000, x10;y9000000000000000000, u1000000000000000000";
        let err = interpreter.execute_line(line).unwrap_err();
        assert_eq!(err, EngineError::Command(CommandError::OffsetOutOfRange));

        interpreter.execute_line("line x0; y0, w 5").unwrap();
        let object = &interpreter.scene().document().objects()[0];
        assert_eq!(object.coordinates[1], Coordinate::new(5, 0));
        assert!(interpreter.scene().document().dimensions().is_empty());
    }

    #[test]
    fn set_sees_raw_operands_and_last_object_is_rebindable() {
        let mut interpreter = Interpreter::new();
        interpreter.execute_line("line x0;y0, x1;y1").unwrap();
        interpreter.execute_line("line x0;y0, x2;y2").unwrap();
        interpreter.execute_line("set &^, 0").unwrap();
        assert_eq!(interpreter.scene().variables().last_object(), Some(0));
        interpreter.execute_line("set &^, 1").unwrap();
        assert_eq!(interpreter.scene().variables().last_object(), Some(1));

        let err = interpreter.execute_line("set @p, @q").unwrap_err();
        assert!(matches!(err, EngineError::Variable(VariableError::InvalidCoord { .. })));
    }

    #[test]
    fn extra_handlers_receive_substituted_arguments() {
        use crate::command::CommandHandler;

        struct Echo;

        impl CommandHandler for Echo {
            fn name(&self) -> &'static str {
                "echo"
            }

            fn execute(
                &self,
                request: &CommandRequest,
                _context: &mut CommandContext<'_>,
            ) -> Result<CommandResponse, EngineError> {
                Ok(CommandResponse::ok(request.args.join(" | ")))
            }
        }

        let mut interpreter = Interpreter::new();
        interpreter.bus_mut().register(Echo);
        interpreter.execute_line("set @p, x1;y2").unwrap();
        let response = interpreter.execute_line("echo @p, plain").unwrap();
        assert_eq!(response.message.as_deref(), Some("x1;y2 | plain"));
    }

    #[test]
    fn offset_dimension_from_commands() {
        let mut interpreter = Interpreter::new();
        interpreter.execute_line("odimen x100;y0, x0;y0, u10, l2").unwrap();
        let dimension = interpreter.scene().document().dimensions()[0];
        assert_eq!(dimension.line_start, Coordinate::new(100, 10));
        assert_eq!(dimension.line_end, Coordinate::new(0, 10));
        assert_eq!(dimension.layer_id, 2);
    }
}
