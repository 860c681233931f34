use std::collections::HashMap;
use std::fmt;

use ncad_core::document::PrimitiveKind;

use crate::dimensions::DimensionMode;
use crate::errors::{CommandError, EngineError};
use crate::inspect::{self, Inspection};
use crate::scene::Scene;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    pub name: String,
    pub args: Vec<String>,
    pub assignment: Option<String>,
}

impl CommandRequest {
    pub fn new(name: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            args,
            assignment: None,
        }
    }

    fn expect_args(&self, expected: usize, label: &'static str) -> Result<(), CommandError> {
        if self.args.len() != expected {
            return Err(CommandError::ArgumentCount {
                command: self.name.clone(),
                expected: label,
                found: self.args.len(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResponse {
    pub success: bool,
    pub message: Option<String>,
}

impl CommandResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }

    /// 成功且无需输出。
    pub fn silent() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

pub trait CommandHandler: Send + Sync {
    fn name(&self) -> &'static str;

    /// 是否接受 `= &name` 后缀。
    fn accepts_assignment(&self) -> bool {
        false
    }

    fn execute(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> Result<CommandResponse, EngineError>;
}

pub struct CommandContext<'a> {
    pub scene: &'a mut Scene,
}

pub struct CommandBus {
    handlers: HashMap<&'static str, Box<dyn CommandHandler>>,
}

impl CommandBus {
    pub fn new() -> Self {
        let mut bus = Self {
            handlers: HashMap::new(),
        };
        for kind in PrimitiveKind::ALL {
            bus.register(CreateObjectCommand(kind));
        }
        bus.register(DimensionCommand(DimensionMode::Explicit));
        bus.register(DimensionCommand(DimensionMode::Offset));
        bus.register(SetCommand);
        bus.register(LayerCommand);
        bus.register(ListCommand);
        bus.register(InspectCommand);
        bus
    }

    pub fn register<H: CommandHandler + 'static>(&mut self, handler: H) {
        self.handlers.insert(handler.name(), Box::new(handler));
    }

    pub fn dispatch(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> Result<CommandResponse, EngineError> {
        let handler = self
            .handlers
            .get(request.name.as_str())
            .ok_or_else(|| CommandError::Unknown {
                name: request.name.clone(),
            })?;
        if request.assignment.is_some() && !handler.accepts_assignment() {
            return Err(CommandError::UnexpectedAssignment {
                command: request.name.clone(),
            }
            .into());
        }
        handler.execute(request, context)
    }

    pub fn available_commands(&self) -> impl Iterator<Item = &&'static str> {
        self.handlers.keys()
    }
}

impl Default for CommandBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CommandBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.handlers.keys().collect();
        names.sort();
        f.debug_struct("CommandBus").field("handlers", &names).finish()
    }
}

struct CreateObjectCommand(PrimitiveKind);

impl CommandHandler for CreateObjectCommand {
    fn name(&self) -> &'static str {
        self.0.command_name()
    }

    fn accepts_assignment(&self) -> bool {
        true
    }

    fn execute(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> Result<CommandResponse, EngineError> {
        context
            .scene
            .create_object(self.0, &request.args, request.assignment.as_deref())?;
        Ok(CommandResponse::silent())
    }
}

struct DimensionCommand(DimensionMode);

impl CommandHandler for DimensionCommand {
    fn name(&self) -> &'static str {
        self.0.command_name()
    }

    fn execute(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> Result<CommandResponse, EngineError> {
        context.scene.create_dimension(&request.args, self.0)?;
        Ok(CommandResponse::silent())
    }
}

struct SetCommand;

impl CommandHandler for SetCommand {
    fn name(&self) -> &'static str {
        "set"
    }

    fn execute(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> Result<CommandResponse, EngineError> {
        request.expect_args(2, "2")?;
        context.scene.set_variable(&request.args[0], &request.args[1])?;
        Ok(CommandResponse::silent())
    }
}

struct LayerCommand;

impl CommandHandler for LayerCommand {
    fn name(&self) -> &'static str {
        "layer"
    }

    fn execute(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> Result<CommandResponse, EngineError> {
        request.expect_args(3, "3")?;
        context
            .scene
            .define_layer(&request.args[0], &request.args[1], &request.args[2])?;
        Ok(CommandResponse::silent())
    }
}

struct ListCommand;

impl CommandHandler for ListCommand {
    fn name(&self) -> &'static str {
        "list"
    }

    fn execute(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> Result<CommandResponse, EngineError> {
        request.expect_args(0, "0")?;
        Ok(CommandResponse::ok(context.scene.history().render()))
    }
}

struct InspectCommand;

impl CommandHandler for InspectCommand {
    fn name(&self) -> &'static str {
        "inspect"
    }

    fn execute(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> Result<CommandResponse, EngineError> {
        request.expect_args(1, "1")?;
        let scene = &*context.scene;
        Ok(
            match inspect::inspect(&request.args[0], scene.variables(), scene.document()) {
                Inspection::Report(text) => CommandResponse::ok(text),
                Inspection::Missing(text) => CommandResponse::err(text),
            },
        )
    }
}
