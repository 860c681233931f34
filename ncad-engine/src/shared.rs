//! 输入线程与渲染线程共享的解释器句柄。
//!
//! 单把互斥锁覆盖整行处理与整次渲染读取，渲染端不会看到追加到一半的容器。

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::command::CommandResponse;
use crate::errors::EngineError;
use crate::interpreter::Interpreter;
use crate::scene::Scene;

#[derive(Debug, Clone)]
pub struct SharedInterpreter {
    inner: Arc<Mutex<Interpreter>>,
}

impl SharedInterpreter {
    pub fn new(interpreter: Interpreter) -> Self {
        Self {
            inner: Arc::new(Mutex::new(interpreter)),
        }
    }

    pub fn execute_line(&self, line: &str) -> Result<CommandResponse, EngineError> {
        self.lock().execute_line(line)
    }

    /// 持锁期间以只读方式访问场景。
    pub fn read<R>(&self, f: impl FnOnce(&Scene) -> R) -> R {
        f(self.lock().scene())
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut Interpreter) -> R) -> R {
        f(&mut self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, Interpreter> {
        // 解释器在每行结束时状态一致，中毒后继续使用。
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
