use std::{cell::RefCell, rc::Rc};

pub const TOOL_NAME: &str = "plugload";

/// Receives the per-module "loading ..." lines when debug output is on.
pub trait DebugSink {
    fn line(&self, message: &str);
}

/// Drops everything; used when debug output is off.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl DebugSink for NoopSink {
    fn line(&self, _message: &str) {}
}

/// Forwards lines to `tracing` under the `plugload` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DebugSink for TracingSink {
    fn line(&self, message: &str) {
        tracing::info!(target: "plugload", "{TOOL_NAME}: {message}");
    }
}

/// Keeps every line in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    lines: Rc<RefCell<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }
}

impl DebugSink for MemorySink {
    fn line(&self, message: &str) {
        self.lines
            .borrow_mut()
            .push(format!("{TOOL_NAME}: {message}"));
    }
}

pub type SharedSink = Rc<dyn DebugSink>;

pub fn sink_for(debug: bool) -> SharedSink {
    if debug {
        Rc::new(TracingSink)
    } else {
        Rc::new(NoopSink)
    }
}
