// SPDX-License-Identifier: MIT OR Apache-2.0

use thiserror::Error;

/// Errors which may occur while wiring or driving a pipeline.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    /// Addressed an input port outside of the declared input arity.
    #[error("input port {port} is out of range, processor has {arity} input(s)")]
    InputArity { port: usize, arity: usize },

    /// Addressed an output port outside of the declared output arity.
    #[error("output port {port} is out of range, processor has {arity} output(s)")]
    OutputArity { port: usize, arity: usize },

    /// Port exists but nothing was connected to it.
    #[error("{direction} port {port} is not connected")]
    NotConnected { direction: Direction, port: usize },

    /// Downstream processor of a push connection has been dropped.
    #[error("downstream processor behind port {port} has been dropped")]
    Disconnected { port: usize },

    /// Processor was accessed while it was already busy, the graph contains a cycle.
    #[error("processor is already in use, pipelines must not contain cycles")]
    Reentrant,

    /// A hard pull was issued on an output which will never produce another event.
    ///
    /// Callers are expected to check `has_next_hard` first, this error signals a violated
    /// precondition and not a recoverable stream condition.
    #[error("pulled from exhausted output port {port}")]
    Exhausted { port: usize },

    /// Output arity of this processor is fixed.
    #[error("output arity of this processor can not be extended")]
    NotExtensible,

    /// Output arity can only grow.
    #[error("can not extend output arity from {current} to {requested}")]
    InvalidExtension { current: usize, requested: usize },

    /// Processor emitted a tuple which doesn't match its own output arity.
    #[error("processor emitted tuple of size {actual}, expected {expected}")]
    MalformedOutput { expected: usize, actual: usize },

    /// Contract failure signalled by a processor's `compute` method.
    #[error(transparent)]
    Processor(#[from] ProcessorError),
}

/// Errors raised by processors from inside `compute`.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ProcessorError {
    /// Input tuple had a shape or value the processor can not handle.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// Processor-specific failure.
    #[error("processor failed: {0}")]
    Failed(String),
}

/// Errors which can occur when validating configuration values.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("clean interval needs to be at least 1")]
    ZeroCleanInterval,
}

/// Side of a processor a port belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Input => write!(f, "input"),
            Direction::Output => write!(f, "output"),
        }
    }
}
