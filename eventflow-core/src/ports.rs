// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pushable and pullable adapters, the only way events cross a processor boundary.
//!
//! A [`Pushable`] is bound to exactly one input port of one processor and delivers events eagerly:
//! `push` returns once the processor incorporated the event and pushed all resulting outputs
//! further downstream.
//!
//! A [`Pullable`] is bound to exactly one output port and produces events lazily: `pull`
//! recursively pulls from upstream only as far as needed to produce one event.
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::warn;

use crate::error::{Direction, PipelineError};
use crate::node::Node;

/// Shared, type-erased reference to a node inside a pipeline graph.
pub(crate) type SharedNode<T> = Rc<RefCell<dyn Node<T>>>;

type WeakNode<T> = Weak<RefCell<dyn Node<T>>>;

/// Bindings of all output ports of a node, `None` marks an unconnected port.
pub(crate) type OutputBindings<T> = Vec<Option<Box<dyn Pushable<T>>>>;

/// Bindings of all input ports of a node, `None` marks an unconnected port.
pub(crate) type InputBindings<T> = Vec<Option<Box<dyn Pullable<T>>>>;

/// Eager, synchronous delivery of events into an input port.
pub trait Pushable<T> {
    /// Delivers one event.
    ///
    /// Returns after the receiving processor has incorporated the event and cascaded all resulting
    /// outputs downstream.
    fn push(&self, event: T) -> Result<(), PipelineError>;
}

/// Lazy, on-demand retrieval of events from an output port.
pub trait Pullable<T> {
    /// Checks if an event can be pulled without doing any work which would consume events the
    /// upstream can't put back.
    ///
    /// Returns [`NextStatus::Maybe`] when this can't be decided without such work.
    fn has_next(&self) -> Result<NextStatus, PipelineError>;

    /// Checks if an event can be pulled, doing as much upstream work as needed to give a definite
    /// answer.
    fn has_next_hard(&self) -> Result<bool, PipelineError>;

    /// Pulls one event if it can be produced with a single round of upstream work.
    ///
    /// `None` means no event is available right now, which includes the exhausted case.
    fn pull(&self) -> Result<Option<T>, PipelineError>;

    /// Pulls one event, doing as much upstream work as needed.
    ///
    /// Must only be called after `has_next_hard` returned `true`. Calling it on an exhausted output
    /// is a precondition violation and reported as [`PipelineError::Exhausted`].
    fn pull_hard(&self) -> Result<T, PipelineError>;
}

/// Answer of a `has_next` check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NextStatus {
    /// An event is definitely available.
    Yes,

    /// The output is definitely exhausted.
    No,

    /// Can't tell without consuming events upstream.
    Maybe,
}

impl From<bool> for NextStatus {
    fn from(value: bool) -> Self {
        if value { NextStatus::Yes } else { NextStatus::No }
    }
}

/// How far a node may go upstream to answer a pull or `has_next` request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PullMode {
    /// At most one round of upstream work, may end indeterminate.
    #[default]
    Soft,

    /// Keep working upstream until the answer is definite.
    Hard,
}

enum Link<T> {
    Strong(SharedNode<T>),
    Weak(WeakNode<T>),
}

impl<T> Link<T> {
    fn with_node<R>(
        &self,
        port: usize,
        f: impl FnOnce(&mut dyn Node<T>) -> Result<R, PipelineError>,
    ) -> Result<R, PipelineError> {
        let node = match self {
            Link::Strong(node) => node.clone(),
            Link::Weak(node) => node
                .upgrade()
                .ok_or(PipelineError::Disconnected { port })?,
        };
        let mut node = node.try_borrow_mut().map_err(|_| PipelineError::Reentrant)?;
        f(&mut *node)
    }
}

/// Pushable bound to an input port of a node.
///
/// Handed out to users it keeps the node alive. When created by the connector it only holds a
/// weak reference, as the downstream side owns its upstream and not the other way around.
pub struct InputPushable<T> {
    link: Link<T>,
    port: usize,
}

impl<T> InputPushable<T> {
    pub(crate) fn strong(node: SharedNode<T>, port: usize) -> Self {
        Self {
            link: Link::Strong(node),
            port,
        }
    }

    pub(crate) fn weak(node: &SharedNode<T>, port: usize) -> Self {
        Self {
            link: Link::Weak(Rc::downgrade(node)),
            port,
        }
    }

    /// Input port this pushable delivers to.
    pub fn port(&self) -> usize {
        self.port
    }
}

impl<T> Pushable<T> for InputPushable<T> {
    fn push(&self, event: T) -> Result<(), PipelineError> {
        self.link
            .with_node(self.port, |node| node.push(self.port, event))
    }
}

impl<T> fmt::Debug for InputPushable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputPushable")
            .field("port", &self.port)
            .finish_non_exhaustive()
    }
}

/// Pullable bound to an output port of a node.
pub struct OutputPullable<T> {
    link: Link<T>,
    port: usize,
}

impl<T> OutputPullable<T> {
    pub(crate) fn new(node: SharedNode<T>, port: usize) -> Self {
        Self {
            link: Link::Strong(node),
            port,
        }
    }

    /// Output port this pullable reads from.
    pub fn port(&self) -> usize {
        self.port
    }
}

impl<T> Pullable<T> for OutputPullable<T> {
    fn has_next(&self) -> Result<NextStatus, PipelineError> {
        self.link
            .with_node(self.port, |node| node.has_next(self.port, PullMode::Soft))
    }

    fn has_next_hard(&self) -> Result<bool, PipelineError> {
        let status = self
            .link
            .with_node(self.port, |node| node.has_next(self.port, PullMode::Hard))?;
        Ok(status == NextStatus::Yes)
    }

    fn pull(&self) -> Result<Option<T>, PipelineError> {
        self.link
            .with_node(self.port, |node| node.pull(self.port, PullMode::Soft))
    }

    fn pull_hard(&self) -> Result<T, PipelineError> {
        self.link
            .with_node(self.port, |node| node.pull(self.port, PullMode::Hard))?
            .ok_or(PipelineError::Exhausted { port: self.port })
    }
}

impl<T> fmt::Debug for OutputPullable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputPullable")
            .field("port", &self.port)
            .finish_non_exhaustive()
    }
}

/// Pushes every event of a tuple into the output port with the same index.
///
/// All ports are visited in index order even if some of them fail. The first failure is returned
/// after every port was attempted.
pub(crate) fn push_tuple<T>(
    outputs: &OutputBindings<T>,
    tuple: impl IntoIterator<Item = T>,
) -> Result<(), PipelineError> {
    let mut first_error = None;

    for (port, event) in tuple.into_iter().enumerate() {
        let result = match outputs.get(port) {
            Some(Some(pushable)) => pushable.push(event),
            _ => Err(PipelineError::NotConnected {
                direction: Direction::Output,
                port,
            }),
        };

        if let Err(err) = result {
            warn!(port, %err, "failed delivering event downstream");
            first_error.get_or_insert(err);
        }
    }

    match first_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
