// SPDX-License-Identifier: MIT OR Apache-2.0

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use crate::error::PipelineError;
use crate::ports::{
    InputPushable, NextStatus, OutputPullable, PullMode, Pullable, Pushable, SharedNode,
};

/// Port-level driver of a processor inside a pipeline.
///
/// Nodes own the bindings to their neighbours and decide how pushed events are incorporated and
/// how pulled events are produced. [`Single`](crate::Single) runs any [`Processor`](crate::Processor)
/// this way, fan-out nodes like [`SmartFork`](crate::SmartFork) implement it directly.
///
/// All methods run synchronously on the caller's stack. A push returns once every processor
/// reachable through push connections has handled the event, a pull returns once one event was
/// produced or it became clear that none can be.
pub trait Node<T> {
    fn input_arity(&self) -> usize;

    fn output_arity(&self) -> usize;

    /// Incorporates one event arriving on the given input port.
    fn push(&mut self, port: usize, event: T) -> Result<(), PipelineError>;

    /// Checks if the given output port can produce an event.
    ///
    /// Never returns [`NextStatus::Maybe`] in hard mode.
    fn has_next(&mut self, port: usize, mode: PullMode) -> Result<NextStatus, PipelineError>;

    /// Produces the next event of the given output port.
    ///
    /// In hard mode `None` means the port is exhausted.
    fn pull(&mut self, port: usize, mode: PullMode) -> Result<Option<T>, PipelineError>;

    /// Binds an output port to a downstream input, replacing any previous binding.
    fn bind_output(
        &mut self,
        port: usize,
        pushable: Box<dyn Pushable<T>>,
    ) -> Result<(), PipelineError>;

    /// Binds an input port to an upstream output, replacing any previous binding.
    fn bind_input(
        &mut self,
        port: usize,
        pullable: Box<dyn Pullable<T>>,
    ) -> Result<(), PipelineError>;

    /// Grows the number of output ports to `arity`.
    ///
    /// New ports start unbound with an empty backlog, existing ports keep their state.
    fn extend_output_arity(&mut self, arity: usize) -> Result<(), PipelineError>;

    /// Returns all internal state to what it was right after construction.
    ///
    /// Arity and wiring stay untouched.
    fn reset(&mut self);
}

/// Creates wiring-independent copies of nodes.
pub trait Duplicate {
    /// Returns a copy with the same arity and configuration and no bindings.
    ///
    /// With `preserve_state` set the copy also carries a snapshot of the current internal state,
    /// otherwise it is in its reset state.
    fn duplicate(&self, preserve_state: bool) -> Self;
}

/// Shared handle to a node which is or will be part of a pipeline.
///
/// Handles are cheap to clone, all clones point at the same node.
pub struct Handle<N> {
    inner: Rc<RefCell<N>>,
}

impl<N> Handle<N> {
    pub fn new(node: N) -> Self {
        Self {
            inner: Rc::new(RefCell::new(node)),
        }
    }

    /// Immutably borrows the node.
    ///
    /// Panics when the node is busy handling a push or pull, use `try_borrow` in code which might
    /// be called from inside a pipeline.
    pub fn borrow(&self) -> Ref<'_, N> {
        self.inner.borrow()
    }

    /// Mutably borrows the node.
    ///
    /// Panics when the node is busy handling a push or pull, use `try_borrow_mut` in code which
    /// might be called from inside a pipeline.
    pub fn borrow_mut(&self) -> RefMut<'_, N> {
        self.inner.borrow_mut()
    }

    pub fn try_borrow(&self) -> Result<Ref<'_, N>, PipelineError> {
        self.inner.try_borrow().map_err(|_| PipelineError::Reentrant)
    }

    pub fn try_borrow_mut(&self) -> Result<RefMut<'_, N>, PipelineError> {
        self.inner.try_borrow_mut().map_err(|_| PipelineError::Reentrant)
    }

    /// Returns a pushable delivering into the given input port.
    pub fn pushable_input<T>(&self, port: usize) -> Result<InputPushable<T>, PipelineError>
    where
        N: Node<T> + 'static,
    {
        check_input(port, self.try_borrow()?.input_arity())?;
        Ok(InputPushable::strong(self.shared(), port))
    }

    /// Returns a pullable reading from the given output port.
    pub fn pullable_output<T>(&self, port: usize) -> Result<OutputPullable<T>, PipelineError>
    where
        N: Node<T> + 'static,
    {
        check_output(port, self.try_borrow()?.output_arity())?;
        Ok(OutputPullable::new(self.shared(), port))
    }

    /// Duplicates the node into a new, unconnected handle.
    pub fn duplicate(&self, preserve_state: bool) -> Result<Self, PipelineError>
    where
        N: Duplicate,
    {
        Ok(Self::new(self.try_borrow()?.duplicate(preserve_state)))
    }

    pub(crate) fn shared<T>(&self) -> SharedNode<T>
    where
        N: Node<T> + 'static,
    {
        self.inner.clone()
    }

    /// Returns true if both handles point at the same node.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<N> Clone for Handle<N> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<N: fmt::Debug> fmt::Debug for Handle<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_borrow() {
            Ok(node) => f.debug_tuple("Handle").field(&*node).finish(),
            Err(_) => f.write_str("Handle(<busy>)"),
        }
    }
}

pub(crate) fn check_input(port: usize, arity: usize) -> Result<(), PipelineError> {
    if port >= arity {
        return Err(PipelineError::InputArity { port, arity });
    }
    Ok(())
}

pub(crate) fn check_output(port: usize, arity: usize) -> Result<(), PipelineError> {
    if port >= arity {
        return Err(PipelineError::OutputArity { port, arity });
    }
    Ok(())
}
