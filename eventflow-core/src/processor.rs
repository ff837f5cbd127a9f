// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::VecDeque;

use crate::error::{PipelineError, ProcessorError};

/// Events handed to or produced by a processor, one per port.
pub type Tuple<T> = Vec<T>;

/// Interface for implementing event processors.
///
/// A processor has a fixed number of input and output ports. Every call to `compute` receives
/// exactly one event per input port and may emit zero or more tuples holding one event per output
/// port. Processors with no inputs are sources, processors with no outputs are sinks.
///
/// Processors never deal with wiring themselves, they are run by a [`Single`](crate::Single) node
/// which buffers inputs, drives `compute` on push or pull and forwards the results.
///
/// `compute` must be deterministic given the processor's accumulated state and the input tuple.
/// Skipping an input (filtering, decimation) is signalled by emitting nothing, which is not an
/// error. Inputs the processor can't handle are reported as [`ProcessorError::MalformedInput`].
pub trait Processor<T> {
    fn input_arity(&self) -> usize;

    fn output_arity(&self) -> usize;

    /// Processes one input tuple.
    fn compute(&mut self, inputs: Tuple<T>, outputs: &mut Outputs<T>)
    -> Result<Flow, ProcessorError>;

    /// Returns internal state to what it was right after construction.
    fn reset(&mut self) {}

    /// Returns a copy which shares no mutable state with this processor.
    ///
    /// Without `preserve_state` the copy is in its reset state.
    fn duplicate(&self, preserve_state: bool) -> Self
    where
        Self: Sized;

    /// Grows the number of output ports, only supported by some processors.
    fn extend_output_arity(&mut self, _arity: usize) -> Result<(), PipelineError> {
        Err(PipelineError::NotExtensible)
    }
}

/// Signals if a processor will produce anything on further calls.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,

    /// Nothing will ever be emitted again, typically returned by finite sources.
    Exhausted,
}

/// Collects the tuples emitted by one `compute` call.
#[derive(Debug)]
pub struct Outputs<T> {
    tuples: VecDeque<Tuple<T>>,
}

impl<T> Outputs<T> {
    pub fn new() -> Self {
        Self {
            tuples: VecDeque::new(),
        }
    }

    /// Emits a tuple, it needs to hold exactly one event per output port.
    pub fn emit(&mut self, tuple: Tuple<T>) {
        self.tuples.push_back(tuple);
    }

    /// Emits a tuple for processors with a single output port.
    pub fn emit_one(&mut self, event: T) {
        self.tuples.push_back(vec![event]);
    }

    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Tuple<T>> {
        self.tuples.iter()
    }
}

impl<T> Default for Outputs<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> IntoIterator for Outputs<T> {
    type Item = Tuple<T>;

    type IntoIter = std::collections::vec_deque::IntoIter<Tuple<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.tuples.into_iter()
    }
}
