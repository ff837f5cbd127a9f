// SPDX-License-Identifier: MIT OR Apache-2.0

use std::iter;

use crate::error::{PipelineError, ProcessorError};
use crate::node::Handle;
use crate::processor::{Flow, Outputs, Processor, Tuple};
use crate::single::Single;

/// Node replicating one input stream to a number of outputs, see [`Fork`].
pub type ForkNode<T> = Single<Fork, T>;

/// Replicates every input event to all of its output ports.
///
/// Meant for push pipelines where every output keeps pace: a pushed event is forwarded to all
/// outputs in port order before `push` returns. If one of the downstream pushes fails the
/// remaining outputs are still served and the failure is reported afterwards.
///
/// Pulling works as well but every output keeps its own backlog holding a copy of each event the
/// other outputs already requested. Use [`SmartFork`](crate::SmartFork) when outputs are read at
/// different paces.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fork {
    arity: usize,
}

impl Fork {
    pub fn new(arity: usize) -> Self {
        Self { arity }
    }

    /// Creates a fork node with the given number of outputs.
    pub fn handle<T: Clone>(arity: usize) -> Handle<ForkNode<T>> {
        Single::handle(Self::new(arity))
    }
}

impl<T: Clone> Processor<T> for Fork {
    fn input_arity(&self) -> usize {
        1
    }

    fn output_arity(&self) -> usize {
        self.arity
    }

    fn compute(
        &mut self,
        inputs: Tuple<T>,
        outputs: &mut Outputs<T>,
    ) -> Result<Flow, ProcessorError> {
        let mut inputs = inputs.into_iter();
        let (Some(event), None) = (inputs.next(), inputs.next()) else {
            return Err(ProcessorError::MalformedInput(
                "fork expects exactly one event".into(),
            ));
        };

        outputs.emit(iter::repeat_n(event, self.arity).collect());
        Ok(Flow::Continue)
    }

    fn duplicate(&self, _preserve_state: bool) -> Self {
        self.clone()
    }

    fn extend_output_arity(&mut self, arity: usize) -> Result<(), PipelineError> {
        if arity <= self.arity {
            return Err(PipelineError::InvalidExtension {
                current: self.arity,
                requested: arity,
            });
        }
        self.arity = arity;
        Ok(())
    }
}
