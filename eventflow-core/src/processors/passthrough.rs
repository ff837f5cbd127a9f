// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::error::ProcessorError;
use crate::processor::{Flow, Outputs, Processor, Tuple};

/// Forwards every input tuple unchanged, with the same number of inputs and outputs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Passthrough {
    arity: usize,
}

impl Passthrough {
    pub fn new(arity: usize) -> Self {
        Self { arity }
    }
}

impl<T> Processor<T> for Passthrough {
    fn input_arity(&self) -> usize {
        self.arity
    }

    fn output_arity(&self) -> usize {
        self.arity
    }

    fn compute(
        &mut self,
        inputs: Tuple<T>,
        outputs: &mut Outputs<T>,
    ) -> Result<Flow, ProcessorError> {
        outputs.emit(inputs);
        Ok(Flow::Continue)
    }

    fn duplicate(&self, _preserve_state: bool) -> Self {
        self.clone()
    }
}
