// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::VecDeque;

use crate::error::ProcessorError;
use crate::processor::{Flow, Outputs, Processor, Tuple};

/// Collects all received events, one queue per input port.
#[derive(Clone, Debug)]
pub struct QueueSink<T> {
    queues: Vec<VecDeque<T>>,
}

impl<T> QueueSink<T> {
    pub fn new(arity: usize) -> Self {
        Self {
            queues: (0..arity).map(|_| VecDeque::new()).collect(),
        }
    }

    /// Events received on the given input port so far, oldest first.
    pub fn queue(&self, port: usize) -> Option<&VecDeque<T>> {
        self.queues.get(port)
    }

    pub fn queue_mut(&mut self, port: usize) -> Option<&mut VecDeque<T>> {
        self.queues.get_mut(port)
    }
}

impl<T: Clone> Processor<T> for QueueSink<T> {
    fn input_arity(&self) -> usize {
        self.queues.len()
    }

    fn output_arity(&self) -> usize {
        0
    }

    fn compute(
        &mut self,
        inputs: Tuple<T>,
        _outputs: &mut Outputs<T>,
    ) -> Result<Flow, ProcessorError> {
        if inputs.len() != self.queues.len() {
            return Err(ProcessorError::MalformedInput(format!(
                "expected {} events, got {}",
                self.queues.len(),
                inputs.len()
            )));
        }

        for (queue, event) in self.queues.iter_mut().zip(inputs) {
            queue.push_back(event);
        }

        Ok(Flow::Continue)
    }

    fn reset(&mut self) {
        self.queues.iter_mut().for_each(VecDeque::clear);
    }

    fn duplicate(&self, preserve_state: bool) -> Self {
        if preserve_state {
            self.clone()
        } else {
            Self::new(self.queues.len())
        }
    }
}
