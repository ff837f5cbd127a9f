// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::VecDeque;
use std::fmt;

use tracing::trace;

use crate::error::{Direction, PipelineError};
use crate::node::{Duplicate, Handle, Node, check_input, check_output};
use crate::ports::{
    InputBindings, NextStatus, OutputBindings, PullMode, Pullable, Pushable, push_tuple,
};
use crate::processor::{Flow, Outputs, Processor, Tuple};

/// Node running a [`Processor`] with one event queue per port.
///
/// In push mode events wait in the input queues until every input port holds one, then the
/// processor computes and the results are pushed into the bound downstream inputs.
///
/// In pull mode every output port has its own backlog. When a backlog runs dry one tuple is
/// pulled from the inputs, computed, and the results are appended to the backlogs of _all_
/// outputs. Backlogs of outputs which are never read grow without bound, managing this is up to
/// the caller.
pub struct Single<P, T> {
    processor: P,
    input_queues: Vec<VecDeque<T>>,
    output_queues: Vec<VecDeque<T>>,
    inputs: InputBindings<T>,
    outputs: OutputBindings<T>,
    exhausted: bool,
}

impl<P, T> Single<P, T>
where
    P: Processor<T>,
{
    pub fn new(processor: P) -> Self {
        let input_arity = processor.input_arity();
        let output_arity = processor.output_arity();

        Self {
            processor,
            input_queues: (0..input_arity).map(|_| VecDeque::new()).collect(),
            output_queues: (0..output_arity).map(|_| VecDeque::new()).collect(),
            inputs: (0..input_arity).map(|_| None).collect(),
            outputs: (0..output_arity).map(|_| None).collect(),
            exhausted: false,
        }
    }

    /// Wraps the processor into a node and returns a shared handle to it.
    pub fn handle(processor: P) -> Handle<Self> {
        Handle::new(Self::new(processor))
    }

    pub fn processor(&self) -> &P {
        &self.processor
    }

    pub fn processor_mut(&mut self) -> &mut P {
        &mut self.processor
    }

    /// Number of events waiting in the backlog of an output port.
    pub fn backlog(&self, port: usize) -> usize {
        self.output_queues.get(port).map_or(0, VecDeque::len)
    }

    /// Runs one computation step and pushes the results downstream.
    ///
    /// This is how pipelines get driven from their ends: sources have no inputs and produce on
    /// every step, sinks have no outputs and pull one tuple from their inputs on every step.
    /// Returns [`Flow::Exhausted`] once the inputs or the processor itself ran dry.
    pub fn advance(&mut self) -> Result<Flow, PipelineError> {
        if self.exhausted || self.fill_inputs(PullMode::Hard)? != NextStatus::Yes {
            return Ok(Flow::Exhausted);
        }

        let inputs = self.take_tuple();
        let outputs = self.run(inputs)?;

        let mut first_error = None;
        for tuple in outputs {
            if let Err(err) = push_tuple(&self.outputs, tuple) {
                first_error.get_or_insert(err);
            }
        }

        if let Some(err) = first_error {
            return Err(err);
        }

        if self.exhausted {
            Ok(Flow::Exhausted)
        } else {
            Ok(Flow::Continue)
        }
    }

    fn run(&mut self, inputs: Tuple<T>) -> Result<Outputs<T>, PipelineError> {
        let mut outputs = Outputs::new();
        let flow = self.processor.compute(inputs, &mut outputs)?;
        if flow == Flow::Exhausted {
            trace!("processor exhausted");
            self.exhausted = true;
        }

        let expected = self.output_queues.len();
        if let Some(tuple) = outputs.iter().find(|tuple| tuple.len() != expected) {
            return Err(PipelineError::MalformedOutput {
                expected,
                actual: tuple.len(),
            });
        }

        Ok(outputs)
    }

    /// Pops a tuple from the input queues if every one of them holds an event.
    fn take_ready_tuple(&mut self) -> Option<Tuple<T>> {
        if self.input_queues.iter().any(VecDeque::is_empty) {
            return None;
        }
        Some(self.take_tuple())
    }

    fn take_tuple(&mut self) -> Tuple<T> {
        self.input_queues
            .iter_mut()
            .filter_map(VecDeque::pop_front)
            .collect()
    }

    /// Makes sure every input queue holds at least one event by pulling from upstream.
    ///
    /// All empty inputs are asked first and only pulled from when every one of them has an event,
    /// a soft check therefore never consumes from some inputs while others can't deliver. Events
    /// which were pulled stay queued, so nothing gets lost if a later input fails.
    fn fill_inputs(&mut self, mode: PullMode) -> Result<NextStatus, PipelineError> {
        let mut status = NextStatus::Yes;

        for (port, queue) in self.input_queues.iter().enumerate() {
            if !queue.is_empty() {
                continue;
            }

            let pullable = upstream(&self.inputs, port)?;
            let next = match mode {
                PullMode::Soft => pullable.has_next()?,
                PullMode::Hard => NextStatus::from(pullable.has_next_hard()?),
            };

            match next {
                NextStatus::Yes => (),
                NextStatus::No => return Ok(NextStatus::No),
                NextStatus::Maybe => status = NextStatus::Maybe,
            }
        }

        if status != NextStatus::Yes {
            return Ok(status);
        }

        for (port, queue) in self.input_queues.iter_mut().enumerate() {
            if !queue.is_empty() {
                continue;
            }

            let pullable = upstream(&self.inputs, port)?;
            let event = match mode {
                PullMode::Soft => pullable.pull()?,
                PullMode::Hard => Some(pullable.pull_hard()?),
            };

            match event {
                Some(event) => queue.push_back(event),
                None => return Ok(NextStatus::Maybe),
            }
        }

        Ok(NextStatus::Yes)
    }

    /// Computes one tuple pulled from upstream and appends the results to all output backlogs.
    fn step(&mut self, mode: PullMode) -> Result<NextStatus, PipelineError> {
        if self.exhausted {
            return Ok(NextStatus::No);
        }

        let status = self.fill_inputs(mode)?;
        if status != NextStatus::Yes {
            return Ok(status);
        }

        let inputs = self.take_tuple();
        let outputs = self.run(inputs)?;
        for tuple in outputs {
            for (queue, event) in self.output_queues.iter_mut().zip(tuple) {
                queue.push_back(event);
            }
        }

        Ok(NextStatus::Yes)
    }
}

fn upstream<T>(inputs: &InputBindings<T>, port: usize) -> Result<&dyn Pullable<T>, PipelineError> {
    inputs
        .get(port)
        .and_then(Option::as_deref)
        .ok_or(PipelineError::NotConnected {
            direction: Direction::Input,
            port,
        })
}

impl<P, T> Node<T> for Single<P, T>
where
    P: Processor<T>,
{
    fn input_arity(&self) -> usize {
        self.input_queues.len()
    }

    fn output_arity(&self) -> usize {
        self.output_queues.len()
    }

    fn push(&mut self, port: usize, event: T) -> Result<(), PipelineError> {
        check_input(port, self.input_arity())?;
        trace!(port, "push");

        self.input_queues[port].push_back(event);

        let mut first_error = None;
        while !self.exhausted {
            let Some(inputs) = self.take_ready_tuple() else {
                break;
            };

            let outputs = match self.run(inputs) {
                Ok(outputs) => outputs,
                Err(err) => {
                    first_error.get_or_insert(err);
                    continue;
                }
            };

            for tuple in outputs {
                if let Err(err) = push_tuple(&self.outputs, tuple) {
                    first_error.get_or_insert(err);
                }
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn has_next(&mut self, port: usize, mode: PullMode) -> Result<NextStatus, PipelineError> {
        check_output(port, self.output_arity())?;

        loop {
            if !self.output_queues[port].is_empty() {
                return Ok(NextStatus::Yes);
            }

            match (self.step(mode)?, mode) {
                (NextStatus::Yes, PullMode::Hard) => continue,
                (NextStatus::Yes, PullMode::Soft) => {
                    // A computation step which emitted nothing for this port leaves the answer open.
                    return Ok(if self.output_queues[port].is_empty() {
                        NextStatus::Maybe
                    } else {
                        NextStatus::Yes
                    });
                }
                (status, _) => return Ok(status),
            }
        }
    }

    fn pull(&mut self, port: usize, mode: PullMode) -> Result<Option<T>, PipelineError> {
        check_output(port, self.output_arity())?;

        loop {
            if let Some(event) = self.output_queues[port].pop_front() {
                trace!(port, "pull");
                return Ok(Some(event));
            }

            match (self.step(mode)?, mode) {
                (NextStatus::Yes, PullMode::Hard) => continue,
                (NextStatus::Yes, PullMode::Soft) => {
                    return Ok(self.output_queues[port].pop_front());
                }
                _ => return Ok(None),
            }
        }
    }

    fn bind_output(
        &mut self,
        port: usize,
        pushable: Box<dyn Pushable<T>>,
    ) -> Result<(), PipelineError> {
        check_output(port, self.output_arity())?;
        self.outputs[port] = Some(pushable);
        Ok(())
    }

    fn bind_input(
        &mut self,
        port: usize,
        pullable: Box<dyn Pullable<T>>,
    ) -> Result<(), PipelineError> {
        check_input(port, self.input_arity())?;
        self.inputs[port] = Some(pullable);
        Ok(())
    }

    fn extend_output_arity(&mut self, arity: usize) -> Result<(), PipelineError> {
        let current = self.output_arity();
        if arity <= current {
            return Err(PipelineError::InvalidExtension {
                current,
                requested: arity,
            });
        }

        self.processor.extend_output_arity(arity)?;
        self.output_queues.resize_with(arity, VecDeque::new);
        self.outputs.resize_with(arity, || None);

        Ok(())
    }

    fn reset(&mut self) {
        self.processor.reset();
        self.input_queues.iter_mut().for_each(VecDeque::clear);
        self.output_queues.iter_mut().for_each(VecDeque::clear);
        self.exhausted = false;
    }
}

impl<P, T> Duplicate for Single<P, T>
where
    P: Processor<T>,
    T: Clone,
{
    fn duplicate(&self, preserve_state: bool) -> Self {
        let mut copy = Self::new(self.processor.duplicate(preserve_state));

        if preserve_state {
            copy.input_queues = self.input_queues.clone();
            copy.output_queues = self.output_queues.clone();
            copy.exhausted = self.exhausted;
        }

        copy
    }
}

impl<P: fmt::Debug, T> fmt::Debug for Single<P, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Single")
            .field("processor", &self.processor)
            .field("input_arity", &self.input_queues.len())
            .field("output_arity", &self.output_queues.len())
            .field("exhausted", &self.exhausted)
            .finish_non_exhaustive()
    }
}
