// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::error::ProcessorError;
use crate::processor::{Flow, Outputs, Processor, Tuple};

/// Source emitting a fixed sequence of events.
///
/// By default the sequence starts over once it was fully emitted. A non-looping source reports
/// itself exhausted together with its last event.
#[derive(Clone, Debug)]
pub struct QueueSource<T> {
    events: Vec<T>,
    position: usize,
    looping: bool,
    batch: bool,
}

impl<T> QueueSource<T> {
    pub fn new(events: Vec<T>) -> Self {
        Self {
            events,
            position: 0,
            looping: true,
            batch: false,
        }
    }

    /// Sets if the sequence starts over after the last event.
    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Emit the whole sequence on every computation step instead of one event at a time.
    pub fn batch(mut self, batch: bool) -> Self {
        self.batch = batch;
        self
    }

    /// Index of the event emitted next.
    pub fn position(&self) -> usize {
        self.position
    }
}

impl<T: Clone> Processor<T> for QueueSource<T> {
    fn input_arity(&self) -> usize {
        0
    }

    fn output_arity(&self) -> usize {
        1
    }

    fn compute(
        &mut self,
        _inputs: Tuple<T>,
        outputs: &mut Outputs<T>,
    ) -> Result<Flow, ProcessorError> {
        if self.events.is_empty() {
            return Ok(Flow::Exhausted);
        }

        if self.batch {
            for event in &self.events {
                outputs.emit_one(event.clone());
            }
            return Ok(if self.looping {
                Flow::Continue
            } else {
                Flow::Exhausted
            });
        }

        if self.position >= self.events.len() {
            if !self.looping {
                return Ok(Flow::Exhausted);
            }
            self.position = 0;
        }

        outputs.emit_one(self.events[self.position].clone());
        self.position += 1;

        if !self.looping && self.position == self.events.len() {
            return Ok(Flow::Exhausted);
        }

        Ok(Flow::Continue)
    }

    fn reset(&mut self) {
        self.position = 0;
    }

    fn duplicate(&self, preserve_state: bool) -> Self {
        let mut copy = self.clone();
        if !preserve_state {
            copy.position = 0;
        }
        copy
    }
}

#[cfg(test)]
mod tests {
    use crate::processor::{Flow, Outputs, Processor};

    use super::QueueSource;

    fn emitted(source: &mut QueueSource<u32>) -> (Vec<u32>, Flow) {
        let mut outputs = Outputs::new();
        let flow = source.compute(vec![], &mut outputs).unwrap();
        (outputs.into_iter().flatten().collect(), flow)
    }

    #[test]
    fn loops_by_default() {
        let mut source = QueueSource::new(vec![1, 2]);
        assert_eq!(emitted(&mut source), (vec![1], Flow::Continue));
        assert_eq!(emitted(&mut source), (vec![2], Flow::Continue));
        assert_eq!(emitted(&mut source), (vec![1], Flow::Continue));
    }

    #[test]
    fn finite_source_exhausts_with_last_event() {
        let mut source = QueueSource::new(vec![1, 2]).looping(false);
        assert_eq!(emitted(&mut source), (vec![1], Flow::Continue));
        assert_eq!(emitted(&mut source), (vec![2], Flow::Exhausted));
        assert_eq!(emitted(&mut source), (vec![], Flow::Exhausted));

        source.reset();
        assert_eq!(emitted(&mut source), (vec![1], Flow::Continue));
    }

    #[test]
    fn batch_emits_everything_at_once() {
        let mut source = QueueSource::new(vec![1, 2, 3]).batch(true);
        assert_eq!(emitted(&mut source), (vec![1, 2, 3], Flow::Continue));
    }

    #[test]
    fn duplicate_keeps_position_only_when_asked() {
        let mut source = QueueSource::new(vec![1, 2, 3]);
        emitted(&mut source);

        let mut fresh = source.duplicate(false);
        let mut snapshot = source.duplicate(true);
        assert_eq!(emitted(&mut fresh).0, vec![1]);
        assert_eq!(emitted(&mut snapshot).0, vec![2]);
    }
}
