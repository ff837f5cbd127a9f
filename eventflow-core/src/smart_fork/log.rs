// SPDX-License-Identifier: MIT OR Apache-2.0

/// Events obtained from upstream together with one read cursor per output.
///
/// Outputs only hold an index into the sequence. Events are appended at the end and dropped from
/// the front once every cursor moved past them, cursors are rebased whenever that happens.
#[derive(Clone, Debug)]
pub(crate) struct RetainedLog<T> {
    events: Vec<T>,
    cursors: Vec<usize>,
    /// Absolute sequence number of `events[0]`.
    offset: u64,
    pulls_since_clean: usize,
}

impl<T> RetainedLog<T> {
    pub fn new(outputs: usize) -> Self {
        Self {
            events: Vec::new(),
            cursors: vec![0; outputs],
            offset: 0,
            pulls_since_clean: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn outputs(&self) -> usize {
        self.cursors.len()
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Absolute position of the next event the output will read.
    pub fn position(&self, output: usize) -> Option<u64> {
        self.cursors
            .get(output)
            .map(|cursor| self.offset + *cursor as u64)
    }

    /// Event the output reads next, if it was already obtained from upstream.
    pub fn peek(&self, output: usize) -> Option<&T> {
        self.events.get(self.cursors[output])
    }

    pub fn advance(&mut self, output: usize) {
        debug_assert!(self.cursors[output] < self.events.len());
        self.cursors[output] += 1;
    }

    pub fn append(&mut self, event: T) {
        self.events.push(event);
    }

    /// Adds an output which starts reading after everything obtained so far.
    pub fn add_output(&mut self) {
        self.cursors.push(self.events.len());
    }

    /// Counts one upstream pull and cleans up when `interval` pulls were reached.
    ///
    /// Returns the number of discarded events if a cleanup took place.
    pub fn tick(&mut self, interval: usize) -> Option<usize> {
        self.pulls_since_clean += 1;
        if self.pulls_since_clean < interval {
            return None;
        }
        Some(self.clean())
    }

    /// Discards all events every output has read already.
    pub fn clean(&mut self) -> usize {
        let consumed = self
            .cursors
            .iter()
            .copied()
            .min()
            .unwrap_or(self.events.len());

        self.events.drain(..consumed);
        self.cursors.iter_mut().for_each(|cursor| *cursor -= consumed);
        self.offset += consumed as u64;
        self.pulls_since_clean = 0;

        consumed
    }

    pub fn clear(&mut self) {
        self.events.clear();
        self.cursors.iter_mut().for_each(|cursor| *cursor = 0);
        self.offset = 0;
        self.pulls_since_clean = 0;
    }
}
