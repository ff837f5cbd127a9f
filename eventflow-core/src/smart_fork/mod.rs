// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fan-out with independent read cursors over one shared, garbage-collected event sequence.
mod config;
mod log;

use std::fmt;
use std::iter;

use tracing::{debug, trace};

use crate::connector::Connector;
use crate::error::{ConfigError, Direction, PipelineError};
use crate::node::{Duplicate, Handle, Node, check_input, check_output};
use crate::ports::{
    InputBindings, NextStatus, OutputBindings, PullMode, Pullable, Pushable, push_tuple,
};

pub use config::{DEFAULT_CLEAN_INTERVAL, SmartForkConfig};

use log::RetainedLog;

/// Replicates one input stream to several outputs which may be read at their own pace.
///
/// Every event obtained from upstream is stored once, each output only keeps a cursor into that
/// sequence. Pulling from an output which is behind is served from the retained sequence without
/// touching upstream, pulling from an output which is up-to-date pulls exactly one new event from
/// upstream and retains it for the others.
///
/// Every `clean_interval` upstream pulls, events which every output has read are discarded. Memory
/// is thereby bounded by the distance between the fastest and the slowest output plus the
/// interval, and not by the total number of events seen.
///
/// In push mode events are forwarded to all outputs in port order right away, just like with
/// [`Fork`](crate::Fork).
pub struct SmartFork<T> {
    log: RetainedLog<T>,
    upstream: InputBindings<T>,
    downstream: OutputBindings<T>,
    config: SmartForkConfig,
}

impl<T> SmartFork<T>
where
    T: Clone,
{
    pub fn new(arity: usize) -> Self {
        Self {
            log: RetainedLog::new(arity),
            upstream: vec![None],
            downstream: (0..arity).map(|_| None).collect(),
            config: SmartForkConfig::default(),
        }
    }

    pub fn from_config(arity: usize, config: SmartForkConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new(arity)
        })
    }

    /// Creates a fork node with the given number of outputs.
    pub fn handle(arity: usize) -> Handle<Self>
    where
        T: 'static,
    {
        Handle::new(Self::new(arity))
    }

    /// Attaches a new fork to an additional output of an existing fork.
    ///
    /// The upstream fork grows by one output port which gets connected to the input of the new
    /// fork. Like any new output it only observes events arriving from now on.
    pub fn branch<N>(upstream: &Handle<N>, arity: usize) -> Result<Handle<Self>, PipelineError>
    where
        N: Node<T> + 'static,
        T: 'static,
    {
        let port = {
            let mut node = upstream.try_borrow_mut()?;
            let port = node.output_arity();
            node.extend_output_arity(port + 1)?;
            port
        };

        let fork = Self::handle(arity);
        Connector::connect(upstream, port, &fork, 0)?;

        Ok(fork)
    }

    pub fn config(&self) -> &SmartForkConfig {
        &self.config
    }

    /// Number of events currently held in memory.
    pub fn retained(&self) -> usize {
        self.log.len()
    }

    /// Absolute sequence number of the oldest retained event.
    pub fn first_retained_position(&self) -> u64 {
        self.log.offset()
    }

    /// Number of events obtained from upstream since construction or the last reset.
    pub fn received(&self) -> u64 {
        self.log.offset() + self.log.len() as u64
    }

    /// Absolute sequence number of the next event the given output will read.
    pub fn cursor(&self, port: usize) -> Option<u64> {
        self.log.position(port)
    }

    fn upstream(&self) -> Result<&dyn Pullable<T>, PipelineError> {
        self.upstream[0]
            .as_deref()
            .ok_or(PipelineError::NotConnected {
                direction: Direction::Input,
                port: 0,
            })
    }

    /// Obtains one new event from upstream and retains it.
    fn fetch(&mut self, mode: PullMode) -> Result<Option<T>, PipelineError> {
        let upstream = self.upstream()?;
        let event = match mode {
            PullMode::Soft => upstream.pull()?,
            PullMode::Hard => {
                if !upstream.has_next_hard()? {
                    return Ok(None);
                }
                Some(upstream.pull_hard()?)
            }
        };

        let Some(event) = event else {
            return Ok(None);
        };

        self.log.append(event.clone());
        Ok(Some(event))
    }

    fn collect_garbage(&mut self) {
        if let Some(discarded) = self.log.tick(self.config.clean_interval) {
            debug!(
                discarded,
                retained = self.log.len(),
                "discarded events read by all outputs"
            );
        }
    }
}

impl<T> Node<T> for SmartFork<T>
where
    T: Clone,
{
    fn input_arity(&self) -> usize {
        1
    }

    fn output_arity(&self) -> usize {
        self.log.outputs()
    }

    fn push(&mut self, port: usize, event: T) -> Result<(), PipelineError> {
        check_input(port, 1)?;
        trace!("push to all outputs");
        push_tuple(
            &self.downstream,
            iter::repeat_n(event, self.downstream.len()),
        )
    }

    fn has_next(&mut self, port: usize, mode: PullMode) -> Result<NextStatus, PipelineError> {
        check_output(port, self.output_arity())?;

        if self.log.peek(port).is_some() {
            return Ok(NextStatus::Yes);
        }

        let upstream = self.upstream()?;
        match mode {
            PullMode::Soft => upstream.has_next(),
            PullMode::Hard => Ok(NextStatus::from(upstream.has_next_hard()?)),
        }
    }

    fn pull(&mut self, port: usize, mode: PullMode) -> Result<Option<T>, PipelineError> {
        check_output(port, self.output_arity())?;

        if let Some(event) = self.log.peek(port) {
            let event = event.clone();
            self.log.advance(port);
            trace!(port, "pull retained event");
            return Ok(Some(event));
        }

        // The cursor is at the end of the retained sequence, exactly one event is needed from
        // upstream. Bookkeeping only changes once it arrived.
        let Some(event) = self.fetch(mode)? else {
            return Ok(None);
        };
        self.log.advance(port);
        trace!(port, "pull new event from upstream");
        self.collect_garbage();

        Ok(Some(event))
    }

    fn bind_output(
        &mut self,
        port: usize,
        pushable: Box<dyn Pushable<T>>,
    ) -> Result<(), PipelineError> {
        check_output(port, self.output_arity())?;
        self.downstream[port] = Some(pushable);
        Ok(())
    }

    fn bind_input(
        &mut self,
        port: usize,
        pullable: Box<dyn Pullable<T>>,
    ) -> Result<(), PipelineError> {
        check_input(port, 1)?;
        self.upstream[0] = Some(pullable);
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

        for _ in current..arity {
            self.log.add_output();
            self.downstream.push(None);
        }

        Ok(())
    }

    fn reset(&mut self) {
        self.log.clear();
    }
}

impl<T> Duplicate for SmartFork<T>
where
    T: Clone,
{
    fn duplicate(&self, preserve_state: bool) -> Self {
        let log = if preserve_state {
            self.log.clone()
        } else {
            RetainedLog::new(self.log.outputs())
        };

        Self {
            log,
            upstream: vec![None],
            downstream: (0..self.log.outputs()).map(|_| None).collect(),
            config: self.config.clone(),
        }
    }
}

impl<T> fmt::Debug for SmartFork<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmartFork")
            .field("outputs", &self.log.outputs())
            .field("retained", &self.log.len())
            .field("first_retained_position", &self.log.offset())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
