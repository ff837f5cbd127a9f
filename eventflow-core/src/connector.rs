// SPDX-License-Identifier: MIT OR Apache-2.0

use tracing::debug;

use crate::error::PipelineError;
use crate::node::{Handle, Node, check_input, check_output};
use crate::ports::{InputPushable, OutputPullable};

/// Wires output ports of processors to input ports of other processors.
///
/// A connection does not buffer anything itself: pushing into the upstream output is forwarded
/// synchronously into the downstream input, pulling from the downstream input pulls on demand
/// from the upstream output. The same connection serves both modes.
///
/// The downstream node keeps its upstream alive while the upstream only holds a weak reference to
/// its downstream. Whoever drives the pipeline needs to hold on to the handles of its sinks.
#[derive(Debug)]
pub struct Connector;

impl Connector {
    /// Connects `upstream_port` of `upstream` to `downstream_port` of `downstream`.
    ///
    /// Both ports are validated before anything is bound. Ports which were already connected get
    /// their previous binding replaced.
    pub fn connect<T, U, D>(
        upstream: &Handle<U>,
        upstream_port: usize,
        downstream: &Handle<D>,
        downstream_port: usize,
    ) -> Result<(), PipelineError>
    where
        T: 'static,
        U: Node<T> + 'static,
        D: Node<T> + 'static,
    {
        check_output(upstream_port, upstream.try_borrow()?.output_arity())?;
        check_input(downstream_port, downstream.try_borrow()?.input_arity())?;

        let pushable = InputPushable::weak(&downstream.shared(), downstream_port);
        upstream
            .try_borrow_mut()?
            .bind_output(upstream_port, Box::new(pushable))?;

        let pullable = OutputPullable::new(upstream.shared(), upstream_port);
        downstream
            .try_borrow_mut()?
            .bind_input(downstream_port, Box::new(pullable))?;

        debug!(upstream_port, downstream_port, "connected processors");

        Ok(())
    }

    /// Connects the first output of `upstream` to the first input of `downstream`.
    pub fn connect_single<T, U, D>(
        upstream: &Handle<U>,
        downstream: &Handle<D>,
    ) -> Result<(), PipelineError>
    where
        T: 'static,
        U: Node<T> + 'static,
        D: Node<T> + 'static,
    {
        Self::connect(upstream, 0, downstream, 0)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use crate::error::{Direction, PipelineError};
    use crate::ports::{NextStatus, Pullable, Pushable};
    use crate::processors::{Passthrough, QueueSink, QueueSource};
    use crate::single::Single;
    use crate::test_utils::drain;

    use super::Connector;

    fn relay<T: Clone + 'static>(events: Vec<T>) -> Vec<T> {
        let source = Single::handle(QueueSource::new(events).looping(false));
        let middle = Single::handle(Passthrough::new(1));
        Connector::connect_single(&source, &middle).unwrap();
        drain(&middle.pullable_output(0).unwrap(), usize::MAX).unwrap()
    }

    #[test]
    fn connects_pipelines_of_any_event_type() {
        assert_eq!(relay(vec![1u8, 2]), vec![1, 2]);
        assert_eq!(
            relay(vec![String::from("a"), String::from("b")]),
            vec!["a", "b"]
        );
    }

    #[test]
    fn adapters_know_their_port() {
        let node = Single::<_, u8>::handle(Passthrough::new(3));
        assert_eq!(node.pushable_input(2).unwrap().port(), 2);
        assert_eq!(node.pullable_output(1).unwrap().port(), 1);
    }

    #[test]
    fn push_through_chain() {
        let first = Single::handle(Passthrough::new(1));
        let second = Single::handle(Passthrough::new(1));
        let sink = Single::handle(QueueSink::new(1));

        Connector::connect_single(&first, &second).unwrap();
        Connector::connect_single(&second, &sink).unwrap();

        let input = first.pushable_input(0).unwrap();
        for i in 0..3 {
            input.push(i).unwrap();
        }

        let sink = sink.borrow();
        let received: Vec<i32> = sink.processor().queue(0).unwrap().iter().copied().collect();
        assert_eq!(received, vec![0, 1, 2]);
    }

    #[test]
    fn pull_through_chain() {
        let source = Single::handle(QueueSource::new(vec!["a", "b"]).looping(false));
        let middle = Single::handle(Passthrough::new(1));
        Connector::connect_single(&source, &middle).unwrap();

        let output = middle.pullable_output(0).unwrap();
        assert_eq!(output.has_next().unwrap(), NextStatus::Yes);
        assert_eq!(output.pull().unwrap(), Some("a"));
        assert_eq!(output.pull_hard().unwrap(), "b");
        assert!(!output.has_next_hard().unwrap());
        assert_matches!(output.pull_hard(), Err(PipelineError::Exhausted { port: 0 }));
    }

    #[test]
    fn rejects_ports_outside_arity() {
        let upstream = Single::handle(Passthrough::new(1));
        let downstream = Single::<_, u8>::handle(Passthrough::new(2));

        assert_matches!(
            Connector::connect(&upstream, 1, &downstream, 0),
            Err(PipelineError::OutputArity { port: 1, arity: 1 })
        );
        assert_matches!(
            Connector::connect(&upstream, 0, &downstream, 2),
            Err(PipelineError::InputArity { port: 2, arity: 2 })
        );

        // Nothing got bound by the failed attempts.
        let input = upstream.pushable_input(0).unwrap();
        assert_matches!(
            input.push(1),
            Err(PipelineError::NotConnected {
                direction: Direction::Output,
                port: 0
            })
        );
    }

    #[test]
    fn reconnecting_replaces_binding() {
        let source = Single::handle(Passthrough::new(1));
        let old_sink = Single::handle(QueueSink::new(1));
        let new_sink = Single::handle(QueueSink::new(1));

        Connector::connect_single(&source, &old_sink).unwrap();
        Connector::connect_single(&source, &new_sink).unwrap();

        source.pushable_input(0).unwrap().push(7).unwrap();

        assert!(old_sink.borrow().processor().queue(0).unwrap().is_empty());
        assert_eq!(new_sink.borrow().processor().queue(0).unwrap().front(), Some(&7));
    }

    #[test]
    fn dropped_downstream_reports_disconnect() {
        let source = Single::handle(Passthrough::new(1));
        {
            let sink = Single::handle(QueueSink::new(1));
            Connector::connect_single(&source, &sink).unwrap();
        }

        let input = source.pushable_input(0).unwrap();
        assert_matches!(input.push(1), Err(PipelineError::Disconnected { port: 0 }));
    }

    #[test]
    fn cycles_are_detected() {
        let node = Single::handle(Passthrough::new(1));
        Connector::connect_single(&node, &node).unwrap();

        let input = node.pushable_input(0).unwrap();
        assert_matches!(input.push(1), Err(PipelineError::Reentrant));
    }
}
