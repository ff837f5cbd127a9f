// SPDX-License-Identifier: MIT OR Apache-2.0

use eventflow_core::processors::{Passthrough, QueueSink, QueueSource};
use eventflow_core::test_utils::{drain, setup_logging};
use eventflow_core::{
    Connector, Flow, Handle, NextStatus, Outputs, Processor, ProcessorError, Pullable, Pushable,
    Single, SmartFork, Tuple,
};

/// Adds up one event from each of its two inputs.
#[derive(Clone, Debug)]
struct Sum;

impl Processor<u32> for Sum {
    fn input_arity(&self) -> usize {
        2
    }

    fn output_arity(&self) -> usize {
        1
    }

    fn compute(
        &mut self,
        inputs: Tuple<u32>,
        outputs: &mut Outputs<u32>,
    ) -> Result<Flow, ProcessorError> {
        outputs.emit_one(inputs.iter().sum());
        Ok(Flow::Continue)
    }

    fn duplicate(&self, _preserve_state: bool) -> Self {
        Sum
    }
}

fn finite<T: Clone + 'static>(events: Vec<T>) -> Handle<Single<QueueSource<T>, T>> {
    Single::handle(QueueSource::new(events).looping(false))
}

fn sink<T: Clone + 'static>() -> Handle<Single<QueueSink<T>, T>> {
    Single::handle(QueueSink::new(1))
}

fn received<T: Clone>(sink: &Handle<Single<QueueSink<T>, T>>) -> Vec<T> {
    sink.borrow()
        .processor()
        .queue(0)
        .map(|queue| queue.iter().cloned().collect())
        .unwrap_or_default()
}

#[test]
fn source_driven_push_reaches_every_sink() {
    setup_logging();

    let source = finite((1..=5).collect::<Vec<u32>>());
    let fork = SmartFork::handle(2);
    let left = sink();
    let right = sink();
    Connector::connect_single(&source, &fork).unwrap();
    Connector::connect(&fork, 0, &left, 0).unwrap();
    Connector::connect(&fork, 1, &right, 0).unwrap();

    let mut steps = 1;
    while source.borrow_mut().advance().unwrap() == Flow::Continue {
        steps += 1;
    }

    assert_eq!(steps, 5);
    assert_eq!(received(&left), vec![1, 2, 3, 4, 5]);
    assert_eq!(received(&right), vec![1, 2, 3, 4, 5]);
    // Pushed events are never retained.
    assert_eq!(fork.borrow().retained(), 0);
}

#[test]
fn sink_driven_pull_does_minimal_work() {
    setup_logging();

    let source = finite(vec!['a', 'b', 'c']);
    let middle = Single::handle(Passthrough::new(1));
    let end = sink();
    Connector::connect_single(&source, &middle).unwrap();
    Connector::connect_single(&middle, &end).unwrap();

    assert_eq!(end.borrow_mut().advance().unwrap(), Flow::Continue);
    assert_eq!(received(&end), vec!['a']);
    assert_eq!(source.borrow().processor().position(), 1);

    while end.borrow_mut().advance().unwrap() == Flow::Continue {}
    assert_eq!(received(&end), vec!['a', 'b', 'c']);
}

#[test]
fn joined_inputs_are_only_consumed_together() {
    setup_logging();

    let left = finite(vec![1, 2, 3]);
    let right = finite(vec![10, 20]);
    let sum = Single::handle(Sum);
    Connector::connect(&left, 0, &sum, 0).unwrap();
    Connector::connect(&right, 0, &sum, 1).unwrap();

    let output = sum.pullable_output(0).unwrap();
    assert_eq!(drain(&output, 10).unwrap(), vec![11, 22]);
    assert!(!output.has_next_hard().unwrap());

    // The third event of the left input was not consumed by the failed check.
    let rest = left.pullable_output(0).unwrap();
    assert_eq!(rest.pull_hard().unwrap(), 3);
}

#[test]
fn soft_check_reports_exhausted_inputs() {
    let left = finite(vec![1u32]);
    let right = finite(Vec::new());
    let sum = Single::handle(Sum);
    Connector::connect(&left, 0, &sum, 0).unwrap();
    Connector::connect(&right, 0, &sum, 1).unwrap();

    // The empty source only learns it is exhausted by trying once.
    let output = sum.pullable_output(0).unwrap();
    assert_eq!(output.has_next().unwrap(), NextStatus::Maybe);
    assert_eq!(output.has_next().unwrap(), NextStatus::No);
    assert_eq!(left.pullable_output(0).unwrap().pull().unwrap(), Some(1));
}

#[test]
fn branches_of_branches_see_the_whole_stream() {
    setup_logging();

    let source = finite((0..10).collect::<Vec<u64>>());
    let root = SmartFork::handle(1);
    Connector::connect_single(&source, &root).unwrap();
    let child = SmartFork::branch(&root, 2).unwrap();
    let grandchild = SmartFork::branch(&child, 1).unwrap();

    let expected: Vec<u64> = (0..10).collect();
    assert_eq!(drain(&root.pullable_output(0).unwrap(), 100).unwrap(), expected);
    assert_eq!(drain(&grandchild.pullable_output(0).unwrap(), 100).unwrap(), expected);
    assert_eq!(drain(&child.pullable_output(1).unwrap(), 100).unwrap(), expected);
    assert_eq!(drain(&child.pullable_output(0).unwrap(), 100).unwrap(), expected);

    // Upstream of the root was read exactly once.
    assert_eq!(root.borrow().received(), 10);
    assert_eq!(child.borrow().received(), 10);
}

#[test]
fn push_into_the_middle_of_a_pipeline() {
    let head = Single::handle(Passthrough::new(1));
    let fork = SmartFork::handle(3);
    Connector::connect_single(&head, &fork).unwrap();
    let sinks: Vec<_> = (0..3)
        .map(|port| {
            let sink = sink();
            Connector::connect(&fork, port, &sink, 0).unwrap();
            sink
        })
        .collect();

    let input = fork.pushable_input(0).unwrap();
    input.push("direct").unwrap();
    head.pushable_input(0).unwrap().push("through head").unwrap();

    for sink in &sinks {
        assert_eq!(received(sink), vec!["direct", "through head"]);
    }
}
