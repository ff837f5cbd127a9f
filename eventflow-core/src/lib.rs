// SPDX-License-Identifier: MIT OR Apache-2.0

#![cfg_attr(doctest, doc=include_str!("../README.md"))]

//! Cooperative push/pull dataflow kernel.
//!
//! Pipelines are built from processors with a fixed number of input and output ports, wired
//! together with the [`Connector`]. Events either get pushed in at the top, travelling eagerly
//! through every processor they reach, or pulled out at the bottom, in which case processors only
//! do as much upstream work as needed to produce the requested event. Both modes are plain
//! synchronous function calls, there are no threads or tasks involved.
//!
//! [`Fork`] and [`SmartFork`] replicate one stream to several outputs. The latter keeps a single
//! retained copy of every event with one read cursor per output, so outputs can be read at
//! different paces while memory stays bounded by how far apart they are.
//!
//! ```
//! use eventflow_core::processors::{QueueSink, QueueSource};
//! use eventflow_core::{Connector, Pullable, Single, SmartFork};
//!
//! # fn main() -> Result<(), eventflow_core::PipelineError> {
//! let source = Single::handle(QueueSource::new(vec![1, 2, 3]).looping(false));
//! let fork = SmartFork::handle(2);
//! Connector::connect_single(&source, &fork)?;
//!
//! let fast = fork.pullable_output(0)?;
//! let slow = fork.pullable_output(1)?;
//! assert_eq!(fast.pull_hard()?, 1);
//! assert_eq!(fast.pull_hard()?, 2);
//! assert_eq!(slow.pull_hard()?, 1);
//! # Ok(())
//! # }
//! ```
mod connector;
mod error;
mod fork;
mod node;
mod ports;
mod processor;
pub mod processors;
mod single;
mod smart_fork;
#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;

pub use connector::Connector;
pub use error::{ConfigError, Direction, PipelineError, ProcessorError};
pub use fork::{Fork, ForkNode};
pub use node::{Duplicate, Handle, Node};
pub use ports::{InputPushable, NextStatus, OutputPullable, PullMode, Pullable, Pushable};
pub use processor::{Flow, Outputs, Processor, Tuple};
pub use single::Single;
pub use smart_fork::{DEFAULT_CLEAN_INTERVAL, SmartFork, SmartForkConfig};
