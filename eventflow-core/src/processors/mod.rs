// SPDX-License-Identifier: MIT OR Apache-2.0

//! Basic processors to feed events into pipelines, forward them and collect them at the end.
mod passthrough;
mod sink;
mod source;

pub use passthrough::Passthrough;
pub use sink::QueueSink;
pub use source::QueueSource;
