// SPDX-License-Identifier: MIT OR Apache-2.0

//! Helpers for testing pipelines.
use tracing_subscriber::EnvFilter;

use crate::error::PipelineError;
use crate::ports::Pullable;

/// Installs a log subscriber when `RUST_LOG` is set, does nothing otherwise.
pub fn setup_logging() {
    if std::env::var("RUST_LOG").is_ok() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }
}

/// Hard-pulls events until the output is exhausted or `limit` events were read.
pub fn drain<T>(output: &impl Pullable<T>, limit: usize) -> Result<Vec<T>, PipelineError> {
    let mut events = Vec::new();
    while events.len() < limit && output.has_next_hard()? {
        events.push(output.pull_hard()?);
    }
    Ok(events)
}
