//! Library side of the `deid` command: job manifests, pipeline wiring and
//! logging setup.

pub mod jobs;
pub mod logging;
pub mod pipeline;
