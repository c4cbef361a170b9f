//! Runtime support for the reference models in [`sim`](../sim/index.html).

pub mod tracing;
