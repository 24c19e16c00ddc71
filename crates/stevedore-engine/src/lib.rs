//! Container engine orchestration for stevedore.
//!
//! # Publish pipeline
//!
//! ```text
//! stevedore
//!   1. Daemon    ── docker daemon [-s driver]   (detached, never joined)
//!   2. Readiness ── docker info                 (3 probes, 5 s apart, best effort)
//!   3. Login     ── docker login -u _json_key   (streamed to the CI log)
//!   4. Build     ── docker build --pull --rm    (transient commit tag only)
//!   5. Tag       ── docker tag                  (one per requested tag)
//!   6. Push      ── docker push                 (bare repository, once)
//! ```
//!
//! Steps 3–6 run strictly sequentially and the first failure ends the run.
//! The daemon launch is fire-and-forget; its failures surface through the
//! readiness probe and, ultimately, through login.

pub mod client;
pub mod docker;
pub mod executor;
pub mod readiness;

pub use client::{EngineClient, PublishError};
pub use docker::DockerError;
pub use executor::{DockerExecutor, RealExecutor};
pub use readiness::{READY_ATTEMPTS, READY_DELAY, wait_for_engine};
