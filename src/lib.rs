//! kgpipe - drives a knowledge-graph backend through upload, build,
//! visualize and analyze.
//!
//! The [`controller::PipelineController`] owns one session's pipeline and
//! talks to the backend through a [`gateway::Gateway`]. The console
//! ([`server`]) and the batch runner ([`report`]) are both thin shells
//! around it.

pub mod busy;
pub mod config;
pub mod controller;
pub mod gateway;
pub mod model;
pub mod mount;
pub mod page;
pub mod render;
pub mod report;
pub mod server;
pub mod state;
pub mod status;
