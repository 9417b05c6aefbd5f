//! vigia — CLI dashboard for branch/terminal status monitoring.
//!
//! The pipeline is a straight line of pure stages:
//! fetch ([`api`]) → normalize ([`model`]) → group/aggregate ([`aggregate`])
//! → filter/sort ([`pipeline`]) → project ([`render`]) → print (`cli`).
//! [`controller`] owns the retry cadence around the fetch.

pub mod aggregate;
pub mod api;
pub mod cli;
pub mod config;
pub mod controller;
pub mod model;
pub mod pipeline;
pub mod render;
