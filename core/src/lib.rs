pub mod boundary;
pub mod classify;
pub mod config;
pub mod domain;
pub mod error;
pub mod geometry;
pub mod kernel;
pub mod mesher;
pub mod metrics;
pub mod naming;
pub mod physical;
pub mod units;

pub use config::{MesherConfig, MeshingOptions};
pub use error::{DomainError, DomainResult};
pub use kernel::{GeometryKernel, GeometrySession, PlanarKernel};
pub use mesher::{DecompositionReport, Mesher, RunSummary};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
