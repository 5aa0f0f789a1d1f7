//! Running without a cluster.

pub mod directory;
pub mod pods;

pub use directory::{SimPod, SimulatedDirectory};
