//! # Attested Logs Testkit
//!
//! Testing utilities shared across the workspace.
//!
//! - **Fixtures**: deterministic two-party setups with fixed seeds
//! - **Generators**: proptest strategies for building valid chains
//! - **Vectors**: golden vectors that pin the canonical encoding

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{TestFixture, FIXED_TIMESTAMP};
pub use generators::{build_chain, ChainParams};
pub use vectors::{generate_all_vectors, GoldenVector};
