//! Search for 64-bit multipliers of full-period congruential generators,
//! ranked by the spectral test.
//!
//! - `rng`: splittable SplitMix streams, one per worker
//! - `numeric`: primality and lattice reduction backends
//! - `spectral`: dual-lattice figures of merit and the harmonic score
//! - `search`: candidate filter, workers and the parallel coordinator
//! - `report`: candidates table and shortlisting

pub mod error;
pub mod numeric;
pub mod report;
pub mod rng;
pub mod search;
pub mod spectral;

pub use error::SearchError;
