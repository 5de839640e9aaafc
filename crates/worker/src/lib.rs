//! Background expiry sweep.
//!
//! Cache rows carry their own `expires_at`, so the read path never serves
//! stale comics even without this worker. The sweep exists to reclaim
//! storage: it deletes expired rows and their stored bitmaps in bounded
//! batches on an interval.

pub mod sweep;

pub use sweep::{sweep_once, SweepConfig, SweepStats};
