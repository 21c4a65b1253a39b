//! Structural matching over chiplet operation queues.
//!
//! Nothing here does I/O or fails: malformed peers, unknown chiplets and
//! unmatched operations are all just residue.

pub mod deadlock;
pub mod filter;
pub mod pair;

pub use deadlock::{BlockedHead, Verdict, verify_deadlock_free};
pub use filter::{remove_compute_operations, remove_dram_operations};
pub use pair::{eliminate_matched_pairs, find_eliminable_pair, is_fixpoint};
