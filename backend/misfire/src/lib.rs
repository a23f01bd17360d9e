//! `cronward-misfire` — storage for misfire detection and catch-up.
//!
//! A [`MisfireStore`] records each task's next fire time and the set of
//! tasks whose run was missed or could not proceed. [`MisfireLedger`] is
//! the scheduler-facing helper that drives those records through a task's
//! lifecycle.

pub mod ledger;
pub mod memory;
pub mod open;
pub mod sqlite;
pub mod store;

pub use ledger::{MisfireCheck, MisfireLedger, DEFAULT_GRACE};
pub use memory::MemoryMisfireStore;
pub use open::open_store;
pub use sqlite::SqliteMisfireStore;
pub use store::{Entry, MisfireStore};
