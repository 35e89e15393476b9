//! Mission Control Coordination
//!
//! The operations agents and the `mc` CLI call: creating and listing records,
//! partial updates, task assignment, notification delivery and calendar
//! upkeep. Per-entity rules are enforced here; persistence is delegated to an
//! [`EntityStore`](mission_storage::EntityStore).
//!
//! Human-typed references are mapped onto stored records by the [`resolve`]
//! module: identifier fragments by suffix, agent names case-insensitively.

mod coordinator;
pub mod resolve;

pub use coordinator::{Coordinator, Upserted, DEFAULT_ACTIVITY_LIMIT};
pub use resolve::{resolve_agent_name, resolve_suffix};
