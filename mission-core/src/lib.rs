//! Mission Control Core - Record Types
//!
//! Data structures shared by every other crate: typed identifiers, the seven
//! record kinds, closed enums, partial-update payloads, the clock capability
//! and the error hierarchy. No storage or business logic lives here.

mod clock;
mod entities;
mod enums;
mod error;
mod identity;
mod record;
mod update;

pub use clock::*;
pub use entities::*;
pub use enums::*;
pub use error::*;
pub use identity::*;
pub use record::*;
pub use update::*;
