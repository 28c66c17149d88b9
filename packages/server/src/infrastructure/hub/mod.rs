//! In-memory chat hub.
//!
//! ```text
//! Hub (one per process)
//! └── Room (one per board, single event loop)
//!     └── Session (one per connection, bounded outbound queue)
//! ```
//!
//! Membership is owned by each room's event loop; the only lock is the hub's
//! board directory.

mod directory;
mod outbox;
mod room;
mod session;

pub use directory::Hub;
pub use outbox::{Inbox, Outbox, PushError};
pub use room::{MemberInfo, RoomError, RoomHandle};
pub use session::Session;
