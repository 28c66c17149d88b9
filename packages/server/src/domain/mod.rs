//! Domain layer: value objects, entities and the collaborator interfaces the
//! chat core consumes.
//!
//! Concrete collaborators live in the infrastructure layer (dependency
//! inversion); the use cases only see the traits defined here.

pub mod entity;
pub mod error;
pub mod identity;
pub mod store;
pub mod value_object;

pub use entity::{
    ChatMessage, Credentials, Identity, IncomingMessage, MessageKind, StoredMessage,
};
pub use error::{IdentityError, StoreError, ValueObjectError};
pub use identity::IdentityValidator;
pub use store::MessageStore;
pub use value_object::{BoardId, SessionId, Timestamp, UserId};

#[cfg(test)]
pub use identity::MockIdentityValidator;
#[cfg(test)]
pub use store::MockMessageStore;
