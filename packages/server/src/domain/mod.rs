//! Domain layer: value objects, entities, and the interfaces the hub needs
//! from its collaborators (persistence gateway, message pusher).

pub mod entity;
pub mod envelope;
pub mod error;
pub mod gateway;
pub mod pusher;
pub mod session;
pub mod value_object;

pub use entity::{InboundEvent, Message, MessageStatus, MessageType};
pub use envelope::{DeliveryReport, Envelope, EnvelopeKind};
pub use error::{GatewayError, MessagePushError, StatusTransitionError, ValueObjectError};
pub use gateway::MessageGateway;
#[cfg(test)]
pub use gateway::MockMessageGateway;
pub use pusher::{MessagePusher, PusherChannel, PusherReceiver};
pub use session::{Session, SessionId, SessionInfo};
pub use value_object::{ChatId, MessageId, Timestamp, UserId};
