mod online;
mod registry;
mod ws;

pub use registry::{ConnectionId, EventReceiver, EventSender, PresenceEvent, PresenceRegistry, PushError, PUSH_QUEUE_CAPACITY};
pub(crate) use online::online_users;
pub(crate) use ws::presence_ws;
