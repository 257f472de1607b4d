pub mod channel;
pub mod id;
pub mod liveness;
pub mod session;

pub use channel::{effective_announce, Channel, ChannelAuth, ChannelCredential};
pub use id::OwnerId;
pub use liveness::LiveChannel;
pub use session::SessionIdentity;
