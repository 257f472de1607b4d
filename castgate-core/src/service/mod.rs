pub mod channels;
pub mod directory;
pub mod ingest;
pub mod live;
pub mod login;
pub mod sealer;
pub mod session;

pub use channels::{ChannelDef, ChannelService};
pub use directory::DirectoryService;
pub use ingest::IngestService;
pub use live::LiveRegistry;
pub use login::{LoginService, LoginStart};
pub use sealer::CookieSealer;
pub use session::SessionService;
