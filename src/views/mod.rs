pub mod chat;
pub mod message;
pub mod preview;
pub mod shared;
pub mod sidebar;

pub use chat::ChatView;
pub use message::MessageBubble;
pub use preview::PreviewPanel;
pub use sidebar::Sidebar;
