pub mod catalog;
pub mod contact;
pub mod embed;
pub mod message_status;
pub mod slug;
pub mod storage;

pub use catalog::{EventStatus, GalleryCategory};
pub use embed::{EmbedPlatform, Embedding};
pub use message_status::{MessageStatus, MessageType};
