pub mod artist;
pub mod contact_message;
pub mod event;
pub mod event_artist;
pub mod gallery_image;
pub mod role;
pub mod role_permission;
pub mod ticket;
pub mod user;
pub mod venue;
