pub mod artist;
pub mod auth;
pub mod contact;
pub mod event;
pub mod event_artist;
pub mod gallery;
pub mod shared;
pub mod ticket;
pub mod user;
pub mod venue;
