pub mod artist;
pub mod auth;
pub mod contact;
pub mod embedding;
pub mod event;
pub mod event_artist;
pub mod gallery;
pub mod ticket;
pub mod uploads;
pub mod user;
pub mod venue;
