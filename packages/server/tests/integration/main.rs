mod common;

mod artists;
mod auth;
mod contact;
mod events;
mod gallery;
mod tickets;
mod users;
mod venues;
