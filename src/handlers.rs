pub mod admin;
pub mod cart;
pub mod catalog;
pub mod orders;
pub mod repairs;
pub mod users;
pub mod webhooks;
