//! Wire-protocol crate for the kassa payment service.
//!
//! Contains everything that is dictated by the Robokassa gateway protocol
//! or shared between the service and its clients: the checksum scheme
//! ([`signature`]), the redirect-URL builder ([`gateway`]), the webhook
//! parameter contract ([`objects::webhook`]), and the API request/response
//! objects ([`objects`]). Nothing in this crate touches a database.

pub mod config;
pub mod gateway;
pub mod objects;
pub mod signature;
