//! Bitfinex venue integration: authentication, REST transport, payload
//! decoding and the public trades feed

pub mod auth;
pub mod decode;
pub mod messages;
pub mod rest;
pub mod websocket;
