//! Client state and data-flow layer for the sentiment analysis dashboard.
//!
//! SYSTEM CONTEXT
//! ==============
//! `net` speaks the server's REST contract, `state` holds the session, route
//! guard and view controllers, and `app` wires them together for a front end.
//! `render` turns view state into text for the terminal front end in
//! `main.rs`.

pub mod app;
pub mod config;
pub mod net;
pub mod render;
pub mod state;
pub mod util;

#[cfg(test)]
pub(crate) mod test_helpers;
