//! Client application state and data flow.
//!
//! SYSTEM CONTEXT
//! ==============
//! `session` owns the durable sign-in, `route` decides what each navigation
//! renders, and `nav` tracks where the user is. The view controllers
//! (`dashboard`, `ingest`, `results`, `admin`) each receive a `ViewContext`
//! and talk to the server independently. Failures surface as `notify`
//! notices, never as errors returned to the front end.

pub mod admin;
pub mod dashboard;
pub mod ingest;
pub mod nav;
pub mod notify;
pub mod results;
pub mod route;
pub mod session;
pub mod view;
