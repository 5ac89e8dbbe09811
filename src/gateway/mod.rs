//! Runs the HTTP router behind a function-as-a-service gateway.
//!
//! A gateway hands over a JSON event describing one HTTP request and expects a
//! JSON reply with a base64 body. [`handle`] translates the event into an
//! `http::Request`, drives a [`RequestHandler`] and folds the result back.

pub mod adapter;
pub mod error;
pub mod event;
pub mod handler;
pub mod request;

pub use adapter::handle;
pub use error::AdapterError;
pub use event::{EventBody, GatewayEvent, GatewayReply};
pub use handler::{BodyChunk, HandlerResponse, RequestHandler};
pub use request::translate_event;
