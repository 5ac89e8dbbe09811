pub mod encoder;

pub use encoder::{EncodeError, Encoder};
