pub mod client;
pub mod error;
pub mod types;

pub use client::{GumloopClient, Transformer};
pub use error::GumloopError;
