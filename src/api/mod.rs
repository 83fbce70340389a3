pub mod client;

pub use client::{ApiError, ByteStream, DocumentClient};
