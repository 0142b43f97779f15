//! Model providers and the tools agents can call.

pub mod client;
pub mod tools;
