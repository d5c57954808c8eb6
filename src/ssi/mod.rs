//! Server-Side Include engine
//!
//! Expands `include`, `echo` and `if/else/endif` directives in markup before
//! it is sent to the client.

mod error;
mod parser;
mod processor;
mod variables;

pub use processor::Expander;
