//! Check-in input schema
//!
//! Parsing of check-in histories (JSON array or NDJSON) and the validation
//! rules applied to individual records before they are stored.

mod checkin;
mod parser;

pub use checkin::*;
pub use parser::*;
