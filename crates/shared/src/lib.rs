//! Types shared between the tarot client crates: domain records, backend wire
//! shapes, and the backend failure envelope.

pub mod domain;
pub mod error;
pub mod protocol;
