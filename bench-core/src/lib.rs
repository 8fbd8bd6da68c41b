//! Core library for the scanner-bait fixture server
//!
//! Every fixture route shares one small pipeline: extract an
//! attacker-influenceable value from the request, run it through a weak
//! secret processor (a legacy block cipher or a predictable token
//! generator), and write a derived form to the response and the shared
//! append-only password file. This crate holds that pipeline; the HTTP
//! surface lives in `bench-server`.

pub mod config;
pub mod crypto;
pub mod db;
pub mod error;
pub mod extract;
pub mod session;
pub mod sink;
pub mod token;

pub use config::BenchConfig;
pub use error::{BenchError, CryptoError};
pub use extract::RequestValue;
