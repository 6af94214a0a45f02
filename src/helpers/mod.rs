//! Helpers for decomposing and decoding URLs.

pub mod url;
