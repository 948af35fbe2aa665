//! Integration testing module
//!
//! End-to-end tests against media synthesized by `fixtures`:
//! - Decoding to 16 kHz mono and stream selection
//! - Encode sessions and the `AudioFile` call sequence
//! - Probing


mod encode;
mod probe;
