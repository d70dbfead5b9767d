//! Shared error classification for shellbook crates.
//!
//! Every crate defines its own `snafu` error enum and implements
//! [`ErrorExt`] on it, mapping each variant to a [`StatusCode`].

pub mod ext;
pub mod status_code;

pub use ext::ErrorExt;
pub use snafu::Location;
pub use status_code::StatusCategory;
pub use status_code::StatusCode;
