//! Rule-based report extraction.
//!
//! Pure functions over the extracted report text:
//! section → line classification → measurement fields, with identity labels
//! scanned from the whole text. Nothing here performs I/O or returns an error.

pub mod section;
pub mod classify;
pub mod measurement;
pub mod identity;
pub mod assembler;

pub use section::*;
pub use classify::*;
pub use measurement::*;
pub use identity::*;
pub use assembler::*;
