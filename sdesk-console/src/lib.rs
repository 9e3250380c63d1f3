//! # sdesk-console
//!
//! Terminal output helpers for *sdesk-update*.
//!
//! ## Modules
//!
//! - `writer`: writes messages behind a right-aligned prefix column, wrapping long lines.
//! - `print`: a `tracing` layer that routes log events through the writer, plus message macros.
//!

#[cfg(feature = "print")]
pub mod print;
pub mod writer;

pub use console;

#[cfg(feature = "print")]
pub use print::SdeskLayer;

use writer::Writer;

pub static WRITER: std::sync::LazyLock<Writer> = std::sync::LazyLock::new(Writer::default);
