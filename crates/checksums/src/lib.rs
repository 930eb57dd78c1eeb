#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
//! Rolling and strong per-block checksums used to build and consume
//! file signatures during delta transfer.
//!
//! - [`rolling`] implements the Adler-32-style weak checksum used to find
//!   candidate block boundaries in a cheap, incrementally updatable way.
//! - [`strong`] provides the MD5 digest used to confirm a candidate block
//!   match once the weak checksum collides.
//!
//! Both are combined by the `signature` crate into a [block
//! signature](https://en.wikipedia.org/wiki/Rsync#Algorithm): `(weak, strong)`
//! per fixed-size block of the basis file.

mod rolling;
pub mod strong;

pub use rolling::{RollingChecksum, RollingDigest, RollingError};
