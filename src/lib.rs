//! BES3T archive decoder.
//!
//! Decodes ZIP archives of Bruker BES3T export pairs — a `.DSC` text
//! descriptor plus a `.DTA` binary payload — into typed, axis-labeled 1-D
//! and 2-D EPR spectra. Descriptor metadata drives the binary layout, but
//! real-world exports lie about byte order and real/imaginary packing, so
//! the decoder recovers both heuristically and drops statistically
//! implausible channels.
//!
//! The entry point is [`parse_archive`]: raw archive bytes in, a sample
//! name and spectrum list out. The decoder is pure and synchronous; it
//! keeps no state between invocations, performs no I/O beyond the provided
//! buffer, and is safe to call concurrently on independent inputs. The
//! caller owns identifiers, persistence, and transport.
//!
//! Diagnostics go through the `log` facade; install any `log` backend to
//! capture them.

pub mod archive;
pub mod classify;
pub mod decode;
pub mod error;
pub mod filename;
pub mod layout;
pub mod metadata;
pub mod normalize;
pub mod spectrum;

pub use archive::{parse_archive, ParsedArchive, DEFAULT_SAMPLE_NAME};
pub use error::ArchiveError;
pub use spectrum::{
    AcquisitionParams, Spectrum, Spectrum1D, Spectrum2D, SpectrumKind, SpectrumType,
};
