//! Spectrum type inference from filename, metadata, and dimensionality.

use crate::metadata::Metadata;
use crate::spectrum::{SpectrumKind, SpectrumType};

/// Classify a spectrum from its base name (path allowed), descriptor
/// metadata, and whether the payload is a matrix (`YPTS > 1`).
///
/// Filename substrings win, checked in fixed priority order; the `EXPT`
/// experiment-family field is the fallback. A 1-D payload whose name claims
/// "2D" is demoted to CW — emitting a matrix type for a vector payload would
/// break every consumer that reaches for `z_data`.
pub fn infer_spectrum_type(name: &str, meta: &Metadata, is_2d: bool) -> SpectrumType {
    let lower = name.to_lowercase();

    let base = if lower.contains("edfs") {
        SpectrumKind::Edfs
    } else if lower.contains("rabi") {
        SpectrumKind::Rabi
    } else if lower.contains("t1") {
        SpectrumKind::T1
    } else if lower.contains("t2") {
        SpectrumKind::T2
    } else if lower.contains("hyscore") {
        SpectrumKind::Hyscore
    } else if lower.contains("2d") {
        SpectrumKind::TwoD
    } else if lower.contains("cw") {
        SpectrumKind::Cw
    } else {
        let family = meta.get_str("EXPT", "");
        if family.contains("CW") {
            SpectrumKind::Cw
        } else if family.contains("PULSED") {
            // Pulsed without a more specific name reads as T1-like
            SpectrumKind::T1
        } else {
            SpectrumKind::Unknown
        }
    };

    if is_2d {
        SpectrumType::two_d(base)
    } else {
        let kind = match base {
            SpectrumKind::TwoD => SpectrumKind::Cw,
            other => other,
        };
        SpectrumType::one_d(kind)
    }
}
