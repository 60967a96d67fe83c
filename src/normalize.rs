//! Axis unit normalization: zero-based time axes and canonical Gauss field
//! axes.

use crate::spectrum::{SpectrumKind, SpectrumType};

const FIELD_LABEL_G: &str = "Magnetic Field (G)";

/// Shift a time axis so its minimum becomes zero.
///
/// Applies when the spectrum type is time-swept (T1, T2, Rabi) or the label
/// suggests a time unit. EDFS is exempt even when its label superficially
/// matches — EDFS is a field sweep, and exported descriptors routinely tag
/// it with a leftover `us` unit.
pub fn zero_time_axis(x: &mut [f64], spectrum_type: SpectrumType, label: &str) {
    if spectrum_type.kind == SpectrumKind::Edfs {
        return;
    }

    let lower = label.to_lowercase();
    let is_time = ["time", "tau", " s", "ms", "us", "ns"]
        .iter()
        .any(|u| lower.contains(u));

    if !(spectrum_type.is_time_swept() || is_time) {
        return;
    }

    let min = x.iter().cloned().fold(f64::INFINITY, f64::min);
    if min.is_finite() && min != 0.0 {
        for v in x.iter_mut() {
            *v -= min;
        }
    }
}

/// Rescale a magnetic-field axis to Gauss and rewrite its label.
///
/// Recognized source units: Tesla (×10000), millitesla (×10), kilogauss
/// (×1000). EDFS sweeps whose axis tops out at ≤20 with no recognizable
/// unit are assumed kilogauss — a known export mislabeling.
pub fn normalize_field_axis(x: &mut [f64], label: &mut String, spectrum_type: SpectrumType) {
    let lower = label.to_lowercase();
    let is_field = lower.contains("gauss")
        || lower.contains("field")
        || label.contains('G')
        || spectrum_type.kind == SpectrumKind::Edfs;

    if !is_field || x.is_empty() {
        return;
    }

    let max = x.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    let scale = if label.contains("(T)") || label.contains("(Tesla)") {
        Some(10000.0)
    } else if label.contains("(mT)") {
        Some(10.0)
    } else if label.contains("(kG)") || lower.contains("(kg)") {
        Some(1000.0)
    } else if spectrum_type.kind == SpectrumKind::Edfs && max <= 20.0 {
        log::info!("EDFS axis maxes at {max}, assuming kilogauss");
        Some(1000.0)
    } else {
        None
    };

    if let Some(scale) = scale {
        for v in x.iter_mut() {
            *v *= scale;
        }
        *label = FIELD_LABEL_G.to_string();
    }
}
