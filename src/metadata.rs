//! BES3T descriptor (.DSC) text parsing and axis reconstruction.
//!
//! Descriptor dialects vary between spectrometer firmware revisions, so the
//! parser is deliberately permissive: lines that match neither the `KEY=VAL`
//! nor the `KEY VAL` form are skipped, and malformed input degrades to a
//! smaller metadata set rather than an error.

use std::collections::HashMap;

/// Flat key→value metadata from one descriptor file. Keys are upper-cased.
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    map: HashMap<String, String>,
}

impl Metadata {
    /// Parse descriptor text into a metadata map.
    ///
    /// Comment lines start with `*`. A line containing `=` splits on the
    /// first `=`; otherwise it splits on the first run of whitespace.
    pub fn parse(text: &str) -> Self {
        let mut map = HashMap::new();

        for line in text.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('*') {
                continue;
            }

            if let Some((key, val)) = trimmed.split_once('=') {
                map.insert(key.trim().to_uppercase(), val.trim().to_string());
                continue;
            }

            if let Some((key, val)) = trimmed.split_once(char::is_whitespace) {
                let val = val.trim();
                if !val.is_empty() {
                    map.insert(key.trim().to_uppercase(), val.to_string());
                }
            }
        }

        Metadata { map }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.map.contains_key(&key.to_uppercase())
    }

    pub fn get_str(&self, key: &str, fallback: &str) -> String {
        self.map
            .get(&key.to_uppercase())
            .cloned()
            .unwrap_or_else(|| fallback.to_string())
    }

    /// Integer accessor. Descriptors sometimes write counts as `1024.0`,
    /// so parse through f64 and truncate.
    pub fn get_int(&self, key: &str, fallback: i64) -> i64 {
        self.map
            .get(&key.to_uppercase())
            .and_then(|v| v.parse::<f64>().ok())
            .map(|v| v as i64)
            .unwrap_or(fallback)
    }

    pub fn get_float(&self, key: &str, fallback: f64) -> f64 {
        self.get_float_opt(key).unwrap_or(fallback)
    }

    /// Float accessor distinguishing "absent or unparseable" from a value.
    pub fn get_float_opt(&self, key: &str) -> Option<f64> {
        self.map
            .get(&key.to_uppercase())
            .and_then(|v| v.parse::<f64>().ok())
    }
}

/// Reconstruct a numeric axis for `axis` (`"X"` or `"Y"`) with `points`
/// samples.
///
/// Prefers `{axis}MIN`/`{axis}WID`, then `{axis}STRT`/`{axis}STOP`, and
/// falls back to the natural index sequence `0..points`.
pub fn axis_vector(meta: &Metadata, axis: &str, points: usize) -> Vec<f64> {
    if let (Some(min), Some(wid)) = (
        meta.get_float_opt(&format!("{axis}MIN")),
        meta.get_float_opt(&format!("{axis}WID")),
    ) {
        return linspace(min, wid, points);
    }

    if let (Some(start), Some(stop)) = (
        meta.get_float_opt(&format!("{axis}STRT")),
        meta.get_float_opt(&format!("{axis}STOP")),
    ) {
        return linspace(start, stop - start, points);
    }

    (0..points).map(|i| i as f64).collect()
}

fn linspace(start: f64, span: f64, points: usize) -> Vec<f64> {
    if points <= 1 {
        return vec![start];
    }
    let step = span / (points - 1) as f64;
    (0..points).map(|i| start + i as f64 * step).collect()
}
