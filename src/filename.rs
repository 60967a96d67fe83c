//! Acquisition parameter extraction from filenames.
//!
//! Instrument operators encode conditions in the filename, e.g.
//! `Ag_4p5K_200G_hpa20dB_p16_EDFS.DSC`: sample `Ag` at 4.5 K, 200 G field,
//! 20 dB amplifier gain, 16 ns pulse. `p` doubles as a decimal point since
//! `.` is unsafe in filenames. Each token is checked against every pattern
//! independently; unmatched tokens are kept verbatim for display.

use crate::spectrum::AcquisitionParams;

/// Extract structured parameters from a base filename (extension stripped,
/// `_`-separated tokens, first token is the sample name).
pub fn parse_params_from_name(raw_name: &str) -> AcquisitionParams {
    // Only a dot with at least one character on each side is an extension
    // separator; a trailing bare dot stays part of the name.
    let base = match raw_name.rfind('.') {
        Some(dot) if dot > 0 && dot + 1 < raw_name.len() => &raw_name[..dot],
        _ => raw_name,
    };

    let tokens: Vec<String> = base.split('_').filter(|t| !t.is_empty()).map(String::from).collect();
    let sample_name = tokens.first().cloned().unwrap_or_else(|| base.to_string());

    let mut params = AcquisitionParams {
        sample_name,
        tokens: tokens.clone(),
        ..Default::default()
    };

    for tok in &tokens {
        let lower = tok.to_lowercase();

        if let Some(v) = number_then(&lower, "k") {
            params.temperature_k = Some(v);
        }
        if let Some(v) = number_then(&lower, "g") {
            params.field_g = Some(v);
        }
        if let Some(v) = amplifier_gain(&lower) {
            params.amplifier_db = Some(v);
        } else if let Some(rest) = lower.strip_prefix("hpa") {
            if let Some((v, _)) = leading_number(rest) {
                params.amplifier_db = Some(v);
            }
        }
        if let Some(rest) = lower.strip_prefix('p') {
            if let Some((v, _)) = leading_number(rest) {
                params.pulse_width = Some(v);
            }
        }
        if let Some(rest) = lower.strip_prefix("sw") {
            if let Some((v, _)) = leading_number(rest) {
                params.spectral_width = Some(v);
            }
        }
    }

    params
}

/// Match a leading numeric literal immediately followed by `unit`.
fn number_then(token: &str, unit: &str) -> Option<f64> {
    let (value, len) = leading_number(token)?;
    token[len..].starts_with(unit).then_some(value)
}

/// `hpa`-prefixed (optional) gain in dB: `20db`, `hpa20db`, `hpa4p5db`.
fn amplifier_gain(token: &str) -> Option<f64> {
    let rest = token.strip_prefix("hpa").unwrap_or(token);
    number_then(rest, "db")
}

/// Scan a leading number with `p` or `.` as the decimal marker.
///
/// Returns the value and the byte length consumed, or None if the string
/// does not start with a digit.
fn leading_number(s: &str) -> Option<(f64, usize)> {
    let bytes = s.as_bytes();
    let mut end = 0;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == 0 {
        return None;
    }

    // Optional decimal part: ('p' | '.') digits+
    if end < bytes.len() && (bytes[end] == b'p' || bytes[end] == b'.') {
        let mut frac_end = end + 1;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if frac_end > end + 1 {
            end = frac_end;
        }
    }

    let literal = s[..end].replace('p', ".");
    literal.parse::<f64>().ok().map(|v| (v, end))
}
