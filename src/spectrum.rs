//! Output data model: typed, axis-labeled spectra and acquisition parameters.

use serde::{Deserialize, Serialize};

/// Base experiment kind detected from filename/metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpectrumKind {
    Cw,
    Edfs,
    Rabi,
    T1,
    T2,
    Hyscore,
    TwoD,
    Unknown,
}

impl std::fmt::Display for SpectrumKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpectrumKind::Cw => write!(f, "CW"),
            SpectrumKind::Edfs => write!(f, "EDFS"),
            SpectrumKind::Rabi => write!(f, "Rabi"),
            SpectrumKind::T1 => write!(f, "T1"),
            SpectrumKind::T2 => write!(f, "T2"),
            SpectrumKind::Hyscore => write!(f, "HYSCORE"),
            SpectrumKind::TwoD => write!(f, "2D"),
            SpectrumKind::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Final spectrum type: a base kind plus whether the payload is a matrix.
///
/// Displays as the conventional strings: `"T1"`, `"2D T1"`, `"HYSCORE"`,
/// `"2D"`. HYSCORE is inherently two-dimensional and never takes the
/// `"2D "` prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpectrumType {
    pub kind: SpectrumKind,
    pub matrix: bool,
}

impl SpectrumType {
    pub fn one_d(kind: SpectrumKind) -> Self {
        Self { kind, matrix: false }
    }

    pub fn two_d(kind: SpectrumKind) -> Self {
        Self { kind, matrix: true }
    }

    /// True for time-swept relaxation/nutation experiments (T1, T2, Rabi).
    pub fn is_time_swept(&self) -> bool {
        matches!(
            self.kind,
            SpectrumKind::T1 | SpectrumKind::T2 | SpectrumKind::Rabi
        )
    }
}

impl std::fmt::Display for SpectrumType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !self.matrix {
            return write!(f, "{}", self.kind);
        }
        match self.kind {
            SpectrumKind::Hyscore => write!(f, "HYSCORE"),
            SpectrumKind::TwoD | SpectrumKind::Unknown => write!(f, "2D"),
            kind => write!(f, "2D {}", kind),
        }
    }
}

impl Serialize for SpectrumType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl std::str::FromStr for SpectrumKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CW" => Ok(SpectrumKind::Cw),
            "EDFS" => Ok(SpectrumKind::Edfs),
            "Rabi" => Ok(SpectrumKind::Rabi),
            "T1" => Ok(SpectrumKind::T1),
            "T2" => Ok(SpectrumKind::T2),
            "HYSCORE" => Ok(SpectrumKind::Hyscore),
            "2D" => Ok(SpectrumKind::TwoD),
            "Unknown" => Ok(SpectrumKind::Unknown),
            other => Err(format!("unknown spectrum kind: {other}")),
        }
    }
}

impl std::str::FromStr for SpectrumType {
    type Err = String;

    /// Inverse of `Display`. A bare `"HYSCORE"` reads back as a matrix
    /// type, its conventional form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "2D" {
            return Ok(SpectrumType::two_d(SpectrumKind::TwoD));
        }
        if s == "HYSCORE" {
            return Ok(SpectrumType::two_d(SpectrumKind::Hyscore));
        }
        if let Some(rest) = s.strip_prefix("2D ") {
            return rest.parse().map(SpectrumType::two_d);
        }
        s.parse().map(SpectrumType::one_d)
    }
}

impl<'de> Deserialize<'de> for SpectrumType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Structured acquisition parameters extracted from the base filename.
///
/// Tokens that match no pattern are kept verbatim in `tokens` for display.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AcquisitionParams {
    pub sample_name: String,
    pub tokens: Vec<String>,
    pub temperature_k: Option<f64>,
    pub field_g: Option<f64>,
    pub amplifier_db: Option<f64>,
    pub pulse_width: Option<f64>,
    pub spectral_width: Option<f64>,
}

/// A one-dimensional spectrum: shared x axis, real and imaginary traces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spectrum1D {
    pub filename: String,
    #[serde(rename = "type")]
    pub spectrum_type: SpectrumType,
    pub params: Option<AcquisitionParams>,
    pub x_label: String,
    pub y_label: String,
    pub x_data: Vec<f64>,
    pub real_data: Vec<f64>,
    pub imag_data: Vec<f64>,
}

/// A two-dimensional spectrum: x/y axes plus a rectangular intensity matrix.
///
/// `z_data` holds `y_data.len()` rows of `x_data.len()` values each.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spectrum2D {
    pub filename: String,
    #[serde(rename = "type")]
    pub spectrum_type: SpectrumType,
    pub params: Option<AcquisitionParams>,
    pub x_label: String,
    pub y_label: String,
    pub x_data: Vec<f64>,
    pub y_data: Vec<f64>,
    pub z_data: Vec<Vec<f64>>,
}

/// Either spectrum shape; serialized untagged so consumers discriminate on
/// the presence of `y_data`/`z_data`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Spectrum {
    OneD(Spectrum1D),
    TwoD(Spectrum2D),
}

impl Spectrum {
    pub fn filename(&self) -> &str {
        match self {
            Spectrum::OneD(s) => &s.filename,
            Spectrum::TwoD(s) => &s.filename,
        }
    }

    pub fn spectrum_type(&self) -> SpectrumType {
        match self {
            Spectrum::OneD(s) => s.spectrum_type,
            Spectrum::TwoD(s) => s.spectrum_type,
        }
    }

    pub fn params(&self) -> Option<&AcquisitionParams> {
        match self {
            Spectrum::OneD(s) => s.params.as_ref(),
            Spectrum::TwoD(s) => s.params.as_ref(),
        }
    }
}
