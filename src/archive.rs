//! Archive walking and spectrum assembly.
//!
//! Enumerates every descriptor in the ZIP, pairs it with its data file, and
//! runs the decode pipeline per pair. Any failure while processing one pair
//! is logged and skipped — one corrupt export never aborts the batch.

use std::io::{Cursor, Read, Seek};

use serde::Serialize;
use zip::ZipArchive;

use crate::classify::infer_spectrum_type;
use crate::decode::{self, DecodedChannel};
use crate::error::{ArchiveError, PairError};
use crate::filename::parse_params_from_name;
use crate::layout::{self, ChannelConfig};
use crate::metadata::{axis_vector, Metadata};
use crate::normalize;
use crate::spectrum::{AcquisitionParams, Spectrum, Spectrum1D, Spectrum2D, SpectrumType};

/// Sample name reported when no spectrum in the archive parses.
pub const DEFAULT_SAMPLE_NAME: &str = "Uploaded Sample";

const INTENSITY_LABEL: &str = "Intensity (a.u.)";

/// Decoded archive: the sample name inferred from the first parsed
/// spectrum, plus every spectrum that survived decoding.
#[derive(Debug, Clone, Serialize)]
pub struct ParsedArchive {
    pub sample_name: String,
    pub spectra: Vec<Spectrum>,
    pub count: usize,
}

/// Decode a ZIP archive of BES3T descriptor/data pairs.
///
/// Fails only when the buffer is not a readable archive; individual
/// malformed pairs degrade to fewer spectra in the result.
pub fn parse_archive(content: &[u8]) -> Result<ParsedArchive, ArchiveError> {
    let mut archive = ZipArchive::new(Cursor::new(content))?;

    // Walk entries in archive order; file_names() iterates a hash map and
    // would make the sample-name choice nondeterministic.
    let mut names = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        names.push(archive.by_index(i)?.name().to_string());
    }

    let mut spectra = Vec::new();
    for dsc_path in names.iter().filter(|n| n.to_lowercase().ends_with(".dsc")) {
        match process_descriptor(&mut archive, &names, dsc_path) {
            Ok(mut pair_spectra) => spectra.append(&mut pair_spectra),
            Err(err) => log::warn!("skipping {dsc_path}: {err}"),
        }
    }

    let sample_name = spectra
        .first()
        .and_then(Spectrum::params)
        .map(|p| p.sample_name.clone())
        .unwrap_or_else(|| DEFAULT_SAMPLE_NAME.to_string());

    let count = spectra.len();
    Ok(ParsedArchive {
        sample_name,
        spectra,
        count,
    })
}

fn process_descriptor<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    names: &[String],
    dsc_path: &str,
) -> Result<Vec<Spectrum>, PairError> {
    let dsc_bytes = read_entry(archive, dsc_path)?;
    // Descriptors occasionally carry Latin-1 bytes; decode lossily rather
    // than dropping the pair.
    let meta = Metadata::parse(&String::from_utf8_lossy(&dsc_bytes));

    let base_name = &dsc_path[..dsc_path.len() - 4];
    let dta_path = find_data_file(names, base_name).ok_or_else(|| PairError::MissingData {
        descriptor: dsc_path.to_string(),
    })?;
    let payload = read_entry(archive, &dta_path)?;

    decode_pair(&meta, &payload, base_name)
}

fn read_entry<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Vec<u8>, PairError> {
    let mut file = archive.by_name(name)?;
    let mut buf = Vec::new();
    file.read_to_end(&mut buf)?;
    Ok(buf)
}

/// Locate the data file for a descriptor: exact `.DTA`/`.dta` substitution
/// first, then a same-directory substring search.
fn find_data_file(names: &[String], base_name: &str) -> Option<String> {
    for candidate in [format!("{base_name}.DTA"), format!("{base_name}.dta")] {
        if names.iter().any(|n| n == &candidate) {
            return Some(candidate);
        }
    }

    let (folder, stem) = match base_name.rsplit_once('/') {
        Some((folder, stem)) => (folder, stem),
        None => ("", base_name),
    };
    let stem = stem.to_lowercase();

    names
        .iter()
        .find(|n| {
            let lower = n.to_lowercase();
            let same_dir = match n.rsplit_once('/') {
                Some((f, _)) => f == folder,
                None => folder.is_empty(),
            };
            same_dir && lower.ends_with(".dta") && lower.contains(&stem)
        })
        .cloned()
}

fn decode_pair(
    meta: &Metadata,
    payload: &[u8],
    base_name: &str,
) -> Result<Vec<Spectrum>, PairError> {
    let xpts = meta.get_int("XPTS", 0).max(0) as usize;
    let ypts = meta.get_int("YPTS", 1).max(1) as usize;
    if xpts == 0 {
        return Err(PairError::BadDimensions { xpts, ypts });
    }
    // Dimensions come straight from an untrusted descriptor; an absurd
    // product must fail this pair, not the whole invocation.
    let points = xpts
        .checked_mul(ypts)
        .ok_or(PairError::BadDimensions { xpts, ypts })?;

    let configs =
        layout::resolve_layouts(meta, points).ok_or(PairError::OversizedLayout)?;
    let expected = layout::expected_bytes(&configs).ok_or(PairError::OversizedLayout)?;
    if expected != payload.len() {
        // Strict contract: dropping an ambiguous file beats emitting
        // garbage samples.
        return Err(PairError::SizeMismatch {
            expected,
            got: payload.len(),
        });
    }

    let spectrum_type = infer_spectrum_type(base_name, meta, ypts > 1);
    let filename_only = base_name.rsplit('/').next().unwrap_or(base_name);
    let params = parse_params_from_name(filename_only);

    let mut x_label = format!(
        "{} ({})",
        meta.get_str("XNAM", ""),
        meta.get_str("XUNI", "")
    );
    let mut x_vector = axis_vector(meta, "X", xpts);
    normalize::zero_time_axis(&mut x_vector, spectrum_type, &x_label);
    normalize::normalize_field_axis(&mut x_vector, &mut x_label, spectrum_type);

    let y_label = format!(
        "{} ({})",
        meta.get_str("YNAM", ""),
        meta.get_str("YUNI", "")
    );

    let ctx = AssemblyContext {
        spectrum_type,
        params,
        x_label,
        y_label,
        x_vector,
        xpts,
        ypts,
    };

    // Fast path: two synchronized complex channels packed as one flat
    // big-endian double array of [R1,I1,R2,I2] quadruplets.
    if configs.iter().any(|c| c.is_complex) {
        if let Some((real, imag)) = decode::decode_quad_interleaved(payload, points) {
            log::info!("quad-interleaved payload detected for {filename_only}");
            return Ok(vec![ctx.assemble(meta, filename_only.to_string(), real, imag)]);
        }
    }

    let channels = decode_channels(payload, &configs, xpts);
    let keep = quality_mask(&channels);
    let multi = configs.len() > 1;

    let spectra = channels
        .into_iter()
        .enumerate()
        .filter(|(idx, _)| keep[*idx])
        .map(|(idx, ch)| {
            let filename = if multi {
                format!("{filename_only}_ch{}", idx + 1)
            } else {
                filename_only.to_string()
            };
            ctx.assemble(meta, filename, ch.real, ch.imag)
        })
        .collect();

    Ok(spectra)
}

fn decode_channels(payload: &[u8], configs: &[ChannelConfig], xpts: usize) -> Vec<DecodedChannel> {
    let mut channels = Vec::with_capacity(configs.len());
    let mut offset = 0;
    for config in configs {
        let chunk = &payload[offset..offset + config.byte_count];
        offset += config.byte_count;
        channels.push(decode::decode_channel(chunk, config, xpts));
    }
    channels
}

/// Multi-channel acquisitions often multiplex a diagnostic channel that is
/// pure noise next to the primary signal. When some but not all channels
/// score clean, keep only the clean ones.
fn quality_mask(channels: &[DecodedChannel]) -> Vec<bool> {
    if channels.len() <= 1 {
        return vec![true; channels.len()];
    }

    let clean: Vec<bool> = channels
        .iter()
        .map(|c| c.real_score < decode::NOISE_SCORE)
        .collect();
    let n_clean = clean.iter().filter(|&&c| c).count();

    if n_clean > 0 && n_clean < channels.len() {
        log::info!(
            "quality filter: dropping {} noisy channel(s)",
            channels.len() - n_clean
        );
        clean
    } else {
        vec![true; channels.len()]
    }
}

/// Shared per-pair fields threaded through spectrum assembly.
struct AssemblyContext {
    spectrum_type: SpectrumType,
    params: AcquisitionParams,
    x_label: String,
    y_label: String,
    x_vector: Vec<f64>,
    xpts: usize,
    ypts: usize,
}

impl AssemblyContext {
    fn assemble(
        &self,
        meta: &Metadata,
        filename: String,
        real: Vec<f64>,
        imag: Vec<f64>,
    ) -> Spectrum {
        if self.ypts > 1 {
            let y_vector = axis_vector(meta, "Y", self.ypts);
            let z_data: Vec<Vec<f64>> = real
                .chunks(self.xpts)
                .take(self.ypts)
                .map(<[f64]>::to_vec)
                .collect();
            Spectrum::TwoD(Spectrum2D {
                filename,
                spectrum_type: self.spectrum_type,
                params: Some(self.params.clone()),
                x_label: self.x_label.clone(),
                y_label: self.y_label.clone(),
                x_data: self.x_vector.clone(),
                y_data: y_vector,
                z_data,
            })
        } else {
            Spectrum::OneD(Spectrum1D {
                filename,
                spectrum_type: self.spectrum_type,
                params: Some(self.params.clone()),
                x_label: self.x_label.clone(),
                y_label: INTENSITY_LABEL.to_string(),
                x_data: self.x_vector.clone(),
                real_data: real,
                imag_data: imag,
            })
        }
    }
}
