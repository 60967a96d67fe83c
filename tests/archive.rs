//! End-to-end archive decoding over in-memory ZIPs.

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use bes3t_decoder::{parse_archive, Spectrum, DEFAULT_SAMPLE_NAME};

fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, bytes) in entries {
        writer
            .start_file(name.to_string(), SimpleFileOptions::default())
            .unwrap();
        writer.write_all(bytes).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

fn be_doubles(values: &[f64]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_be_bytes()).collect()
}

const GOOD_DSC: &str = "\
* BES3T descriptor
XPTS\t8
XMIN\t0
XWID\t7
XNAM\tTime
XUNI\tns
IKKF\tREAL
IRFMT\tD
BSEQ\tBIG
";

fn good_pair() -> (Vec<u8>, Vec<u8>) {
    let data: Vec<f64> = (0..8).map(|i| i as f64).collect();
    (GOOD_DSC.as_bytes().to_vec(), be_doubles(&data))
}

#[test]
fn decodes_a_simple_1d_pair() {
    let (dsc, dta) = good_pair();
    let content = build_zip(&[("sample_T1_run.DSC", &dsc), ("sample_T1_run.DTA", &dta)]);

    let parsed = parse_archive(&content).unwrap();
    assert_eq!(parsed.count, 1);
    assert_eq!(parsed.sample_name, "sample");

    let spec = match &parsed.spectra[0] {
        Spectrum::OneD(s) => s,
        Spectrum::TwoD(_) => panic!("expected 1D spectrum"),
    };
    assert_eq!(spec.spectrum_type.to_string(), "T1");
    assert_eq!(spec.filename, "sample_T1_run");
    assert_eq!(spec.x_label, "Time (ns)");
    assert_eq!(spec.y_label, "Intensity (a.u.)");
    assert_eq!(spec.x_data, (0..8).map(|i| i as f64).collect::<Vec<_>>());
    assert_eq!(spec.real_data, spec.x_data);
    assert_eq!(spec.imag_data, vec![0.0; 8]);
}

#[test]
fn corrupt_pair_does_not_abort_the_batch() {
    let (dsc, dta) = good_pair();
    // Second descriptor has no data file at all.
    let content = build_zip(&[
        ("good/sample_T1_run.DSC", &dsc),
        ("good/sample_T1_run.DTA", &dta),
        ("broken/other_T2.DSC", &dsc),
    ]);

    let parsed = parse_archive(&content).unwrap();
    assert_eq!(parsed.count, 1);
    assert_eq!(parsed.spectra[0].filename(), "sample_T1_run");
}

#[test]
fn malformed_dimensions_skip_the_pair_not_the_batch() {
    let (dsc, dta) = good_pair();
    let zero_dsc = b"XPTS 0\nIKKF REAL\nIRFMT D\n";
    // get_int saturates each 19-digit count to i64::MAX; the point and
    // byte-span products must fail this pair instead of wrapping or
    // panicking.
    let huge_dsc = b"XPTS 9999999999999999999\nYPTS 9999999999999999999\nIKKF REAL\nIRFMT D\n";
    let content = build_zip(&[
        ("sample_T1_run.DSC", &dsc),
        ("sample_T1_run.DTA", &dta),
        ("zero_cw.DSC", zero_dsc.as_slice()),
        ("zero_cw.DTA", b"".as_slice()),
        ("huge_cw.DSC", huge_dsc.as_slice()),
        ("huge_cw.DTA", b"\x00\x00\x00\x00".as_slice()),
    ]);

    let parsed = parse_archive(&content).unwrap();
    assert_eq!(parsed.count, 1);
    assert_eq!(parsed.spectra[0].filename(), "sample_T1_run");
}

#[test]
fn size_mismatch_skips_the_pair() {
    // Declares 10 complex float32 points (80 bytes) but ships 40.
    let dsc = b"XPTS 10\nIKKF CPLX\nIRFMT F\nBSEQ BIG\n";
    let dta = vec![0u8; 40];
    let content = build_zip(&[("bad_cw.DSC", dsc), ("bad_cw.DTA", &dta)]);

    let parsed = parse_archive(&content).unwrap();
    assert_eq!(parsed.count, 0);
    assert_eq!(parsed.sample_name, DEFAULT_SAMPLE_NAME);
}

#[test]
fn reshapes_2d_payloads_row_major() {
    let dsc = b"XPTS 3\nYPTS 2\nXMIN 0\nXWID 2\nYMIN 0\nYWID 1\n\
                XNAM Field\nXUNI G\nYNAM Time\nYUNI ns\nIKKF REAL\nIRFMT D\nBSEQ BIG\n";
    let dta = be_doubles(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    let content = build_zip(&[("Cu_hyscore.DSC", dsc.as_slice()), ("Cu_hyscore.DTA", &dta)]);

    let parsed = parse_archive(&content).unwrap();
    assert_eq!(parsed.count, 1);
    let spec = match &parsed.spectra[0] {
        Spectrum::TwoD(s) => s,
        Spectrum::OneD(_) => panic!("expected 2D spectrum"),
    };
    assert_eq!(spec.spectrum_type.to_string(), "HYSCORE");
    assert_eq!(spec.z_data, vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);
    assert_eq!(spec.x_data, vec![0.0, 1.0, 2.0]);
    assert_eq!(spec.y_data, vec![0.0, 1.0]);
    assert_eq!(spec.y_label, "Time (ns)");
}

#[test]
fn quad_interleaved_payload_merges_channels() {
    // Two complex double channels, 2 points: exactly 4 doubles per point.
    let dsc = b"XPTS 2\nIKKF CPLX,CPLX\nIRFMT D,D\nBSEQ BIG\n";
    let dta = be_doubles(&[10.0, 11.0, 12.0, 13.0, 20.0, 21.0, 22.0, 23.0]);
    let content = build_zip(&[("q_cw.DSC", dsc.as_slice()), ("q_cw.DTA", &dta)]);

    let parsed = parse_archive(&content).unwrap();
    assert_eq!(parsed.count, 1);
    let spec = match &parsed.spectra[0] {
        Spectrum::OneD(s) => s,
        Spectrum::TwoD(_) => panic!("expected 1D spectrum"),
    };
    // One merged spectrum, no channel suffix
    assert_eq!(spec.filename, "q_cw");
    assert_eq!(spec.real_data, vec![10.0, 20.0]);
    assert_eq!(spec.imag_data, vec![12.0, 22.0]);
}

#[test]
fn quality_filter_drops_noisy_channel() {
    let n = 100usize;
    let dsc = format!("XPTS {n}\nIKKF REAL,REAL\nIRFMT D,D\nBSEQ BIG\n");
    let clean: Vec<f64> = (0..n).map(|i| i as f64).collect();
    let noisy: Vec<f64> = (0..n)
        .map(|i| if i % 2 == 0 { 1000.0 } else { -1000.0 })
        .collect();
    let mut dta = be_doubles(&clean);
    dta.extend(be_doubles(&noisy));
    let content = build_zip(&[("mc_cw.DSC", dsc.as_bytes()), ("mc_cw.DTA", &dta)]);

    let parsed = parse_archive(&content).unwrap();
    assert_eq!(parsed.count, 1);
    assert_eq!(parsed.spectra[0].filename(), "mc_cw_ch1");
}

#[test]
fn field_axis_normalized_to_gauss() {
    let dsc = b"XPTS 2\nXMIN 0\nXWID 0.001\nXNAM Field\nXUNI T\nIKKF REAL\nIRFMT D\nBSEQ BIG\n";
    let dta = be_doubles(&[5.0, 6.0]);
    let content = build_zip(&[("Ag_cw.DSC", dsc.as_slice()), ("Ag_cw.DTA", &dta)]);

    let parsed = parse_archive(&content).unwrap();
    let spec = match &parsed.spectra[0] {
        Spectrum::OneD(s) => s,
        Spectrum::TwoD(_) => panic!("expected 1D spectrum"),
    };
    assert_eq!(spec.x_label, "Magnetic Field (G)");
    assert_eq!(spec.x_data, vec![0.0, 10.0]);
}

#[test]
fn acquisition_params_ride_along() {
    let (dsc, dta) = good_pair();
    let content = build_zip(&[("Ag_4p5K_200G_T1.DSC", &dsc), ("Ag_4p5K_200G_T1.DTA", &dta)]);

    let parsed = parse_archive(&content).unwrap();
    assert_eq!(parsed.sample_name, "Ag");
    let params = parsed.spectra[0].params().unwrap();
    assert_eq!(params.temperature_k, Some(4.5));
    assert_eq!(params.field_g, Some(200.0));
    assert_eq!(params.tokens, vec!["Ag", "4p5K", "200G", "T1"]);
}

#[test]
fn garbage_buffer_is_a_fatal_error() {
    assert!(parse_archive(b"definitely not a zip file").is_err());
}

#[test]
fn serializes_with_untagged_spectrum_shapes() {
    let (dsc, dta) = good_pair();
    let content = build_zip(&[("sample_T1_run.DSC", &dsc), ("sample_T1_run.DTA", &dta)]);
    let parsed = parse_archive(&content).unwrap();

    let json = serde_json::to_value(&parsed).unwrap();
    assert_eq!(json["sample_name"], "sample");
    assert_eq!(json["count"], 1);
    let spec = &json["spectra"][0];
    assert_eq!(spec["type"], "T1");
    assert!(spec.get("real_data").is_some());
    assert!(spec.get("z_data").is_none());
}
