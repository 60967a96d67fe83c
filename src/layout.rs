//! Per-channel binary layout resolution from descriptor fields.
//!
//! `IKKF` and `IRFMT` are comma-separated lists describing one or more
//! datasets packed back to back in the payload. The shorter list is padded
//! by replicating its last element, mirroring how the acquisition software
//! writes them.

use crate::metadata::Metadata;

/// Numeric element type of one dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
    Float32,
    Float64,
    Int32,
}

impl ElementType {
    pub fn size(self) -> usize {
        match self {
            ElementType::Float64 => 8,
            ElementType::Float32 | ElementType::Int32 => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    Big,
    Little,
}

impl Endianness {
    pub fn opposite(self) -> Self {
        match self {
            Endianness::Big => Endianness::Little,
            Endianness::Little => Endianness::Big,
        }
    }
}

/// Resolved layout of one dataset (channel) within the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelConfig {
    pub is_complex: bool,
    pub dtype: ElementType,
    pub endianness: Endianness,
    pub byte_count: usize,
    pub point_count: usize,
}

/// Resolve the per-channel layouts a descriptor declares for a payload of
/// `point_count` (= `XPTS`×`YPTS`) samples per channel.
///
/// Returns `None` when a declared byte span overflows `usize` — descriptor
/// dimensions are untrusted input, and an absurd count must fail the pair,
/// not the process.
pub fn resolve_layouts(meta: &Metadata, point_count: usize) -> Option<Vec<ChannelConfig>> {
    let ikkf = meta.get_str("IKKF", "CPLX");
    let irfmt = meta.get_str("IRFMT", "F");

    let mut ikkf_list: Vec<&str> = ikkf.split(',').map(str::trim).collect();
    let mut irfmt_list: Vec<&str> = irfmt.split(',').map(str::trim).collect();

    let num_datasets = ikkf_list.len().max(irfmt_list.len());
    pad_with_last(&mut ikkf_list, num_datasets);
    pad_with_last(&mut irfmt_list, num_datasets);

    let endianness = if meta.get_str("BSEQ", "BIG").contains("BIG") {
        Endianness::Big
    } else {
        Endianness::Little
    };

    // A declared imaginary format implies complex data even when IKKF
    // forgets to say so.
    let has_iifmt = meta.contains("IIFMT");

    (0..num_datasets)
        .map(|i| {
            let is_complex = ikkf_list[i].contains("CPLX") || has_iifmt;
            let dtype = if irfmt_list[i].contains('D') {
                ElementType::Float64
            } else if irfmt_list[i].contains('I') {
                ElementType::Int32
            } else {
                ElementType::Float32
            };
            let components = if is_complex { 2 } else { 1 };
            let byte_count = point_count.checked_mul(components * dtype.size())?;
            Some(ChannelConfig {
                is_complex,
                dtype,
                endianness,
                byte_count,
                point_count,
            })
        })
        .collect()
}

/// Total payload bytes the resolved layouts account for, or `None` on
/// overflow. The orchestrator skips the pair when this does not match the
/// data file's actual length.
pub fn expected_bytes(configs: &[ChannelConfig]) -> Option<usize> {
    configs
        .iter()
        .try_fold(0usize, |sum, c| sum.checked_add(c.byte_count))
}

fn pad_with_last<'a>(list: &mut Vec<&'a str>, len: usize) {
    if let Some(&last) = list.last() {
        while list.len() < len {
            list.push(last);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_complex_float() {
        let meta = Metadata::parse("IKKF CPLX\nIRFMT F\nBSEQ BIG");
        let configs = resolve_layouts(&meta, 10).unwrap();
        assert_eq!(configs.len(), 1);
        assert!(configs[0].is_complex);
        assert_eq!(configs[0].dtype, ElementType::Float32);
        assert_eq!(configs[0].endianness, Endianness::Big);
        assert_eq!(configs[0].byte_count, 10 * 2 * 4);
    }

    #[test]
    fn test_defaults_when_absent() {
        let meta = Metadata::parse("BSEQ LIT");
        let configs = resolve_layouts(&meta, 4).unwrap();
        assert_eq!(configs.len(), 1);
        assert!(configs[0].is_complex); // IKKF defaults to CPLX
        assert_eq!(configs[0].dtype, ElementType::Float32); // IRFMT defaults to F
        assert_eq!(configs[0].endianness, Endianness::Little);
    }

    #[test]
    fn test_list_padding() {
        let meta = Metadata::parse("IKKF CPLX,REAL\nIRFMT D");
        let configs = resolve_layouts(&meta, 6).unwrap();
        assert_eq!(configs.len(), 2);
        assert!(configs[0].is_complex);
        assert!(!configs[1].is_complex);
        // IRFMT's last element replicated across both datasets
        assert_eq!(configs[0].dtype, ElementType::Float64);
        assert_eq!(configs[1].dtype, ElementType::Float64);
        assert_eq!(expected_bytes(&configs), Some(6 * 2 * 8 + 6 * 8));
    }

    #[test]
    fn test_int_format() {
        let meta = Metadata::parse("IKKF REAL\nIRFMT I");
        let configs = resolve_layouts(&meta, 3).unwrap();
        assert_eq!(configs[0].dtype, ElementType::Int32);
        assert_eq!(configs[0].byte_count, 12);
    }

    #[test]
    fn test_oversized_point_count_rejected() {
        let meta = Metadata::parse("IKKF CPLX\nIRFMT D");
        // 2 components × 8 bytes cannot be addressed at this point count
        assert!(resolve_layouts(&meta, usize::MAX / 8).is_none());
    }

    #[test]
    fn test_iifmt_implies_complex() {
        let meta = Metadata::parse("IKKF REAL\nIRFMT F\nIIFMT F");
        let configs = resolve_layouts(&meta, 5).unwrap();
        assert!(configs[0].is_complex);
    }
}
