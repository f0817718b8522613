//! Data cubes and the FITS primary-HDU reader that produces them.
//!
//! Samples are held as `f64` with BSCALE/BZERO applied and BLANK integers
//! mapped to NaN. The array is indexed slowest axis first, so a header with
//! NAXIS1 = 6, NAXIS2 = 5, NAXIS3 = 4 gives an array of shape `[4, 5, 6]`.

use alloc::borrow::Cow;
use alloc::vec::Vec;

use bytemuck::pod_collect_to_vec;
use ndarray::Array3;

use crate::block::{padded_byte_len, BLOCK_SIZE};
use crate::error::{Error, Result};
use crate::header::{find_value, parse_header_blocks, serialize_header, Card};
use crate::value::Value;
use crate::wcs::CoordinateHeader;

const VALID_BITPIX: [i64; 6] = [8, 16, 32, 64, -32, -64];

/// Upper limit on NAXIS in the FITS standard.
const MAX_NAXIS: usize = 999;

const CUBE_AXIS_KEYWORDS: [&str; 3] = ["NAXIS1", "NAXIS2", "NAXIS3"];

/// A 3-D sample array together with its coordinate header.
#[derive(Debug, Clone, PartialEq)]
pub struct Cube {
    pub data: Array3<f64>,
    pub header: CoordinateHeader,
}

impl Cube {
    pub fn new(data: Array3<f64>, header: CoordinateHeader) -> Self {
        Cube { data, header }
    }

    /// Array shape, slowest axis first.
    pub fn shape(&self) -> [usize; 3] {
        let (a, b, c) = self.data.dim();
        [a, b, c]
    }
}

/// Anything a [`Cube`] can be obtained from.
///
/// Sources that need decoding return an owned cube; a loaded cube lends
/// itself out unchanged.
pub trait CubeSource {
    fn load(&self) -> Result<Cow<'_, Cube>>;
}

impl CubeSource for Cube {
    fn load(&self) -> Result<Cow<'_, Cube>> {
        Ok(Cow::Borrowed(self))
    }
}

/// Raw bytes of a complete FITS file.
impl CubeSource for [u8] {
    fn load(&self) -> Result<Cow<'_, Cube>> {
        read_cube(self).map(Cow::Owned)
    }
}

impl CubeSource for Vec<u8> {
    fn load(&self) -> Result<Cow<'_, Cube>> {
        self.as_slice().load()
    }
}

#[cfg(feature = "std")]
impl CubeSource for std::path::Path {
    fn load(&self) -> Result<Cow<'_, Cube>> {
        open_cube(self).map(Cow::Owned)
    }
}

#[cfg(feature = "std")]
impl CubeSource for std::path::PathBuf {
    fn load(&self) -> Result<Cow<'_, Cube>> {
        self.as_path().load()
    }
}

#[cfg(feature = "std")]
impl CubeSource for str {
    fn load(&self) -> Result<Cow<'_, Cube>> {
        std::path::Path::new(self).load()
    }
}

#[cfg(feature = "std")]
impl CubeSource for alloc::string::String {
    fn load(&self) -> Result<Cow<'_, Cube>> {
        self.as_str().load()
    }
}

/// Read a cube from the primary HDU of a FITS file on disk.
///
/// The file is read whole and closed before decoding starts.
#[cfg(feature = "std")]
pub fn open_cube(path: &std::path::Path) -> Result<Cube> {
    let data = std::fs::read(path)?;
    log::debug!("read {} bytes from {}", data.len(), path.display());
    read_cube(&data)
}

fn integer_keyword(cards: &[Card], keyword: &'static str) -> Result<i64> {
    find_value(cards, keyword)
        .and_then(Value::as_i64)
        .ok_or(Error::MissingHeaderKey(keyword))
}

/// Array shape `[NAXIS3, NAXIS2, NAXIS1]` from the primary header.
///
/// Axes past the third are accepted only when they are degenerate (length 1).
fn cube_shape(cards: &[Card]) -> Result<[usize; 3]> {
    let naxis = integer_keyword(cards, "NAXIS")?;
    let naxis = usize::try_from(naxis).map_err(|_| Error::InvalidHeader("negative NAXIS"))?;
    if naxis < 3 {
        return Err(Error::NotACube(naxis));
    }
    if naxis > MAX_NAXIS {
        return Err(Error::InvalidHeader("NAXIS exceeds 999"));
    }

    let mut naxes = [0usize; 3];
    for (len, kw) in naxes.iter_mut().zip(CUBE_AXIS_KEYWORDS) {
        let n = integer_keyword(cards, kw)?;
        *len = usize::try_from(n).map_err(|_| Error::InvalidHeader("negative NAXISn"))?;
    }
    for n in 4..=naxis {
        let kw = alloc::format!("NAXIS{n}");
        match find_value(cards, &kw).and_then(Value::as_i64) {
            Some(1) => {}
            Some(_) => return Err(Error::NotACube(naxis)),
            None => return Err(Error::InvalidHeader("missing NAXISn for an extra axis")),
        }
    }
    Ok([naxes[2], naxes[1], naxes[0]])
}

/// Decode big-endian samples and apply `BZERO + BSCALE * raw`.
fn decode_samples(raw: &[u8], bitpix: i64, cards: &[Card]) -> Result<Vec<f64>> {
    let scale_of = |kw: &str| find_value(cards, kw).and_then(Value::as_f64);
    let bscale = scale_of("BSCALE").unwrap_or(1.0);
    let bzero = scale_of("BZERO").unwrap_or(0.0);
    let blank = find_value(cards, "BLANK").and_then(Value::as_i64);

    let int = |v: i64| {
        if Some(v) == blank {
            f64::NAN
        } else {
            bzero + bscale * v as f64
        }
    };
    let float = |v: f64| bzero + bscale * v;

    let samples: Vec<f64> = match bitpix {
        8 => raw.iter().map(|&v| int(i64::from(v))).collect(),
        16 => pod_collect_to_vec::<u8, i16>(raw)
            .into_iter()
            .map(|v| int(i64::from(i16::from_be(v))))
            .collect(),
        32 => pod_collect_to_vec::<u8, i32>(raw)
            .into_iter()
            .map(|v| int(i64::from(i32::from_be(v))))
            .collect(),
        64 => pod_collect_to_vec::<u8, i64>(raw)
            .into_iter()
            .map(|v| int(i64::from_be(v)))
            .collect(),
        -32 => pod_collect_to_vec::<u8, u32>(raw)
            .into_iter()
            .map(|v| float(f64::from(f32::from_bits(u32::from_be(v)))))
            .collect(),
        -64 => pod_collect_to_vec::<u8, u64>(raw)
            .into_iter()
            .map(|v| float(f64::from_bits(u64::from_be(v))))
            .collect(),
        other => return Err(Error::InvalidBitpix(other)),
    };
    Ok(samples)
}

/// Decode the primary HDU of an in-memory FITS file into a [`Cube`].
pub fn read_cube(data: &[u8]) -> Result<Cube> {
    let (cards, header_len) = parse_header_blocks(data)?;

    match cards.first() {
        Some(c) if c.keyword_str() == "SIMPLE" && c.value == Some(Value::Logical(true)) => {}
        _ => return Err(Error::InvalidHeader("primary HDU must start with SIMPLE = T")),
    }
    let bitpix = integer_keyword(&cards, "BITPIX")?;
    if !VALID_BITPIX.contains(&bitpix) {
        return Err(Error::InvalidBitpix(bitpix));
    }
    let shape = cube_shape(&cards)?;
    let header = CoordinateHeader::from_cards(&cards)?;

    let count = shape
        .iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .ok_or(Error::InvalidHeader("pixel count overflow"))?;
    let data_len = count
        .checked_mul((bitpix.unsigned_abs() / 8) as usize)
        .ok_or(Error::InvalidHeader("data size overflow"))?;
    let data_end = header_len
        .checked_add(data_len)
        .ok_or(Error::InvalidHeader("data size overflow"))?;
    let raw = data.get(header_len..data_end).ok_or(Error::UnexpectedEof)?;
    log::trace!("decoding {count} samples, BITPIX = {bitpix}, shape = {shape:?}");

    let samples = decode_samples(raw, bitpix, &cards)?;
    let data = Array3::from_shape_vec((shape[0], shape[1], shape[2]), samples)
        .map_err(|_| Error::InvalidHeader("sample count does not match NAXISn"))?;
    Ok(Cube { data, header })
}

/// Serialize a cube as a single `BITPIX = -64` primary HDU.
///
/// `extra_cards` are written after the coordinate cards.
pub fn serialize_cube(cube: &Cube, extra_cards: &[Card]) -> Vec<u8> {
    let [n3, n2, n1] = cube.shape();
    let mut cards = alloc::vec![
        Card::new("SIMPLE", Value::Logical(true)),
        Card::new("BITPIX", Value::Integer(-64)),
        Card::new("NAXIS", Value::Integer(3)),
        Card::new("NAXIS1", Value::Integer(n1 as i64)),
        Card::new("NAXIS2", Value::Integer(n2 as i64)),
        Card::new("NAXIS3", Value::Integer(n3 as i64)),
    ];
    cards.extend(cube.header.to_cards());
    cards.extend_from_slice(extra_cards);

    let mut out = serialize_header(&cards);
    let header_len = out.len();
    for v in cube.data.iter() {
        out.extend_from_slice(&v.to_be_bytes());
    }
    out.resize(header_len + padded_byte_len(out.len() - header_len), 0);
    debug_assert_eq!(out.len() % BLOCK_SIZE, 0);
    out
}
