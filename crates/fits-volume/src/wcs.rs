//! Linear per-axis world coordinates (CRVAL/CRPIX/CDELT).
//!
//! Only the diagonal, unrotated case is modelled; CDi_j, PCi_j and CROTAn
//! cards are ignored.

use crate::error::{Error, Result};
use crate::header::{find_value, Card};
use crate::round::round_half_even;

const CRVAL_KEYS: [&str; 3] = ["CRVAL1", "CRVAL2", "CRVAL3"];
const CRPIX_KEYS: [&str; 3] = ["CRPIX1", "CRPIX2", "CRPIX3"];
const CDELT_KEYS: [&str; 3] = ["CDELT1", "CDELT2", "CDELT3"];

/// Coordinate description of one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisWcs {
    /// Physical value at the reference voxel.
    pub crval: f64,
    /// Reference voxel, 1-based as written in the header.
    pub crpix: f64,
    /// Physical step per voxel.
    pub cdelt: f64,
}

impl AxisWcs {
    /// 0-based voxel nearest to a physical coordinate.
    pub fn to_index(&self, coord: f64) -> i64 {
        round_half_even((coord - self.crval) / self.cdelt + self.crpix - 1.0)
    }

    /// Half-width in voxels of a box `width` physical units across.
    pub fn half_width(&self, width: f64) -> i64 {
        round_half_even(width / libm::fabs(self.cdelt) / 2.0)
    }
}

/// The three spatial axes in header order (axis 1 = x, 2 = y, 3 = z).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateHeader {
    axes: [AxisWcs; 3],
}

impl CoordinateHeader {
    /// Build a header, rejecting zero step sizes.
    pub fn new(axes: [AxisWcs; 3]) -> Result<Self> {
        for (axis, key) in axes.iter().zip(CDELT_KEYS) {
            if axis.cdelt == 0.0 {
                return Err(Error::Configuration(key));
            }
        }
        Ok(CoordinateHeader { axes })
    }

    /// Read the nine CRVALn/CRPIXn/CDELTn cards.
    pub fn from_cards(cards: &[Card]) -> Result<Self> {
        let numeric = |key: &'static str| {
            find_value(cards, key)
                .and_then(|v| v.as_f64())
                .ok_or(Error::MissingHeaderKey(key))
        };

        let mut axes = [AxisWcs {
            crval: 0.0,
            crpix: 0.0,
            cdelt: 0.0,
        }; 3];
        for (i, axis) in axes.iter_mut().enumerate() {
            *axis = AxisWcs {
                crval: numeric(CRVAL_KEYS[i])?,
                crpix: numeric(CRPIX_KEYS[i])?,
                cdelt: numeric(CDELT_KEYS[i])?,
            };
        }
        Self::new(axes)
    }

    /// Axis 0 is x (header axis 1), 1 is y, 2 is z.
    pub fn axis(&self, index: usize) -> &AxisWcs {
        &self.axes[index]
    }

    pub fn axes(&self) -> &[AxisWcs; 3] {
        &self.axes
    }

    /// Header cards describing these axes, in CRVAL/CRPIX/CDELT order.
    pub fn to_cards(&self) -> [Card; 9] {
        use crate::value::Value::Float;
        let [x, y, z] = self.axes;
        [
            Card::new(CRVAL_KEYS[0], Float(x.crval)),
            Card::new(CRPIX_KEYS[0], Float(x.crpix)),
            Card::new(CDELT_KEYS[0], Float(x.cdelt)),
            Card::new(CRVAL_KEYS[1], Float(y.crval)),
            Card::new(CRPIX_KEYS[1], Float(y.crpix)),
            Card::new(CDELT_KEYS[1], Float(y.cdelt)),
            Card::new(CRVAL_KEYS[2], Float(z.crval)),
            Card::new(CRPIX_KEYS[2], Float(z.crpix)),
            Card::new(CDELT_KEYS[2], Float(z.cdelt)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use alloc::vec::Vec;

    fn axis(crval: f64, crpix: f64, cdelt: f64) -> AxisWcs {
        AxisWcs { crval, crpix, cdelt }
    }

    #[test]
    fn index_at_reference_pixel() {
        // CRPIX is 1-based, indices are 0-based.
        assert_eq!(axis(0.0, 2.0, 1.0).to_index(0.0), 1);
        assert_eq!(axis(100.0, 1.0, 0.5).to_index(100.0), 0);
    }

    #[test]
    fn index_steps_and_ties() {
        let a = axis(0.0, 1.0, 0.5);
        assert_eq!(a.to_index(1.0), 2);
        // 0.25 / 0.5 = 0.5 exactly, ties to even.
        assert_eq!(a.to_index(0.25), 0);
        assert_eq!(a.to_index(0.75), 2);
        assert_eq!(a.to_index(-1.0), -2);
    }

    #[test]
    fn index_with_negative_step() {
        let a = axis(10.0, 1.0, -2.0);
        assert_eq!(a.to_index(10.0), 0);
        assert_eq!(a.to_index(6.0), 2);
        assert_eq!(a.to_index(12.0), -1);
    }

    #[test]
    fn half_width_uses_absolute_step() {
        assert_eq!(axis(0.0, 1.0, 1.0).half_width(0.0), 0);
        assert_eq!(axis(0.0, 1.0, 1.0).half_width(1.0), 0);
        assert_eq!(axis(0.0, 1.0, 1.0).half_width(3.0), 2);
        assert_eq!(axis(0.0, 1.0, -0.5).half_width(2.0), 2);
        assert_eq!(axis(0.0, 1.0, 0.1).half_width(0.1), 0);
    }

    #[test]
    fn zero_step_is_configuration_error() {
        let ok = axis(0.0, 1.0, 1.0);
        let err = CoordinateHeader::new([ok, axis(0.0, 1.0, 0.0), ok]).unwrap_err();
        assert!(matches!(err, Error::Configuration("CDELT2")));
    }

    #[test]
    fn from_cards_round_trip() {
        let hdr =
            CoordinateHeader::new([axis(1.0, 2.0, 0.5), axis(-3.0, 4.0, 2.0), axis(5.0, 6.0, -1.5)])
                .unwrap();
        let cards = hdr.to_cards();
        assert_eq!(CoordinateHeader::from_cards(&cards).unwrap(), hdr);
    }

    #[test]
    fn from_cards_accepts_integers() {
        let mut cards: Vec<Card> = Vec::new();
        for n in 1..=3 {
            cards.push(Card::new(&alloc::format!("CRVAL{n}"), Value::Integer(0)));
            cards.push(Card::new(&alloc::format!("CRPIX{n}"), Value::Integer(2)));
            cards.push(Card::new(&alloc::format!("CDELT{n}"), Value::Integer(1)));
        }
        let hdr = CoordinateHeader::from_cards(&cards).unwrap();
        assert_eq!(*hdr.axis(2), axis(0.0, 2.0, 1.0));
    }

    #[test]
    fn from_cards_reports_first_missing_key() {
        let hdr = CoordinateHeader::new([axis(0.0, 1.0, 1.0); 3]).unwrap();
        let cards: Vec<Card> = hdr
            .to_cards()
            .into_iter()
            .filter(|c| c.keyword_str() != "CRPIX3")
            .collect();
        let err = CoordinateHeader::from_cards(&cards).unwrap_err();
        assert!(matches!(err, Error::MissingHeaderKey("CRPIX3")));
    }

    #[test]
    fn from_cards_rejects_non_numeric_value() {
        let mut cards: Vec<Card> = CoordinateHeader::new([axis(0.0, 1.0, 1.0); 3])
            .unwrap()
            .to_cards()
            .to_vec();
        cards[0] = Card::new("CRVAL1", Value::String(alloc::string::String::from("x")));
        let err = CoordinateHeader::from_cards(&cards).unwrap_err();
        assert!(matches!(err, Error::MissingHeaderKey("CRVAL1")));
    }
}
