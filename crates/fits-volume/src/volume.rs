//! Box integration over a cube in physical coordinates.
//!
//! A query point is mapped to its nearest voxel on each axis, the box widths
//! to whole-voxel half-widths, and every voxel in the resulting
//! `(2h + 1)`-wide box that lies inside the cube is summed. Boxes hanging
//! off the cube are clipped; one entirely outside sums to zero.

use core::ops::Range;

use ndarray::s;

use crate::cube::{Cube, CubeSource};
use crate::error::{Error, Result};
use crate::policy::{AxisOrder, ExtractionPolicy};
use crate::wcs::CoordinateHeader;

/// A point in the cube's physical coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Query {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Query {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Query { x, y, z }
    }

    fn coords(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

/// Full box side lengths per axis, in the same units as CDELTn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxWidths {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl BoxWidths {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        BoxWidths { x, y, z }
    }

    /// The same width on all three axes.
    pub fn uniform(w: f64) -> Self {
        BoxWidths { x: w, y: w, z: w }
    }

    fn widths(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

impl Default for BoxWidths {
    fn default() -> Self {
        BoxWidths::uniform(0.1)
    }
}

/// Voxels picked out by one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Nearest voxel per physical axis (x, y, z); may lie outside the cube.
    pub centre: [i64; 3],
    /// Half-width in voxels per physical axis (x, y, z).
    pub half_widths: [i64; 3],
    /// Clamped index ranges in array-axis order.
    pub ranges: [Range<usize>; 3],
}

impl Selection {
    /// Number of voxels inside the clamped box.
    pub fn len(&self) -> usize {
        self.ranges.iter().map(|r| r.len()).product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// `[centre - half, centre + half + 1)` clamped into `[0, len]`.
fn clamp_range(centre: i64, half: i64, len: usize) -> Range<usize> {
    let len_i = i64::try_from(len).unwrap_or(i64::MAX);
    let lower = centre.saturating_sub(half).clamp(0, len_i);
    let upper = centre.saturating_add(half).saturating_add(1).clamp(0, len_i);
    // Both bounds are in [0, len], so the casts are lossless.
    lower as usize..upper as usize
}

fn check_query(query: &Query, widths: &BoxWidths) -> Result<()> {
    if !query.coords().iter().all(|c| c.is_finite()) {
        return Err(Error::InvalidArgument("query coordinates must be finite"));
    }
    // Written so that NaN fails too.
    if !widths.widths().iter().all(|&w| w >= 0.0) {
        return Err(Error::InvalidArgument("box widths must be non-negative"));
    }
    Ok(())
}

/// Resolve a query against a cube of the given array shape.
pub fn select(
    shape: [usize; 3],
    header: &CoordinateHeader,
    query: &Query,
    widths: &BoxWidths,
    axis_order: AxisOrder,
) -> Result<Selection> {
    check_query(query, widths)?;

    let coords = query.coords();
    let widths = widths.widths();
    let mut centre = [0i64; 3];
    let mut half_widths = [0i64; 3];
    let mut ranges = [0..0, 0..0, 0..0];

    for axis in 0..3 {
        let wcs = header.axis(axis);
        centre[axis] = wcs.to_index(coords[axis]);
        half_widths[axis] = wcs.half_width(widths[axis]);
        let array_axis = axis_order.array_axis(axis);
        ranges[array_axis] = clamp_range(centre[axis], half_widths[axis], shape[array_axis]);
    }

    Ok(Selection {
        centre,
        half_widths,
        ranges,
    })
}

/// Sum the voxels of `sel` in `cube`.
///
/// With `normalize` each sample is divided by the sum of the whole cube
/// first; an all-zero cube then yields NaN.
pub fn sum_selection(cube: &Cube, sel: &Selection, normalize: bool) -> f64 {
    if sel.is_empty() {
        return 0.0;
    }
    let [r0, r1, r2] = sel.ranges.clone();
    let view = cube.data.slice(s![r0, r1, r2]);
    if normalize {
        let total = cube.data.sum();
        log::debug!("normalizing by cube sum {total}");
        view.iter().map(|v| v / total).sum()
    } else {
        view.sum()
    }
}

/// Sum the box around `query` in an already loaded cube.
pub fn extract_from_cube(
    cube: &Cube,
    query: &Query,
    widths: &BoxWidths,
    policy: ExtractionPolicy,
) -> Result<f64> {
    let sel = select(cube.shape(), &cube.header, query, widths, policy.axis_order)?;
    log::debug!(
        "centre {:?}, half-widths {:?}, ranges {:?} ({:?} order)",
        sel.centre,
        sel.half_widths,
        sel.ranges,
        policy.axis_order
    );
    Ok(sum_selection(cube, &sel, policy.normalize))
}

/// Load a cube from `source` and sum the box around `query`.
///
/// Arguments are checked before the source is touched.
pub fn extract<S: CubeSource + ?Sized>(
    source: &S,
    query: &Query,
    widths: &BoxWidths,
    policy: ExtractionPolicy,
) -> Result<f64> {
    check_query(query, widths)?;
    let cube = source.load()?;
    extract_from_cube(&cube, query, widths, policy)
}

/// Sum a box of `cube_widths` centred on `(x, y, z)`, using the conventions
/// of `team_name`.
///
/// ```no_run
/// use fits_volume::{get_volume_from_coords, BoxWidths, DEFAULT_TEAM};
///
/// let flux = get_volume_from_coords(
///     "lightcone.fits",
///     0.0,
///     0.0,
///     150.0,
///     BoxWidths::default(),
///     DEFAULT_TEAM,
/// )?;
/// # Ok::<(), fits_volume::Error>(())
/// ```
pub fn get_volume_from_coords<S: CubeSource + ?Sized>(
    source: &S,
    x: f64,
    y: f64,
    z: f64,
    cube_widths: BoxWidths,
    team_name: &str,
) -> Result<f64> {
    let policy = ExtractionPolicy::for_team(team_name);
    log::debug!("team {team_name:?} -> {policy:?}");
    extract(source, &Query::new(x, y, z), &cube_widths, policy)
}
