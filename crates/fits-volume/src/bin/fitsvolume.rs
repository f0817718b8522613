use fits_volume::volume::{select, sum_selection};
use fits_volume::{open_cube, BoxWidths, ExtractionPolicy, Query, DEFAULT_TEAM};
use std::path::Path;
use std::process;

const USAGE: &str = "\
Usage: fitsvolume [options] <cube.fits> <x> <y> <z>

Sum the voxels of a FITS cube inside a box centred on a physical coordinate.

Options:
  --team <NAME>         Data convention (default: Team_SKAO)
  --width <W>           Box width on every axis (default: 0.1)
  --widths <WX,WY,WZ>   Box width per axis
  -v, --verbose         Also print the voxel selection";

struct Args<'a> {
    path: &'a str,
    query: Query,
    widths: BoxWidths,
    team: &'a str,
    verbose: bool,
}

fn parse_number(s: &str, what: &str) -> Result<f64, String> {
    s.parse::<f64>()
        .map_err(|_| format!("Invalid {}: '{}'", what, s))
}

fn parse_widths(s: &str) -> Result<BoxWidths, String> {
    let parts: Vec<&str> = s.split(',').collect();
    match parts.as_slice() {
        [x, y, z] => Ok(BoxWidths::new(
            parse_number(x.trim(), "width")?,
            parse_number(y.trim(), "width")?,
            parse_number(z.trim(), "width")?,
        )),
        _ => Err(format!("Expected three comma-separated widths, got '{}'", s)),
    }
}

fn parse_args(args: &[String]) -> Result<Args<'_>, String> {
    let mut team = DEFAULT_TEAM;
    let mut widths = BoxWidths::default();
    let mut verbose = false;
    let mut positional = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let mut value = |name: &str| {
            iter.next()
                .map(String::as_str)
                .ok_or_else(|| format!("Missing value for {}", name))
        };
        match arg.as_str() {
            "-v" | "--verbose" => verbose = true,
            "--team" => team = value("--team")?,
            "--width" => widths = BoxWidths::uniform(parse_number(value("--width")?, "width")?),
            "--widths" => widths = parse_widths(value("--widths")?)?,
            // Negative coordinates look like options.
            s if s.starts_with('-') && s.parse::<f64>().is_err() => {
                return Err(format!("Unknown option: {}", s));
            }
            s => positional.push(s),
        }
    }

    match positional.as_slice() {
        [path, x, y, z] => Ok(Args {
            path,
            query: Query::new(
                parse_number(x, "x")?,
                parse_number(y, "y")?,
                parse_number(z, "z")?,
            ),
            widths,
            team,
            verbose,
        }),
        [] => Err(USAGE.to_string()),
        _ => Err(format!("Expected a file and three coordinates\n\n{}", USAGE)),
    }
}

fn run(args: &[String]) -> Result<String, String> {
    let args = parse_args(args)?;
    let policy = ExtractionPolicy::for_team(args.team);

    let cube = open_cube(Path::new(args.path))
        .map_err(|e| format!("Error reading '{}': {}", args.path, e))?;
    let sel = select(
        cube.shape(),
        &cube.header,
        &args.query,
        &args.widths,
        policy.axis_order,
    )
    .map_err(|e| format!("Error extracting from '{}': {}", args.path, e))?;
    let sum = sum_selection(&cube, &sel, policy.normalize);

    if !args.verbose {
        return Ok(format!("{}\n", sum));
    }

    let mut out = String::new();
    out.push_str(&format!("Cube: {}\n", args.path));
    out.push_str(&format!("  Shape: {:?}\n", cube.shape()));
    out.push_str(&format!(
        "  Team: {} (normalize: {}, axis order: {:?})\n",
        args.team, policy.normalize, policy.axis_order
    ));
    out.push_str(&format!("  Centre voxel (x, y, z): {:?}\n", sel.centre));
    out.push_str(&format!("  Half-widths (x, y, z): {:?}\n", sel.half_widths));
    out.push_str(&format!("  Ranges (array order): {:?}\n", sel.ranges));
    out.push_str(&format!("  Voxels: {}\n", sel.len()));
    out.push_str(&format!("  Sum: {}\n", sum));
    Ok(out)
}

fn main() {
    env_logger::init();
    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(output) => print!("{}", output),
        Err(msg) => {
            eprintln!("{}", msg);
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fits_volume::{serialize_cube, AxisWcs, CoordinateHeader, Cube};
    use ndarray::Array3;
    use std::path::PathBuf;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    /// Voxel `[i, j, k]` holds `100 i + 10 j + k`; index = coordinate.
    fn write_labelled_cube(dir: &tempfile::TempDir) -> PathBuf {
        let axis = AxisWcs {
            crval: 0.0,
            crpix: 1.0,
            cdelt: 1.0,
        };
        let data = Array3::from_shape_fn((4, 5, 6), |(i, j, k)| (100 * i + 10 * j + k) as f64);
        let cube = Cube::new(data, CoordinateHeader::new([axis; 3]).unwrap());
        let path = dir.path().join("labelled.fits");
        std::fs::write(&path, serialize_cube(&cube, &[])).unwrap();
        path
    }

    #[test]
    fn run_no_args_shows_usage() {
        let err = run(&[]).unwrap_err();
        assert!(err.contains("Usage:"));
    }

    #[test]
    fn run_unknown_option() {
        let err = run(&args(&["--frobnicate", "a.fits", "0", "0", "0"])).unwrap_err();
        assert!(err.contains("Unknown option: --frobnicate"));
    }

    #[test]
    fn run_wrong_positional_count() {
        let err = run(&args(&["a.fits", "0", "0"])).unwrap_err();
        assert!(err.contains("Expected a file and three coordinates"));
    }

    #[test]
    fn run_bad_numbers() {
        let err = run(&args(&["a.fits", "0", "nope", "0"])).unwrap_err();
        assert!(err.contains("Invalid y: 'nope'"));
        let err = run(&args(&["--widths", "1,2", "a.fits", "0", "0", "0"])).unwrap_err();
        assert!(err.contains("three comma-separated widths"));
        let err = run(&args(&["a.fits", "0", "0", "0", "--team"])).unwrap_err();
        assert!(err.contains("Missing value for --team"));
    }

    #[test]
    fn run_missing_file() {
        let err = run(&args(&["/nonexistent/cube.fits", "0", "0", "0"])).unwrap_err();
        assert!(err.contains("Error reading '/nonexistent/cube.fits'"));
    }

    #[test]
    fn run_prints_sum() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_labelled_cube(&dir);
        let p = path.to_str().unwrap();

        let out = run(&args(&["--width", "0", p, "1", "2", "3"])).unwrap();
        assert_eq!(out, "123\n");

        let out = run(&args(&["--team", "LoreliB", "--width", "0", p, "1", "2", "3"])).unwrap();
        assert_eq!(out, "321\n");

        let out = run(&args(&["--widths", "0,0,2", p, "1", "2", "3"])).unwrap();
        assert_eq!(out, "369\n");
    }

    #[test]
    fn run_accepts_negative_coordinates() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_labelled_cube(&dir);
        let p = path.to_str().unwrap();

        let out = run(&args(&["--width", "2", p, "-1", "0", "0"])).unwrap();
        // x clips to index 0; y and z keep indices 0 and 1.
        assert_eq!(out, "22\n");
    }

    #[test]
    fn run_rejects_negative_width() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_labelled_cube(&dir);
        let p = path.to_str().unwrap();

        let err = run(&args(&["--width", "-1", p, "0", "0", "0"])).unwrap_err();
        assert!(err.contains("box widths must be non-negative"));
    }

    #[test]
    fn run_verbose_reports_selection() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_labelled_cube(&dir);
        let p = path.to_str().unwrap();

        let argv = args(&["-v", "--team", "EoR-PIE", "--width", "2", p, "1", "2", "3"]);
        let out = run(&argv).unwrap();
        assert!(out.contains("Shape: [4, 5, 6]"));
        assert!(out.contains("axis order: Reversed"));
        assert!(out.contains("Centre voxel (x, y, z): [1, 2, 3]"));
        assert!(out.contains("Half-widths (x, y, z): [1, 1, 1]"));
        assert!(out.contains("Ranges (array order): [2..4, 1..4, 0..3]"));
        assert!(out.contains("Voxels: 18"));
        assert!(out.contains("Sum: 4878"));
    }

    #[test]
    fn run_verbose_empty_box() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_labelled_cube(&dir);
        let p = path.to_str().unwrap();

        let out = run(&args(&["-v", "--team", "ReionYuga", p, "40", "0", "0"])).unwrap();
        assert!(out.contains("Ranges (array order): [4..4, 0..1, 0..1]"));
        assert!(out.contains("Voxels: 0"));
        assert!(out.contains("Sum: 0\n"));
    }
}
