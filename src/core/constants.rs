//! Engine-wide constants shared by the bridge and the headless engine.
//! Keeping them in a single place makes it easier to tweak magic numbers.

/// Largest view or framebuffer dimension the engine accepts.
pub const MAX_DIMENSION: i32 = 65_535;

/// Baseline display density (dots per inch) that maps to a pixel ratio of 1.
pub const DENSITY_DEFAULT: u32 = 160;

/// Density reported by images that carry no density information.
pub const DENSITY_NONE: u32 = 0;

/// Square tile size in logical pixels.
pub const TILE_SIZE: f64 = 512.0;

/// Default camera zoom limits.
pub const DEFAULT_MIN_ZOOM: f64 = 0.0;
pub const DEFAULT_MAX_ZOOM: f64 = 25.5;

/// Pitch limits in degrees.
pub const MIN_PITCH: f64 = 0.0;
pub const MAX_PITCH: f64 = 60.0;

/// Web Mercator projection constants
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Number of debug overlays cycled by `cycle_debug_options`.
pub const DEBUG_OPTION_COUNT: u8 = 4;
