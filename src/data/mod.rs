pub mod annotations;
pub mod geojson;
pub mod image;
pub mod style;
