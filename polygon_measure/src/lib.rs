//! Area and cut/fill volume of polygons drawn on a spherical terrain.
//!
//! A ring of longitude/latitude vertices is projected onto a tangent plane,
//! triangulated with Fortune's sweep, forced to respect its boundary and
//! refined where the terrain bends. The resulting mesh is integrated for
//! surface area and for the volume above and below a best-fit plane.
//! Paths can be sampled into elevation profiles over the same terrain.

pub mod config;
pub mod geometry;
pub mod io;
pub mod local_grid;
pub mod measure;
pub mod mesh;
pub mod plane;
pub mod profile;
pub mod terrain;
pub mod volume;
pub mod voronoi;

pub use config::MeasureConfig;
pub use local_grid::LngLat;
pub use measure::{measure, DegenerateReason, MeasureStatus, Measurement};
pub use terrain::{FlatTerrain, HeightField, TinTerrain};
pub use voronoi::Diagram;
