//! Meshing of the polygon interior: boundary recovery and refinement.

pub mod recovery;
pub mod refine;

pub use recovery::{recover_edges, Recovery, Ring};
pub use refine::{check_sleekness, check_terrain, refine, Refinement};
