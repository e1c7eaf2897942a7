//! Track discovery: finds the rhythm and backing files on disk and probes
//! their durations.

mod model;
mod scan;

pub use model::*;
pub use scan::*;
