//! Fault subsections and the distance/azimuth service.
//!
//! Purpose
//! - `FaultSection`: immutable identity + trace record, indexed by `SectionId`
//!   (the id equals the section's position in the model's section list).
//! - `DistAzCalc`: the opaque distance/azimuth service consumed by connection
//!   building and by filters. `SectionDistAzCalc` is the geometric, memoized
//!   implementation; `DistanceTable` serves precomputed distances.
//!
//! Conventions
//! - Traces live in a local Cartesian frame in km (x east, y north).
//! - Azimuths are degrees clockwise from north in [0, 360).

mod dist_az;
mod types;
pub(crate) mod util;

pub use dist_az::{DistAzCalc, DistanceTable, SectionDistAzCalc};
pub use types::{
    sections_from_records, validate_sections, FaultSection, ParentId, SectionId, SectionRecord,
};
pub use util::{angle_diff, azimuth_deg};
