//! Core 2-D vertex-model tissue simulation library.
//!
//! Cells are polygons that share edges and vertices. Area and line tension
//! forces move the vertices; extrusion, division, T1 neighbour exchange and
//! four-fold vertex splits rewire the topology.
//!
//! Main components:
//! - [`tissue`]: the entity context: creation, destruction, adjacency
//!   bookkeeping, neighbourhoods and consistency checks.
//! - [`vertex`], [`edge`], [`cell`]: the three entity kinds and their local
//!   geometry and sequence edits.
//! - [`transitions`]: extrusion, division, T1 flip and four-fold split.
//! - [`phases`]: the per-timestep pipeline.
//! - [`order`]: director winding numbers and defect detection.
//! - [`seed`]: initial tessellations and their ingestion.
//! - [`snapshot`]: read-only state copies for output.
//! - [`arena`]: fixed-capacity slot storage.
//! - [`geometry`]: polygon and tensor helpers.
//! - [`config`]: simulation parameters.
//! - [`error`]: the error type.
//! - [`types`]: entity identities.

pub mod arena;
pub mod cell;
pub mod config;
pub mod edge;
pub mod error;
pub mod geometry;
pub mod order;
pub mod phases;
pub mod seed;
pub mod snapshot;
pub mod tissue;
pub mod transitions;
pub mod types;
pub mod vertex;

pub use config::Config;
pub use error::{Result, TissueError};
pub use seed::Seed;
pub use snapshot::Snapshot;
pub use tissue::{StepReport, Tissue};
pub use types::{CellId, EdgeId, EntityKind, VertexId};
