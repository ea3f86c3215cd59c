/// firnpack: layered snow/firn/ice column engine.
///
/// The grid holds one point's stack of layers, surface first. External
/// energy-balance and heat-diffusion solvers mutate it each timestep;
/// `Grid::update_grid` keeps the mesh well-formed, and the albedo and
/// roughness schemes read the surface state.
pub mod albedo;
pub mod config;
pub mod constants;
pub mod error;
pub mod grid;
pub mod init;
pub mod layer;
pub mod roughness;
pub mod traits;

pub use albedo::{AlbedoMethod, AlbedoModel, AlbedoOutput};
pub use config::{GridConfig, ModelConfig};
pub use error::{GridError, GridResult};
pub use grid::{FreshSnow, Grid, RemeshSummary, Snapshot};
pub use init::{init_debris_pack, init_snowpack, load_snowpack, InitialForcing};
pub use layer::{Layer, LayerKind, LayerProfile, LayerValues, Material};
pub use roughness::{RoughnessMethod, RoughnessModel};
