pub mod material_loader;

pub use material_loader::{load_material_file, ImportedMaterial};
