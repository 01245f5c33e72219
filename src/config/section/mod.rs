//! Configuration section definitions.

mod build;
mod dev;
mod vm;

pub use build::BuildSectionConfig;
pub use dev::DevConfig;
pub use vm::{PeripheralConfig, VmConfig};
