mod generation;
mod model_types;
mod resolution;
mod scene;

pub use generation::{GenerationJob, GenerationKind, GenerationStatus};
pub use model_types::ImageModel;
pub use resolution::Resolution;
pub use scene::Scene;
