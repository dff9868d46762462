//! Projects and their durable store.

mod model;
mod store;

pub use model::{Priority, Project, ProjectInput, ProjectPatch};
pub use store::{ProjectStore, PROJECTS_KEY};
