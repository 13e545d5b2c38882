pub mod aggregate;
pub mod comments;
pub mod convergence;
pub mod harvester;
pub mod loader;
pub mod surface;
pub mod templates;
