pub mod bounds;
pub mod color;

// Foundation crate: small, well-tested primitives only.
pub use bounds::*;
pub use color::*;
