pub mod event;
pub mod lifecycle;
pub mod task;

pub use event::*;
pub use lifecycle::*;
pub use task::*;
