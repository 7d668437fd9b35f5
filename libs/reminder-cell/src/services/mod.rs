pub mod pipeline;
pub mod windows;
