pub mod options;
pub mod task;
pub mod theme;
