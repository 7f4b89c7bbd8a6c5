pub mod merge;
pub mod repository;
pub mod summary;
pub mod task_ops;
