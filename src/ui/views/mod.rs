pub mod components;
pub mod releases;
pub mod rollback;
