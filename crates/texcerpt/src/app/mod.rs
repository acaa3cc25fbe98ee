//! Application layer orchestrating domain logic and infrastructure.

pub mod assemble;
pub mod braces;
pub mod build;
pub mod navigation;
pub mod sanitize;
pub mod scan;
pub mod selection;
