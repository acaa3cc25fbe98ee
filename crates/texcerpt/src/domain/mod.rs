//! Core types shared by the scanner, assembler, and front ends.

pub mod errors;
pub mod model;
