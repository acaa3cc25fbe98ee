//! Infrastructure adapters for config, the LaTeX toolchain, and the desktop.

pub mod config;
pub mod latex;
pub mod opener;
