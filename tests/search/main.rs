//! End-to-end search tests through the `Recdex` facade.

mod common;

mod config_files;
mod facade_flow;
mod session_flow;
