//! Pathview engine crate.
//!
//! Window, GPU, and display plumbing for previewing a progressive renderer:
//! a render step writes into a GPU pixel buffer, the display blits it to the
//! window every frame.

pub mod capture;
pub mod config;
pub mod core;
pub mod device;
pub mod display;
pub mod input;
pub mod logging;
pub mod step;
pub mod time;
pub mod window;
