//! Screenshots of the display image.
//!
//! Files are named `{prefix}.{start time}.{iterations}samp.png`, so captures
//! from one session sort together and record how converged they were.

mod naming;
mod readback;
mod save;

pub use naming::{screenshot_file_name, timestamp_string};
pub use readback::read_display_image;
pub use save::save_png;
