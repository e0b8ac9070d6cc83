//! Frame timing.
//!
//! - one `FrameClock` per render loop; call `tick()` once per presented frame
//! - `RateMeter` turns those ticks into a periodic frames-per-second figure

mod frame_clock;
mod rate;

pub use frame_clock::{FrameClock, FrameTime};
pub use rate::RateMeter;
