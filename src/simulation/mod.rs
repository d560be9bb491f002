pub mod frame_clock;
pub mod input;

pub use frame_clock::FrameClock;
pub use input::{Buttons, InputSimulator, InputState};
