//! Frame layout resolution
//!
//! Everything here is a pure function of the hardware variant and the number
//! of enabled data streams.

pub mod frame_layout;
pub mod variant;
pub mod view;

pub use frame_layout::{
    BOARD_ADC_CHANNELS, BOARD_DAC_CHANNELS, DIGITAL_LINES, FrameLayout, HEADER_WORDS, StimFlag,
};
pub use variant::{HardwareVariant, Linear, ScaleTable};
pub use view::SlotView;
