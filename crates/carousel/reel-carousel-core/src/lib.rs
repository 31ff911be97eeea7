//! Reel Carousel Core (host-agnostic)
//!
//! Playback synchronization for the highlight carousel: one active slide at a
//! time, a proportional progress bar per slide, automatic advance at video end
//! and a single play/pause/replay control. Media elements, the frame ticker,
//! the scroll animator and the viewport are collaborators reached through
//! [`CarouselHost`]; adapters (wasm, native) implement it and apply the
//! [`Outputs`] each operation returns.

pub mod carousel;
pub mod config;
pub mod control;
pub mod error;
pub mod hero;
pub mod host;
pub mod ids;
pub mod machine;
pub mod outputs;
pub mod progress;
pub mod readiness;
pub mod slides;

// Re-exports for consumers (adapters)
pub use carousel::Carousel;
pub use config::{Breakpoints, Config, HeroConfig};
pub use control::{indicator_dots, ControlAction, ControlIcon, ControlSurface, IndicatorDot};
pub use error::{CarouselError, MediaError};
pub use hero::{HeroSource, HeroVideo};
pub use host::{
    Breakpoint, CarouselHost, FrameScheduler, MediaArena, MediaElement, MemoryHost, MemoryMedia,
    RecordingAnimator, SlideAnimator, Ticker,
};
pub use ids::{SlideId, TickToken};
pub use machine::{Phase, PlaybackMachine, PlaybackState, Transition};
pub use outputs::{CarouselEvent, Outputs, ProgressChange};
pub use progress::{BarColor, BarWidthMode, DotWidth, ProgressBar, ProgressDriver};
pub use readiness::ReadinessTracker;
pub use slides::{slide_offset_percent, Slide, SlideRegistry};

/// Carousel result type
pub type Result<T> = core::result::Result<T, CarouselError>;
