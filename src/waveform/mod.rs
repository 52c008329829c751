//! Scrolling amplitude-bar waveform.
//!
//! This is the animation core of barwave. A [`Visualizer`] owns a
//! [`BarTimeline`](timeline::BarTimeline), feeds it from an
//! [`AmplitudeSource`] through the sampler and paints it onto a [`Surface`]
//! once per tick. Nothing in here knows about terminals or audio devices.

pub mod clock;
pub mod easing;
pub mod error;
pub mod lifecycle;
pub mod renderer;
pub mod sampler;
pub mod schedule;
pub mod surface;
pub mod timeline;

pub use clock::MonotonicClock;
pub use easing::Easing;
pub use error::VisualizerError;
pub use lifecycle::Visualizer;
pub use sampler::{AmplitudeSource, SourceResult};
pub use schedule::{FrameTimer, Scheduler, StopHandle};
pub use surface::{DisplayList, FillRect, Surface};
