mod timer;

#[cfg(feature = "worker")]
mod worker;

pub use self::timer::{Timer, TimerOperation, TimerOutput};

#[cfg(feature = "worker")]
pub use self::worker::{Worker, WorkerError, WorkerOperation, WorkerOutput, WorkerResult};

// We use Crux's built-in Render capability directly because it provides
// all necessary functionality for triggering view updates.
pub use crux_core::render::Render;

use crate::app::App;
use crate::Event;

pub type AppRender = Render<Event>;
pub type AppTimer = Timer<Event>;

#[cfg(feature = "worker")]
pub type AppWorker = Worker<Event>;

#[derive(crux_core::macros::Effect)]
#[effect(app = "App")]
pub struct Capabilities {
    pub render: Render<Event>,
    pub timer: Timer<Event>,

    #[cfg(feature = "worker")]
    pub worker: Worker<Event>,
}
