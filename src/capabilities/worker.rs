use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Registration of the app's background worker script.
///
/// Browser shells register the script with the platform; native shells
/// compile the crate without the `worker` feature and skip the whole
/// concern. Registration failure is reported back to the core but never
/// blocks anything.
pub struct Worker<E> {
    context: CapabilityContext<WorkerOperation, E>,
}

impl<Ev> Capability<Ev> for Worker<Ev> {
    type Operation = WorkerOperation;
    type MappedSelf<MappedEv> = Worker<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Worker::new(self.context.map_event(f))
    }
}

impl<E> Worker<E>
where
    E: Send + 'static,
{
    pub fn new(context: CapabilityContext<WorkerOperation, E>) -> Self {
        Self { context }
    }

    /// Registers the worker script at `script_url`.
    pub fn register<F>(&self, script_url: impl Into<String>, callback: F)
    where
        F: FnOnce(WorkerResult) -> E + Send + 'static,
    {
        let operation = WorkerOperation::Register {
            script_url: script_url.into(),
        };
        let context = self.context.clone();
        self.context.spawn(async move {
            let result = context.request_from_shell(operation).await;
            context.update_app(callback(result));
        });
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "op", content = "data")]
pub enum WorkerOperation {
    Register { script_url: String },
}

impl Operation for WorkerOperation {
    type Output = WorkerResult;
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum WorkerError {
    #[error("background workers are not supported on this platform")]
    Unsupported,

    #[error("registration failed: {reason}")]
    RegistrationFailed { reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "data")]
pub enum WorkerOutput {
    Registered { scope: String },
}

pub type WorkerResult = Result<WorkerOutput, WorkerError>;
