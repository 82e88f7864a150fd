// Infrastructure layer - the remote collaborator and the plumbing around it

pub mod backend;
pub mod backend_decorators;
pub mod debounce;
pub mod memory_backend;

pub use backend::{Backend, BackendOp};
pub use backend_decorators::{BackendDecorator, FaultInjectionBackend, MetricsBackend, OpStats};
pub use debounce::Debouncer;
pub use memory_backend::InMemoryBackend;
