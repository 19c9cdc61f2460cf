//! Background execution of pending process steps.

pub mod process_worker;
pub mod state;

pub use process_worker::ProcessWorker;
pub use state::WorkerState;
