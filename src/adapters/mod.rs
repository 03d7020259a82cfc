// Adapters layer: concrete implementations of the domain ports.

pub mod shell;
pub mod storage;

pub use shell::ShellRunner;
pub use storage::LocalStorage;
