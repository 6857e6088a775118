// Library surface for the typewriter core; the binary only adds rendering.
pub mod app_dirs;
pub mod character;
pub mod clock;
pub mod config;
pub mod input;
pub mod jam;
pub mod persistence;
pub mod runtime;
pub mod session;
pub mod stats;
pub mod store;
pub mod typewriter;

pub use typewriter::Typewriter;
