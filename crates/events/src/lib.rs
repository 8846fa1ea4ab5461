//! Domain events shared by the event-sourced modules.

pub mod event;

pub use event::Event;
