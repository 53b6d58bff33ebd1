//! Types shared between the pipeline core and the presentation boundary

pub mod messages;

pub use messages::StatusEvent;
