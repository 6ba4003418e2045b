pub mod cli;
pub mod config;
pub mod cursor;
pub mod dispatch;
pub mod events;
pub mod handler;
pub mod handlers;
pub mod input;
pub mod menu;
pub mod registry;
pub mod render;
pub mod session;

pub use session::{FrameInput, InteractionSession};

