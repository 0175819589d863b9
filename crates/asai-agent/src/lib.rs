//! One chat turn end to end, plus its HTML rendering.
//!
//! This crate contains:
//! - **processor**: user text → model reply → optional render turn
//! - **triggers**: keyword detection in model replies
//! - **render**: conversation → HTML fragment

pub mod processor;
pub mod render;
pub mod triggers;

pub use processor::TurnProcessor;
pub use render::{escape_html, render_conversation};
pub use triggers::RenderTriggers;
