pub mod config;
mod http;
pub mod model;
pub mod notion;
pub mod openai;
pub mod pipeline;
pub mod render;
pub mod webflow;
