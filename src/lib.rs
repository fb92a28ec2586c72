// ============================================================================
// SPOILER ENGINE - Particle field that hides text until it is revealed
// ============================================================================
//
//   sim/     particle population per text region
//   render   drawing contract (canvas context, or a recorded DrawList)
//   reveal/  frame-paced Hidden -> Revealing -> Revealed loop
//   web      wasm-bindgen entry point driving canvases (wasm32 only)

pub mod config;
pub mod error;
pub mod render;
pub mod reveal;
pub mod sim;

#[cfg(target_arch = "wasm32")]
mod web;

pub use config::{RevealConfig, SimConfig, SpoilerConfig};
pub use error::{Error, Result};
pub use render::{DrawCommand, DrawList, Surface};
pub use reveal::{
    FramePacer, Host, QueuedHost, Region, RevealController, RevealEvent, RevealState, TickToken,
    TimerToken, is_activation_key,
};
pub use sim::{Particle, ParticleField, target_count};

#[cfg(target_arch = "wasm32")]
pub use web::SpoilerSpan;
