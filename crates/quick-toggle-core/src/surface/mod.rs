mod command;
mod host;
mod renderer;

pub use {
    command::{ClickAction, RenderCommand, Tone, build_command},
    host::SurfaceHost,
    renderer::{RenderOutcome, SurfaceRenderer},
};
