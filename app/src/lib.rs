//! # meshview app
//!
//! Viewer session around the meshview core: camera input handling, render
//! option toggles, model cycling, and the GPU-facing [`RenderBackend`]
//! interface with its two-pass draw driver.
//!
//! The windowing layer is a collaborator, not a dependency: it feeds an
//! [`meshview_core::input::InputState`] from its event callbacks and calls
//! [`Viewer::update`] once per frame.
//!
//! ## Overview
//!
//! - [`Viewer`] - session state: camera, options, current model
//! - [`RenderBackend`] - interface a GPU layer implements
//! - [`ModelRenderer`] - uploads models and drives the two-pass draw
//! - [`library`] - asset directory scanning

pub mod backend;
pub mod library;
pub mod viewer;

pub use backend::{DrawCall, ModelRenderer, PassKind, RenderBackend, RenderFlags};
pub use viewer::{CameraSettings, RenderOptions, Viewer};

/// App library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
