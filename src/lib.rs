//! Canvas engine for the seat and floor-plan designer.
//!
//! This crate is compiled to WebAssembly and runs in the browser. It draws a
//! venue floor plan (background image, seat and section markers, shape
//! overlays) on a stack of canvas layers, and turns raw pointer, wheel and
//! keyboard input into high-level [`engine::Action`]s: selection, marker
//! moves, shape transforms, drawn shapes and placement clicks. The host owns
//! the document and the camera; it applies the actions and hands the new
//! state back through [`engine::Engine::set_scene`].
//!
//! Marker positions are percentages of the design surface, so a plan keeps
//! its layout whatever size the canvas is shown at.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Browser engine and the testable [`engine::EngineCore`] |
//! | [`doc`] | Marker store, seat/section/overlay records |
//! | [`shape`] | Placement shapes, validation and local geometry |
//! | [`camera`] | Points and the host-owned pan/zoom camera |
//! | [`layout`] | Letterboxed surface rect and coordinate projection |
//! | [`input`] | Input event types, UI state and the gesture state machine |
//! | [`hit`] | Hit-testing markers, overlays and transform handles |
//! | [`selection`] | Selection state, marquee and batch drag |
//! | [`transform`] | Resize and rotate math |
//! | [`draw`] | Drag-to-size and freeform shape drawing |
//! | [`marker`] | Marker phases, drag policy, styles and the raster cache |
//! | [`virtualize`] | Viewport culling and level-of-detail switches |
//! | [`layers`] | Paint layers and dirty tracking |
//! | [`primitive`] | Shape to pixel primitives |
//! | [`render`] | Layer painting on a 2D context |
//! | [`config`] | Tunable thresholds |
//! | [`error`] | Crate error types |
//! | [`consts`] | Fixed constants of the surface and shape catalogue |

pub mod camera;
pub mod config;
pub mod consts;
pub mod doc;
pub mod draw;
pub mod engine;
pub mod error;
pub mod hit;
pub mod input;
pub mod layers;
pub mod layout;
pub mod marker;
pub mod primitive;
pub mod render;
pub mod selection;
pub mod shape;
pub mod transform;
pub mod virtualize;
