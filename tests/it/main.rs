//! Single test binary entry point.
//!
//! - workflow: structural edits through the public handle
//! - gestures: pointer sequences end to end
//! - observers: subscription lifetimes and delivery order
//! - loading: host JSON for data and options

// Test binary links the whole lib dependency set.
#![allow(unused_crate_dependencies)]

mod gestures;
mod helpers;
mod loading;
mod observers;
mod workflow;
