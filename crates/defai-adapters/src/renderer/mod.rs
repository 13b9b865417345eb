//! Template renderers.

mod element;

pub use element::ElementRenderer;
