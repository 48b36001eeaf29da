//! SPARQL text builders, one catalog per chamber on top of [`common`].

pub mod camera;
pub mod common;
pub mod senato;
