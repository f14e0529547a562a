//! Core building blocks: open/export parameters, coordinate timing and the
//! derived band operations. These are internal primitives consumed by the
//! `asar` assembler and the high-level `api` module.
pub mod derived;
pub mod params;
pub mod timing;
