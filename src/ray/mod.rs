//! Rays, hit records, and ray/triangle intersection algorithms.

mod ray_impl;
mod woop;

pub use self::ray_impl::*;
pub use self::woop::*;
