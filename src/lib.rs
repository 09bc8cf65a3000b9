//! gridcast — a software 2.5D grid raycasting engine.
//!
//! The engine projects a 2D cell grid into a first-person view using
//! per-column DDA raycasting: textured walls, floor/ceiling casting,
//! diagonal half-walls, thin and alpha-blended walls, sliding doors,
//! billboard sprites, an optional panoramic skybox and depth fog.
//!
//! Each frame is composed into a linear `0xAARRGGBB` pixel buffer; the
//! host is responsible for presenting that buffer (see `src/bin/view.rs`
//! for a minifb host).

pub mod mapfile;
pub mod renderer;
pub mod sim;
pub mod world;
