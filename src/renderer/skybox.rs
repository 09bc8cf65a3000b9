//! Cylindrical skybox: ray azimuth picks the panorama column, pitch
//! slides the visible vertical slice.

use glam::Vec2;

use crate::renderer::renderer::Renderer;
use crate::world::{Scene, TextureBank};

impl Renderer {
    /// Fill every row above the horizon from the panorama.  Drawn as a
    /// raster background, before walls and sprites; fog never applies.
    pub(crate) fn render_skybox(
        &mut self,
        scene: &Scene,
        bank: &TextureBank,
        pitch_px: f32,
        ray_begin: Vec2,
        ray_end: Vec2,
    ) {
        let tex = bank.texture_or_missing(scene.skybox.unwrap_or_default());
        let w = self.render_width as i32;
        let tw = tex.w as i32;
        let th = tex.h as i32;
        let repeats = scene.skybox_repeats as f64;
        let half_h = (self.render_height / 2) as f32;

        let azimuth_to_column = |ray: Vec2| -> i32 {
            let az = -(ray.y as f64).atan2(ray.x as f64);
            (az * (tw as f64 / std::f64::consts::TAU) * repeats) as i32
        };
        let mut col_begin = azimuth_to_column(ray_begin);
        let mut col_end = azimuth_to_column(ray_end);

        // unwrap so the end column is ahead of the begin column, both
        // non-negative
        while col_end < col_begin {
            col_end += tw;
        }
        while col_begin < 0 {
            col_begin += tw;
            col_end += tw;
        }

        let rows = (half_h + pitch_px) as i32;
        if rows <= 0 {
            return;
        }
        // the full panorama height spans a fully pitched-up horizon
        let slice =
            (((th as f32 * (half_h + pitch_px)) / (half_h + self.pitch_max())) - 1.0) as i32;
        let slice = slice.max(0);

        let delta_col = col_end - col_begin;
        let mut run_x = 0;
        for x in 0..w {
            let tex_x = col_begin.rem_euclid(tw) as usize;

            let mut tex_y = 0i32;
            let mut run_y = 0;
            for y in 0..rows {
                self.scratch[y as usize * w as usize + x as usize] =
                    tex.pixels[tex_y.min(th - 1) as usize * tex.w + tex_x];
                run_y += slice;
                while run_y > rows {
                    tex_y += 1;
                    run_y -= rows;
                }
            }

            run_x += delta_col;
            while run_x > w {
                col_begin += 1;
                run_x -= w;
            }
        }
    }
}
