//! Billboard sprite projection and per-column strip rendering.
//!
//! Sprites are projected once per frame into screen-space state with
//! integer texture-stepping accumulators; the compositor then renders one
//! vertical strip per column as pure increments, interleaved between wall
//! hits by depth.

use crate::renderer::color;
use crate::renderer::renderer::Renderer;
use crate::renderer::Rgba;
use crate::world::{Camera, Scene, Texture, TextureBank, TextureId};

/// Keeps screen extents well inside `i32` for the accumulator math even
/// when a sprite is almost on top of the camera.
const MAX_SPRITE_EXTENT: i32 = 1 << 14;

/// One sprite transformed into screen space for the current frame.
///
/// `draw_start_x` and the x accumulator advance as columns render, so the
/// compositor must visit columns left to right.
pub(crate) struct ProjectedSprite {
    pub transform_y: f32,
    pub texture: TextureId,
    pub fog: f32,
    pub draw_start_x: i32,
    pub draw_end_x: i32,
    pub draw_start_y: i32,
    pub draw_end_y: i32,
    pub delta_x: i32,
    pub count_x: i32,
    pub texture_x: i32,
    pub delta_y: i32,
    pub count_y: i32,
    pub texture_y: i32,
}

impl Renderer {
    /// Project every scene sprite, keeping the visible ones sorted by
    /// ascending depth.  Sprites behind the camera plane or fully outside
    /// the view are culled here.
    pub(crate) fn project_sprites(
        &mut self,
        scene: &Scene,
        camera: &Camera,
        pitch_px: f32,
        fog_constant: f32,
        bank: &TextureBank,
    ) {
        self.sprites.clear();
        let w = self.render_width as i32;
        let h = self.render_height as i32;

        let inv_det =
            1.0 / (camera.plane.x * camera.dir.y - camera.dir.x * camera.plane.y);

        for sprite in &scene.sprites {
            let tex = bank.texture_or_missing(sprite.texture);
            let tw = tex.w as i32;
            let th = tex.h as i32;

            let rel_x = sprite.x - camera.pos.x;
            let rel_y = sprite.y - camera.pos.y;

            let transform_x = inv_det * (camera.dir.y * rel_x - camera.dir.x * rel_y);
            let transform_y = inv_det * (-camera.plane.y * rel_x + camera.plane.x * rel_y);
            if transform_y <= 0.0 {
                continue; // behind the camera plane
            }

            let screen_x = ((w / 2) as f32 * (1.0 + transform_x / transform_y)) as i32;
            let v_move = (sprite.z / transform_y) as i32;
            let lift = pitch_px + camera.z / transform_y;

            // billboards are square on screen: width follows height
            let extent = ((h as f32 / transform_y).abs() as i32).min(MAX_SPRITE_EXTENT);

            let mut draw_start_y = ((-(extent / 2) + h / 2 + v_move) as f32 + lift) as i32;
            let mut draw_end_y = ((extent / 2 + h / 2 + v_move) as f32 + lift) as i32;
            let mut draw_start_x = -(extent / 2) + screen_x;
            let mut draw_end_x = extent / 2 + screen_x;

            if draw_start_x >= w || draw_end_x < 0 {
                continue;
            }
            let delta_y = draw_end_y - draw_start_y;
            let delta_x = draw_end_x - draw_start_x;
            if delta_y <= 0 || delta_x <= 0 {
                continue;
            }

            let mut count_y = 0;
            let mut texture_y = 0;
            if draw_start_y < 0 {
                count_y = -draw_start_y * th;
                if count_y > delta_y {
                    texture_y += count_y / delta_y;
                    count_y %= delta_y;
                }
                draw_start_y = 0;
            }
            if draw_end_y >= h {
                draw_end_y = h - 1;
            }

            let mut count_x = 0;
            let mut texture_x = 0;
            if draw_start_x < 0 {
                count_x = -draw_start_x * tw;
                if count_x > delta_x {
                    texture_x += count_x / delta_x;
                    count_x %= delta_x;
                }
                draw_start_x = 0;
            }
            if draw_end_x > w {
                draw_end_x = w;
            }

            let fog = if scene.fog.enabled {
                transform_y / fog_constant * scene.fog.level
            } else {
                0.0
            };

            self.sprites.push(ProjectedSprite {
                transform_y,
                texture: sprite.texture,
                fog,
                draw_start_x,
                draw_end_x,
                draw_start_y,
                draw_end_y,
                delta_x,
                count_x,
                texture_x,
                delta_y,
                count_y,
                texture_y,
            });
        }

        // ascending depth; stable, so equal depths keep list order
        self.sprites
            .sort_by(|a, b| a.transform_y.total_cmp(&b.transform_y));
    }
}

/// Render one vertical strip of `spr` at screen column `x` and advance
/// its accumulators to the next column.
pub(crate) fn draw_sprite_strip(
    frame: &mut [Rgba],
    width: usize,
    spr: &mut ProjectedSprite,
    x: i32,
    tex: &Texture,
    fog_enabled: bool,
    fog_color: Rgba,
) {
    if x < spr.draw_start_x || x >= spr.draw_end_x {
        return;
    }
    let tw = tex.w as i32;
    let th = tex.h as i32;

    // columns the compositor never visited (hidden behind terminal walls)
    // are skipped in one step here
    let skipped = x - spr.draw_start_x;
    if skipped != 0 {
        spr.draw_start_x += skipped;
        let acc = spr.count_x + skipped * tw;
        spr.texture_x += acc / spr.delta_x;
        spr.count_x = acc % spr.delta_x;
    }

    let tex_x = spr.texture_x.clamp(0, tw - 1) as usize;
    let mut tex_y = spr.texture_y;
    let mut count_y = spr.count_y;
    for y in spr.draw_start_y..=spr.draw_end_y {
        let texel = tex.pixels[tex_y.clamp(0, th - 1) as usize * tex.w + tex_x];
        if color::is_opaque(texel) {
            let c = if fog_enabled {
                color::fog_mix(texel, fog_color, spr.fog)
            } else {
                texel
            };
            frame[y as usize * width + x as usize] = c;
        }
        count_y += th;
        while count_y > spr.delta_y {
            tex_y += 1;
            count_y -= spr.delta_y;
        }
    }

    spr.draw_start_x += 1;
    spr.count_x += tw;
    while spr.count_x > spr.delta_x {
        spr.texture_x += 1;
        spr.count_x -= spr.delta_x;
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
