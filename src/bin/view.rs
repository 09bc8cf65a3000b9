//! Interactive first-person viewer.
//!
//! ```bash
//! cargo run --release -- [map.txt] [--fog] [--no-skybox]
//! ```
//!
//! All textures are generated procedurally so the demo needs no asset
//! files; a built-in map is used when none is given.  WASD moves, mouse
//! or arrow keys look around, Ctrl sneaks, Shift sprints, F opens doors,
//! Esc quits.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;
use glam::vec2;
use minifb::{Key, MouseMode, Window, WindowOptions};

use gridcast::{
    mapfile::{self, TileTextures},
    renderer::Renderer,
    sim::Interactor,
    world::{Camera, Scene, Sprite, Texture, TextureBank, TriggerAction},
};

const W: usize = 1280;
const H: usize = 800;

/// Keys the engine cares about, with their binding codes.
const BOUND_KEYS: [(Key, u32); 7] = [
    (Key::W, 'W' as u32),
    (Key::A, 'A' as u32),
    (Key::S, 'S' as u32),
    (Key::D, 'D' as u32),
    (Key::LeftCtrl, 17),
    (Key::LeftShift, 16),
    (Key::F, 'F' as u32),
];

const DEMO_MAP: &str = "\
16
12
################
#      s       #
# m    #   g   #
#      #       #
#### d ##   ####
#      #       #
#  x   d    m  #
#      #       #
#  g   #####d###
#      #       #
#   s  #   n   #
################
";

#[derive(Parser)]
#[command(about = "gridcast first-person viewer")]
struct Cli {
    /// ASCII map file; a built-in demo map is used when omitted.
    map: Option<PathBuf>,

    /// Enable depth fog.
    #[arg(long)]
    fog: bool,

    /// Fog density (only meaningful with --fog).
    #[arg(long, default_value_t = 3.0)]
    fog_level: f32,

    /// Draw a textured ceiling instead of the panoramic skybox.
    #[arg(long)]
    no_skybox: bool,

    /// Render at full window resolution instead of half-res + 2x blit.
    #[arg(long)]
    full_res: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let source = match &cli.map {
        Some(path) => std::fs::read_to_string(path)?,
        None => DEMO_MAP.to_string(),
    };

    let mut bank = TextureBank::default_with_checker();
    let wall = bank.insert("WALL", brick_texture())?;
    let diagonal = bank.insert("DIAG", stone_texture())?;
    let door = bank.insert("DOOR", door_texture())?;
    let glass = bank.insert("GLASS", glass_texture())?;
    let strip = bank.insert("STRIP", strip_texture())?;
    let floor = bank.insert("FLOOR", floor_texture())?;
    let ceiling = bank.insert("CEILING", ceiling_texture())?;
    let sky = bank.insert("SKY", sky_texture())?;
    let orb = bank.insert("ORB", orb_texture())?;

    let tiles = TileTextures {
        wall,
        diagonal,
        door,
        glass,
        strip,
    };
    let parsed = mapfile::parse(&source, &tiles, &bank)?;
    let spawn = parsed.spawn.unwrap_or(vec2(1.5, 1.5));

    let mut scene = Scene::new(parsed.map);
    scene.set_floor_texture(floor);
    scene.set_ceiling_texture(ceiling);
    scene.set_skybox_texture(sky);
    scene.enable_skybox(!cli.no_skybox);
    scene.set_skybox_repeats(1);
    scene.enable_fog(cli.fog);
    scene.set_fog_color(0x000000);
    scene.set_fog_level(cli.fog_level);
    // a shy orb two cells west of the spawn; walking up to it pushes it
    // further down the corridor
    scene.sprites.push(Sprite {
        texture: orb,
        x: spawn.x - 2.0,
        y: spawn.y,
        z: 9.0,
        interactable: true,
        trigger_range: 1.0,
        action: TriggerAction::MoveBy { dx: -1.0, dy: 0.0 },
    });
    scene.check_valid()?;

    let mut camera = Camera::new(spawn, vec2(-1.0, 0.0));
    let mut renderer = Renderer::new(W, H);
    renderer.set_super_resolution(!cli.full_res);
    let mut interactor = Interactor::new(W);

    let mut win = Window::new("gridcast", W, H, WindowOptions::default())?;
    win.set_target_fps(60);

    let mut frame = vec![0u32; W * H];
    let mut held = [false; BOUND_KEYS.len()];
    let mut last_mouse = win.get_mouse_pos(MouseMode::Pass);

    // ────────────────── benchmarking state ──────────────────────────────
    let mut acc_time = Duration::ZERO;
    let mut acc_frames = 0usize;
    let mut last_print = Instant::now();

    while win.is_open() && !win.is_key_down(Key::Escape) {
        let t0 = Instant::now();

        // the logical frame time paces all input for the next frame
        let dt = renderer.render(&scene, &camera, &bank, &mut frame)?;

        /* key edges ------------------------------------------------------- */
        for (i, (key, code)) in BOUND_KEYS.iter().enumerate() {
            let down = win.is_key_down(*key);
            if down && !held[i] {
                interactor.key_down(*code, &mut camera, &mut scene.map);
            } else if !down && held[i] {
                interactor.key_up(*code, &mut camera);
            }
            held[i] = down;
        }

        /* look: mouse delta, arrow keys as fallback ----------------------- */
        if let Some(pos) = win.get_mouse_pos(MouseMode::Pass) {
            if let Some(last) = last_mouse {
                let dx = pos.0 - last.0;
                let dy = pos.1 - last.1;
                if dx.abs() > 1.0 || dy.abs() > 1.0 {
                    interactor.look(&mut camera, dt, dx * 0.25, dy * 0.25);
                }
            }
            last_mouse = Some(pos);
        }
        if win.is_key_down(Key::Left) {
            interactor.look(&mut camera, dt, -8.0, 0.0);
        }
        if win.is_key_down(Key::Right) {
            interactor.look(&mut camera, dt, 8.0, 0.0);
        }
        if win.is_key_down(Key::Up) {
            interactor.look(&mut camera, dt, 0.0, -8.0);
        }
        if win.is_key_down(Key::Down) {
            interactor.look(&mut camera, dt, 0.0, 8.0);
        }

        /* doors, movement, sprite triggers -------------------------------- */
        interactor.frame(&mut camera, &mut scene, dt);

        win.update_with_buffer(&frame, W, H)?;

        // ─────────── accumulate & report every ~3 s ────────────────────
        acc_time += t0.elapsed();
        acc_frames += 1;
        if last_print.elapsed() >= Duration::from_secs(3) {
            let avg_ms = acc_time.as_secs_f64() * 1000.0 / acc_frames as f64;
            println!("avg frame: {:.2} ms  ({:.1} FPS)", avg_ms, 1000.0 / avg_ms);
            acc_time = Duration::ZERO;
            acc_frames = 0;
            last_print = Instant::now();
        }
    }
    Ok(())
}

/*──────────────────────── procedural textures ───────────────────────*/

fn brick_texture() -> Texture {
    let (w, h) = (64, 64);
    let mut pix = vec![0u32; w * h];
    for y in 0..h {
        let course = y / 16;
        for x in 0..w {
            let shift = if course & 1 == 0 { 0 } else { 16 };
            let mortar = y % 16 < 2 || (x + shift) % 32 < 2;
            pix[y * w + x] = if mortar { 0xFF_606060 } else { 0xFF_A0522D };
        }
    }
    Texture { w, h, pixels: pix }
}

fn stone_texture() -> Texture {
    let (w, h) = (64, 64);
    let mut pix = vec![0u32; w * h];
    for y in 0..h {
        for x in 0..w {
            let v = 0x70 + (((x * 7 + y * 13) % 23) as u32) * 4;
            pix[y * w + x] = 0xFF_000000 | (v << 16) | (v << 8) | v;
        }
    }
    Texture { w, h, pixels: pix }
}

fn door_texture() -> Texture {
    let (w, h) = (64, 64);
    let mut pix = vec![0u32; w * h];
    for y in 0..h {
        for x in 0..w {
            // barred window in the upper half
            let window = (12..30).contains(&y) && (8..56).contains(&x) && x % 12 < 8;
            pix[y * w + x] = if window {
                0x00_000000
            } else if y % 16 < 2 {
                0xFF_503010
            } else {
                0xFF_8B5A2B
            };
        }
    }
    Texture { w, h, pixels: pix }
}

fn glass_texture() -> Texture {
    let (w, h) = (64, 64);
    let mut pix = vec![0xFF_9FD7E8u32; w * h];
    for i in 0..w {
        // frame plus a diagonal glint
        pix[i] = 0xFF_B0B0B0;
        pix[(h - 1) * w + i] = 0xFF_B0B0B0;
        pix[i * w] = 0xFF_B0B0B0;
        pix[i * w + w - 1] = 0xFF_B0B0B0;
        pix[i * w + (w - 1 - i)] = 0xFF_C8ECF5;
    }
    Texture { w, h, pixels: pix }
}

fn strip_texture() -> Texture {
    let (w, h) = (64, 64);
    let mut pix = vec![0u32; w * h];
    for y in 0..h {
        for x in 0..w {
            pix[y * w + x] = if x % 8 < 3 { 0xFF_C8B060 } else { 0x00_000000 };
        }
    }
    Texture { w, h, pixels: pix }
}

fn floor_texture() -> Texture {
    let (w, h) = (64, 64);
    let mut pix = vec![0u32; w * h];
    for y in 0..h {
        for x in 0..w {
            let edge = x % 32 < 1 || y % 32 < 1;
            let v = if edge { 0xFF_303828 } else { 0xFF_4F6542 };
            pix[y * w + x] = v;
        }
    }
    Texture { w, h, pixels: pix }
}

fn ceiling_texture() -> Texture {
    let (w, h) = (64, 64);
    let mut pix = vec![0u32; w * h];
    for y in 0..h {
        for x in 0..w {
            let rivet = x % 16 < 2 && y % 16 < 2;
            pix[y * w + x] = if rivet { 0xFF_808898 } else { 0xFF_5A6270 };
        }
    }
    Texture { w, h, pixels: pix }
}

fn sky_texture() -> Texture {
    let (w, h) = (512, 256);
    let mut pix = vec![0u32; w * h];
    for y in 0..h {
        // dusk gradient with a band of haze at the horizon
        let t = y as f32 / h as f32;
        let r = (30.0 + 140.0 * t) as u32;
        let g = (40.0 + 90.0 * t) as u32;
        let b = (90.0 + 60.0 * t) as u32;
        for x in 0..w {
            let streak = ((x * 13 + y * 31) % 97) == 0 && y < h / 3;
            pix[y * w + x] = if streak {
                0xFF_FFFFFF
            } else {
                0xFF_000000 | (r << 16) | (g << 8) | b
            };
        }
    }
    Texture { w, h, pixels: pix }
}

fn orb_texture() -> Texture {
    let (w, h) = (64, 64);
    let mut pix = vec![0u32; w * h];
    let c = 31.5f32;
    for y in 0..h {
        for x in 0..w {
            let d = ((x as f32 - c).powi(2) + (y as f32 - c).powi(2)).sqrt();
            pix[y * w + x] = if d < 24.0 {
                let v = (0xFF as f32 * (1.0 - d / 28.0)) as u32;
                0xFF_000000 | (v << 8) | (v / 2)
            } else {
                0x00_000000 // transparent halo
            };
        }
    }
    Texture { w, h, pixels: pix }
}
