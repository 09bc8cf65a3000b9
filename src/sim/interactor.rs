//! Player interaction: movement with axis-separated collision, mouse
//! look, the door "use" action and door animation.

use glam::Vec2;

use crate::renderer::probe_door;
use crate::sim::input::{Action, KeyBindings, MoveKeys, Stance};
use crate::world::{Camera, DoorId, Map, MapUnit, MapUnitKind, Scene, TriggerAction};

/// Eye drop while sneaking, in screen units (the camera's fake z).
pub const SNEAK_Z: f32 = -100.0;

/// Drives camera and door state from host input events.
///
/// The interactor mutates camera and doors strictly *between* frames; the
/// renderer treats both as read-only while composing.
pub struct Interactor {
    /// Nominal walk speed in cells per second.
    pub move_speed: f32,
    /// Turn rate in radians per second per unit of mouse travel.
    pub rotate_speed: f32,
    /// Pitch rate relative to the turn rate.
    pub pitch_speed: f32,
    /// How far the "use" action reaches, in cells.
    pub reach: f32,

    bindings: KeyBindings,
    held: MoveKeys,
    stance: Stance,
    animating: Vec<DoorId>,
    screen_width: usize,
}

impl Interactor {
    /// `screen_width` is the column count used by the "use" raycast, so
    /// reach matches what the player actually sees.
    pub fn new(screen_width: usize) -> Self {
        Self {
            move_speed: 4.5,
            rotate_speed: std::f32::consts::FRAC_PI_2,
            pitch_speed: 1.8,
            reach: 2.2,
            bindings: KeyBindings::default(),
            held: MoveKeys::empty(),
            stance: Stance::Normal,
            animating: Vec::new(),
            screen_width,
        }
    }

    pub fn bindings_mut(&mut self) -> &mut KeyBindings {
        &mut self.bindings
    }

    #[inline]
    pub fn stance(&self) -> Stance {
        self.stance
    }

    /// Handle a key-press event.  Unbound codes are ignored.
    pub fn key_down(&mut self, code: u32, camera: &mut Camera, map: &mut Map) {
        let Some(action) = self.bindings.action(code) else {
            return;
        };
        match action {
            Action::Forward => self.held.insert(MoveKeys::FORWARD),
            Action::Back => self.held.insert(MoveKeys::BACK),
            Action::StrafeLeft => self.held.insert(MoveKeys::LEFT),
            Action::StrafeRight => self.held.insert(MoveKeys::RIGHT),
            Action::Sneak => {
                self.stance = Stance::Sneaking;
                camera.z = SNEAK_Z;
            }
            Action::Sprint => self.stance = Stance::Sprinting,
            Action::Interact => self.interact(camera, map),
        }
    }

    /// Handle a key-release event.
    ///
    /// Stance releases only undo their own state, so e.g. releasing
    /// sprint while sneaking leaves the sneak untouched.
    pub fn key_up(&mut self, code: u32, camera: &mut Camera) {
        let Some(action) = self.bindings.action(code) else {
            return;
        };
        match action {
            Action::Forward => self.held.remove(MoveKeys::FORWARD),
            Action::Back => self.held.remove(MoveKeys::BACK),
            Action::StrafeLeft => self.held.remove(MoveKeys::LEFT),
            Action::StrafeRight => self.held.remove(MoveKeys::RIGHT),
            Action::Sneak => {
                // the eye always comes back up, even if a sprint press
                // already took over the stance
                camera.z = 0.0;
                if self.stance == Stance::Sneaking {
                    self.stance = Stance::Normal;
                }
            }
            Action::Sprint => {
                if self.stance == Stance::Sprinting {
                    self.stance = Stance::Normal;
                }
            }
            Action::Interact => {}
        }
    }

    /// Mouse look: `dx`/`dy` are cursor deltas since the last frame.
    pub fn look(&mut self, camera: &mut Camera, dt: f32, dx: f32, dy: f32) {
        if dx != 0.0 {
            camera.rotate(-self.rotate_speed * dt * dx);
        }
        if dy != 0.0 {
            camera.add_pitch(-self.pitch_speed * self.rotate_speed * dt * dy);
        }
    }

    /// Advance everything that moves: doors, the camera, sprite triggers.
    ///
    /// Returns the ids of fired `TriggerAction::Custom` actions for the
    /// host to resolve.
    pub fn frame(&mut self, camera: &mut Camera, scene: &mut Scene, dt: f32) -> Vec<u32> {
        self.animate_doors(&mut scene.map, dt);
        self.frame_move(camera, &scene.map, dt);
        self.process_triggers(camera, scene)
    }

    /// Apply held movement keys with per-axis collision.
    pub fn frame_move(&mut self, camera: &mut Camera, map: &Map, dt: f32) {
        let speed = self.move_speed * dt * self.stance.speed_factor();
        let dir = camera.dir;
        let left = dir.perp(); // 90° counter-clockwise

        if self.held.contains(MoveKeys::FORWARD) {
            Self::try_step(camera, map, dir * speed);
        }
        if self.held.contains(MoveKeys::BACK) {
            Self::try_step(camera, map, -dir * speed);
        }
        if self.held.contains(MoveKeys::LEFT) {
            Self::try_step(camera, map, left * speed);
        }
        if self.held.contains(MoveKeys::RIGHT) {
            Self::try_step(camera, map, -left * speed);
        }
    }

    /// Commit each axis of `delta` independently: a blocked axis is
    /// dropped while the other still slides, so walking into a wall at an
    /// angle glides along it and the camera can never end up inside a
    /// solid cell.
    fn try_step(camera: &mut Camera, map: &Map, delta: Vec2) {
        let pos = camera.pos;
        let cell_x = map.unit((pos.x + delta.x).floor() as i32, pos.y.floor() as i32);
        if cell_x.is_some_and(|unit| Self::walkable(map, unit)) {
            camera.pos.x += delta.x;
        }
        let cell_y = map.unit(pos.x.floor() as i32, (pos.y + delta.y).floor() as i32);
        if cell_y.is_some_and(|unit| Self::walkable(map, unit)) {
            camera.pos.y += delta.y;
        }
    }

    fn walkable(map: &Map, unit: &MapUnit) -> bool {
        if unit.passable || unit.kind == MapUnitKind::Air {
            return true;
        }
        if unit.kind == MapUnitKind::Door {
            return unit
                .door
                .and_then(|id| map.door(id))
                .is_some_and(|d| d.is_open() && !d.is_animating());
        }
        false
    }

    /// The "use" action: probe every screen column for a door surface
    /// within reach and toggle the first one found.
    pub fn interact(&mut self, camera: &Camera, map: &mut Map) {
        for x in 0..self.screen_width {
            let ray = camera.ray(x, self.screen_width);
            let Some(id) = probe_door(map, camera.pos, ray, self.reach) else {
                continue;
            };
            let Some(door) = map.door_mut(id) else {
                continue;
            };
            if !door.is_animating() {
                door.toggle();
                self.animating.push(id);
            }
        }
    }

    /// Slide every animating door; doors that reach an endpoint leave the
    /// working set.
    pub fn animate_doors(&mut self, map: &mut Map, dt: f32) {
        self.animating
            .retain(|&id| match map.door_mut(id) {
                Some(door) => !door.step(dt),
                None => false,
            });
    }

    /// Fire the trigger of every interactable sprite in range.
    pub fn process_triggers(&mut self, camera: &Camera, scene: &mut Scene) -> Vec<u32> {
        let mut fired = Vec::new();
        for sprite in &mut scene.sprites {
            if !sprite.interactable {
                continue;
            }
            let distance = (Vec2::new(sprite.x, sprite.y) - camera.pos).length();
            if distance >= sprite.trigger_range {
                continue;
            }
            match sprite.action {
                TriggerAction::None => {}
                TriggerAction::MoveBy { dx, dy } => {
                    sprite.x += dx;
                    sprite.y += dy;
                }
                TriggerAction::Teleport { x, y } => {
                    sprite.x = x;
                    sprite.y = y;
                }
                TriggerAction::Custom(id) => fired.push(id),
            }
        }
        fired
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
