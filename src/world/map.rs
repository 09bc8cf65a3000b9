//! The 2D cell grid the rays march through.
//!
//! With raycasting the world is flat: a `Map` is a row-major array of
//! [`MapUnit`]s, `(x, y)` at index `x + y * w`.  A simple 3×3 room:
//!
//! ```text
//!     [ Wall, Wall, Wall ]
//!     [ Wall, Air , Wall ]
//!     [ Wall, Wall, Wall ]
//! ```
//!
//! Door state lives in a side array owned by the map; door cells carry a
//! [`DoorId`] into it, the same stable-index scheme the texture bank uses.

use crate::world::texture::TextureId;

/// Stable handle into [`Map::door`] / [`Map::door_mut`].
pub type DoorId = u16;

/// Door sliding speed, in texture-offset units per second.
pub const DOOR_SPEED: f32 = 40.0;

/// What a grid cell contains.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MapUnitKind {
    Air,
    /// Full solid cell.
    Wall,
    /// Half-wall on the ↘ diagonal of the cell.
    DiagLr,
    /// Half-wall on the ↙ diagonal of the cell.
    DiagRl,
    /// Sliding door on the cell's mid-line.
    Door,
    /// Thin wall on the cell's mid-line; opaque with alpha cut-outs.
    Strip,
    /// Thin wall on the cell's mid-line, alpha-blended 50/50.
    Glass,
}

/// Animation state of one sliding door.
///
/// `offset` is how much of the door panel still covers the opening, in
/// texture columns: `offset == max` is fully closed, `offset == min` fully
/// open.  `min` is a sixth of the panel so the door never retracts
/// completely out of its frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DoorState {
    pub offset: f32,
    pub min: f32,
    pub max: f32,
    pub speed: f32,
    pub phase: DoorPhase,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DoorPhase {
    #[default]
    Idle,
    /// Offset shrinking towards `min`.
    Opening,
    /// Offset growing towards `max`.
    Closing,
}

impl DoorState {
    /// A closed, idle door sized for a panel `texture_width` columns wide.
    pub fn new(texture_width: usize) -> Self {
        let max = texture_width as f32;
        Self {
            offset: max,
            min: (texture_width / 6) as f32,
            max,
            speed: DOOR_SPEED,
            phase: DoorPhase::Idle,
        }
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.offset <= self.min
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.offset >= self.max
    }

    #[inline]
    pub fn is_animating(&self) -> bool {
        self.phase != DoorPhase::Idle
    }

    /// Start sliding towards the opposite endpoint.  No-op mid-animation.
    pub fn toggle(&mut self) {
        if self.is_animating() {
            return;
        }
        self.phase = if self.is_open() {
            DoorPhase::Closing
        } else {
            DoorPhase::Opening
        };
    }

    /// Advance the animation by `dt` seconds.
    ///
    /// Returns `true` when the door just reached its endpoint and went
    /// idle, so callers can drop it from their working set.
    pub fn step(&mut self, dt: f32) -> bool {
        match self.phase {
            DoorPhase::Idle => false,
            DoorPhase::Opening => {
                self.offset = (self.offset - self.speed * dt).max(self.min);
                if self.offset == self.min {
                    self.phase = DoorPhase::Idle;
                    true
                } else {
                    false
                }
            }
            DoorPhase::Closing => {
                self.offset = (self.offset + self.speed * dt).min(self.max);
                if self.offset == self.max {
                    self.phase = DoorPhase::Idle;
                    true
                } else {
                    false
                }
            }
        }
    }
}

/// One grid cell.
///
/// `passable` overrides physical blocking for walking — decorative
/// see-through cells can let the player pass while still rendering.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MapUnit {
    pub kind: MapUnitKind,
    pub texture: Option<TextureId>,
    pub door: Option<DoorId>,
    pub passable: bool,
}

impl MapUnit {
    pub fn air() -> Self {
        Self {
            kind: MapUnitKind::Air,
            texture: None,
            door: None,
            passable: true,
        }
    }

    pub fn wall(texture: TextureId) -> Self {
        Self::textured(MapUnitKind::Wall, texture)
    }

    pub fn diag_lr(texture: TextureId) -> Self {
        Self::textured(MapUnitKind::DiagLr, texture)
    }

    pub fn diag_rl(texture: TextureId) -> Self {
        Self::textured(MapUnitKind::DiagRl, texture)
    }

    pub fn strip(texture: TextureId) -> Self {
        Self::textured(MapUnitKind::Strip, texture)
    }

    pub fn glass(texture: TextureId) -> Self {
        Self::textured(MapUnitKind::Glass, texture)
    }

    pub fn door(texture: TextureId, door: DoorId) -> Self {
        Self {
            kind: MapUnitKind::Door,
            texture: Some(texture),
            door: Some(door),
            passable: false,
        }
    }

    fn textured(kind: MapUnitKind, texture: TextureId) -> Self {
        Self {
            kind,
            texture: Some(texture),
            door: None,
            passable: false,
        }
    }
}

/// Invalid map construction.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MapError {
    #[error("map dimensions {w}x{h} are not usable")]
    BadDimensions { w: usize, h: usize },

    #[error("map is {w}x{h} but {got} units were supplied")]
    UnitCountMismatch { w: usize, h: usize, got: usize },

    #[error("unit at index {0} is a door without a door state")]
    MissingDoor(usize),

    #[error("unit at index {index} references door id {id} out of range")]
    BadDoorId { index: usize, id: DoorId },

    #[error("non-air unit at index {0} has no texture")]
    MissingTexture(usize),
}

/// The grid plus its door-state arena.
#[derive(Debug)]
pub struct Map {
    w: usize,
    h: usize,
    units: Vec<MapUnit>,
    doors: Vec<DoorState>,
}

impl Map {
    /// Validates the per-unit invariants: doors carry a valid [`DoorId`],
    /// every non-air cell has a texture, air cells have none.
    ///
    /// Borders are expected non-air so rays terminate inside the grid; the
    /// DDA additionally bounds itself, so this is not enforced here.
    pub fn new(
        w: usize,
        h: usize,
        units: Vec<MapUnit>,
        doors: Vec<DoorState>,
    ) -> Result<Self, MapError> {
        if w < 3 || h < 3 {
            return Err(MapError::BadDimensions { w, h });
        }
        if units.len() != w * h {
            return Err(MapError::UnitCountMismatch {
                w,
                h,
                got: units.len(),
            });
        }
        for (index, unit) in units.iter().enumerate() {
            match unit.kind {
                MapUnitKind::Air => {}
                MapUnitKind::Door => {
                    let id = unit.door.ok_or(MapError::MissingDoor(index))?;
                    if id as usize >= doors.len() {
                        return Err(MapError::BadDoorId { index, id });
                    }
                    if unit.texture.is_none() {
                        return Err(MapError::MissingTexture(index));
                    }
                }
                _ => {
                    if unit.texture.is_none() {
                        return Err(MapError::MissingTexture(index));
                    }
                }
            }
        }
        Ok(Self { w, h, units, doors })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.w
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.h
    }

    /// Step bound for the DDA and the fog normalizer both derive from this.
    #[inline]
    pub fn diameter(&self) -> usize {
        self.w + self.h
    }

    /// Cell at `(x, y)`, or `None` outside the grid.
    #[inline]
    pub fn unit(&self, x: i32, y: i32) -> Option<&MapUnit> {
        if x < 0 || y < 0 || x as usize >= self.w || y as usize >= self.h {
            return None;
        }
        self.units.get(x as usize + y as usize * self.w)
    }

    #[inline]
    pub fn door(&self, id: DoorId) -> Option<&DoorState> {
        self.doors.get(id as usize)
    }

    #[inline]
    pub fn door_mut(&mut self, id: DoorId) -> Option<&mut DoorState> {
        self.doors.get_mut(id as usize)
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
