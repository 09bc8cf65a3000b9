//! Per-column DDA ray marching over the map grid.
//!
//! A cast records every surface the ray crosses — thin walls, glass,
//! partially open doors, diagonal half-walls — until the first fully
//! opaque hit closes the column.  The compositor consumes the list
//! back-to-front so transparency stacks correctly.

use glam::Vec2;
use smallvec::SmallVec;

use crate::world::{DoorId, Map, MapUnitKind, NO_TEXTURE, TextureId};

/// Which face of the cell the ray entered through.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitSide {
    /// Crossed an x grid line (wall runs north–south).
    Ns,
    /// Crossed a y grid line (wall runs east–west).
    Ew,
    /// Intersected a diagonal half-wall.
    Diag,
}

/// One surface crossed by a column's ray.
#[derive(Clone, Copy, Debug)]
pub struct Hit {
    /// Distance along the camera's forward axis, not the ray itself, so
    /// strips keep constant height across a column (no fisheye).
    pub perp_dist: f32,
    /// Fraction along the hit surface in [0, 1), maps to a texture column.
    pub wall_x: f32,
    pub map_x: i32,
    pub map_y: i32,
    pub side: HitSide,
    pub kind: MapUnitKind,
    pub texture: TextureId,
    pub door: Option<DoorId>,
}

/// Per-column scratch list; columns rarely cross more than a few
/// transparent surfaces before a solid wall.
pub type HitList = SmallVec<[Hit; 8]>;

/// March `ray` from `pos`, appending hits to `hits` in traversal order.
///
/// Returns the column's far distance: the perp distance of the terminal
/// hit, or of the grid boundary if the ray escapes.  The step count is
/// bounded by the grid diameter so malformed maps cannot hang a column.
pub fn cast_column(map: &Map, pos: Vec2, ray: Vec2, hits: &mut HitList) -> f32 {
    hits.clear();

    let mut map_x = pos.x.floor() as i32;
    let mut map_y = pos.y.floor() as i32;

    let delta_x = (1.0 / ray.x).abs();
    let delta_y = (1.0 / ray.y).abs();

    let (step_x, mut side_x) = if ray.x < 0.0 {
        (-1, (pos.x - map_x as f32) * delta_x)
    } else {
        (1, (map_x as f32 + 1.0 - pos.x) * delta_x)
    };
    let (step_y, mut side_y) = if ray.y < 0.0 {
        (-1, (pos.y - map_y as f32) * delta_y)
    } else {
        (1, (map_y as f32 + 1.0 - pos.y) * delta_y)
    };

    for _ in 0..map.diameter() {
        let side;
        if side_x < side_y {
            side_x += delta_x;
            map_x += step_x;
            side = HitSide::Ns;
        } else {
            side_y += delta_y;
            map_y += step_y;
            side = HitSide::Ew;
        }

        let Some(unit) = map.unit(map_x, map_y) else {
            // escaped the grid: close the column at the boundary crossing
            return match side {
                HitSide::Ns => side_x - delta_x,
                _ => side_y - delta_y,
            };
        };

        let texture = unit.texture.unwrap_or(NO_TEXTURE);
        match unit.kind {
            MapUnitKind::Air => {}

            MapUnitKind::Wall => {
                let perp = match side {
                    HitSide::Ns => side_x - delta_x,
                    _ => side_y - delta_y,
                };
                hits.push(Hit {
                    perp_dist: perp,
                    wall_x: axis_wall_x(pos, ray, perp, side),
                    map_x,
                    map_y,
                    side,
                    kind: unit.kind,
                    texture,
                    door: None,
                });
                return perp;
            }

            MapUnitKind::Door | MapUnitKind::Strip | MapUnitKind::Glass => {
                // these surfaces sit on the cell's mid-line; if the ray
                // leaves through the other axis before reaching it, the
                // cell is missed entirely
                let perp = match side {
                    HitSide::Ns => {
                        let d = side_x - delta_x * 0.5;
                        if side_y < d {
                            continue;
                        }
                        d
                    }
                    _ => {
                        let d = side_y - delta_y * 0.5;
                        if side_x < d {
                            continue;
                        }
                        d
                    }
                };
                hits.push(Hit {
                    perp_dist: perp,
                    wall_x: axis_wall_x(pos, ray, perp, side),
                    map_x,
                    map_y,
                    side,
                    kind: unit.kind,
                    texture,
                    door: unit.door,
                });
                // a fully closed door is as solid as a wall; anything
                // ajar (and all strip/glass) lets the ray continue
                if unit.kind == MapUnitKind::Door {
                    let closed = unit
                        .door
                        .and_then(|id| map.door(id))
                        .is_none_or(|d| d.is_closed());
                    if closed {
                        return perp;
                    }
                }
            }

            MapUnitKind::DiagLr | MapUnitKind::DiagRl => {
                // intersect the ray with the diagonal y = k(x - map_x) + b
                // spanning the cell
                let (k, base, cam_side) = if unit.kind == MapUnitKind::DiagLr {
                    (
                        1.0,
                        map_y as f32,
                        pos.x - map_x as f32 - pos.y + map_y as f32,
                    )
                } else {
                    (
                        -1.0,
                        map_y as f32 + 1.0,
                        map_x as f32 - pos.x - pos.y + map_y as f32 + 1.0,
                    )
                };
                let denom = ray.y - k * ray.x;
                if denom.abs() <= f32::EPSILON {
                    continue; // ray parallel to the diagonal
                }
                let perp = (base + k * (pos.x - map_x as f32) - pos.y) / denom;
                let mut wall_x = pos.x + ray.x * perp - map_x as f32;
                if !(0.0..1.0).contains(&wall_x) || perp <= 0.0 {
                    continue;
                }
                if cam_side < 0.0 {
                    wall_x = 1.0 - wall_x;
                }
                hits.push(Hit {
                    perp_dist: perp,
                    wall_x,
                    map_x,
                    map_y,
                    side: HitSide::Diag,
                    kind: unit.kind,
                    texture,
                    door: None,
                });
            }
        }
    }

    // step bound exhausted on a malformed map; keep what was recorded
    hits.last().map_or(f32::INFINITY, |h| h.perp_dist)
}

/// First door surface along `ray` within `reach`, for the "use" action.
///
/// Follows the same mid-line rule as [`cast_column`]; any other solid
/// surface shadows everything behind it.
pub fn probe_door(map: &Map, pos: Vec2, ray: Vec2, reach: f32) -> Option<DoorId> {
    let mut map_x = pos.x.floor() as i32;
    let mut map_y = pos.y.floor() as i32;

    let delta_x = (1.0 / ray.x).abs();
    let delta_y = (1.0 / ray.y).abs();

    let (step_x, mut side_x) = if ray.x < 0.0 {
        (-1, (pos.x - map_x as f32) * delta_x)
    } else {
        (1, (map_x as f32 + 1.0 - pos.x) * delta_x)
    };
    let (step_y, mut side_y) = if ray.y < 0.0 {
        (-1, (pos.y - map_y as f32) * delta_y)
    } else {
        (1, (map_y as f32 + 1.0 - pos.y) * delta_y)
    };

    for _ in 0..map.diameter() {
        let ns = side_x < side_y;
        if ns {
            side_x += delta_x;
            map_x += step_x;
        } else {
            side_y += delta_y;
            map_y += step_y;
        }

        let unit = map.unit(map_x, map_y)?;
        match unit.kind {
            MapUnitKind::Air => {}
            MapUnitKind::Door => {
                let perp = if ns {
                    let d = side_x - delta_x * 0.5;
                    if side_y < d {
                        continue;
                    }
                    d
                } else {
                    let d = side_y - delta_y * 0.5;
                    if side_x < d {
                        continue;
                    }
                    d
                };
                return if perp > reach { None } else { unit.door };
            }
            _ => return None,
        }
    }
    None
}

fn axis_wall_x(pos: Vec2, ray: Vec2, perp: f32, side: HitSide) -> f32 {
    let w = match side {
        HitSide::Ns => pos.y + perp * ray.y,
        _ => pos.x + perp * ray.x,
    };
    w - w.floor()
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{Camera, DoorState, MapUnit};
    use glam::vec2;

    /// 5×5 room: solid border, air interior.
    fn room_5x5() -> Map {
        let mut units = Vec::with_capacity(25);
        for y in 0..5 {
            for x in 0..5 {
                units.push(if x == 0 || y == 0 || x == 4 || y == 4 {
                    MapUnit::wall(1)
                } else {
                    MapUnit::air()
                });
            }
        }
        Map::new(5, 5, units, Vec::new()).unwrap()
    }

    #[test]
    fn empty_room_every_column_lands_on_the_border() {
        let map = room_5x5();
        let cam = Camera::new(vec2(2.5, 2.5), vec2(-1.0, 0.0));
        let mut hits = HitList::new();

        for x in 0..64 {
            let far = cast_column(&map, cam.pos, cam.ray(x, 64), &mut hits);
            let last = hits.last().expect("column must terminate on a wall");
            assert_eq!(last.kind, MapUnitKind::Wall);
            assert!((1.49..2.6).contains(&last.perp_dist), "col {x}: {}", last.perp_dist);
            assert_eq!(far, last.perp_dist);
            assert!((0.0..1.0).contains(&last.wall_x));
            assert!(last.perp_dist < map.diameter() as f32);
        }

        // the centre column looks straight down -x at the wall in (0, 2)
        let far = cast_column(&map, cam.pos, cam.ray(32, 64), &mut hits);
        assert!((far - 1.5).abs() < 1e-4);
        assert_eq!((hits[0].map_x, hits[0].map_y), (0, 2));
        assert_eq!(hits[0].side, HitSide::Ns);
    }

    #[test]
    fn glass_in_front_of_wall_accumulates_two_hits() {
        let mut units = vec![MapUnit::air(); 25];
        units[2 * 5] = MapUnit::wall(1); // (0, 2)
        units[2 * 5 + 1] = MapUnit::glass(2); // (1, 2)
        let map = Map::new(5, 5, units, Vec::new()).unwrap();

        let mut hits = HitList::new();
        let far = cast_column(&map, vec2(2.5, 2.5), vec2(-1.0, 0.0), &mut hits);

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].kind, MapUnitKind::Glass);
        assert!((hits[0].perp_dist - 1.0).abs() < 1e-5); // the cell mid-line
        assert!((hits[0].wall_x - 0.5).abs() < 1e-5);
        assert_eq!(hits[1].kind, MapUnitKind::Wall);
        assert!((hits[1].perp_dist - 1.5).abs() < 1e-5);
        assert_eq!(far, hits[1].perp_dist);
    }

    #[test]
    fn midline_miss_when_ray_leaves_through_other_axis() {
        // glass at (2, 1); a steep ray entering its cell near the corner
        // exits through y before reaching the x mid-line
        let mut units = vec![MapUnit::air(); 25];
        units[5 + 2] = MapUnit::glass(2);
        let map = Map::new(5, 5, units, Vec::new()).unwrap();

        let mut hits = HitList::new();
        cast_column(&map, vec2(1.1, 1.95), vec2(1.0, -0.9), &mut hits);
        assert!(
            hits.iter().all(|h| h.kind != MapUnitKind::Glass),
            "mid-line behind the exit boundary must not hit"
        );
    }

    #[test]
    fn diagonal_hit_reports_dig_side() {
        let mut units = vec![MapUnit::air(); 9];
        units[4] = MapUnit::diag_rl(3); // (1, 1), panel from (2,1) to (1,2)
        let map = Map::new(3, 3, units, Vec::new()).unwrap();

        let mut hits = HitList::new();
        let inv = std::f32::consts::FRAC_1_SQRT_2;
        cast_column(&map, vec2(0.5, 0.5), vec2(inv, inv), &mut hits);

        let hit = hits
            .iter()
            .find(|h| h.side == HitSide::Diag)
            .expect("diagonal must be hit");
        assert!((0.0..1.0).contains(&hit.wall_x));
        assert!((hit.wall_x - 0.5).abs() < 1e-3);
        // the panel lies on x + y = 3; from (0.5, 0.5) along the unit
        // diagonal that is sqrt(2) away
        assert!((hit.perp_dist - std::f32::consts::SQRT_2).abs() < 1e-3);
    }

    #[test]
    fn diagonal_parallel_ray_misses() {
        let mut units = vec![MapUnit::air(); 9];
        units[4] = MapUnit::diag_lr(3); // runs along y = x
        let map = Map::new(3, 3, units, Vec::new()).unwrap();

        let mut hits = HitList::new();
        let inv = std::f32::consts::FRAC_1_SQRT_2;
        let far = cast_column(&map, vec2(0.2, 0.5), vec2(inv, inv), &mut hits);
        assert!(hits.is_empty());
        assert!(far.is_finite());
    }

    #[test]
    fn open_door_is_not_terminal_closed_door_is() {
        let mut units = vec![MapUnit::air(); 25];
        units[2 * 5] = MapUnit::wall(1); // (0, 2) backstop
        units[2 * 5 + 1] = MapUnit::door(4, 0); // (1, 2)
        let mut door = DoorState::new(64);
        door.offset = door.min; // fully open
        let map = Map::new(5, 5, units, vec![door]).unwrap();

        let mut hits = HitList::new();
        let far = cast_column(&map, vec2(2.5, 2.5), vec2(-1.0, 0.0), &mut hits);
        assert_eq!(hits.len(), 2, "open door must record a hit and continue");
        assert!((far - 1.5).abs() < 1e-5);

        let mut units = vec![MapUnit::air(); 25];
        units[2 * 5] = MapUnit::wall(1);
        units[2 * 5 + 1] = MapUnit::door(4, 0);
        let map = Map::new(5, 5, units, vec![DoorState::new(64)]).unwrap();
        let far = cast_column(&map, vec2(2.5, 2.5), vec2(-1.0, 0.0), &mut hits);
        assert_eq!(hits.len(), 1, "closed door terminates the column");
        assert!((far - 1.0).abs() < 1e-5);
    }

    #[test]
    fn escaping_ray_terminates_with_bounded_steps() {
        // open border on purpose: the cast must still return
        let map = Map::new(5, 5, vec![MapUnit::air(); 25], Vec::new()).unwrap();
        let mut hits = HitList::new();
        let far = cast_column(&map, vec2(2.5, 2.5), vec2(1.0, 0.3), &mut hits);
        assert!(hits.is_empty());
        assert!(far.is_finite() && far > 0.0);
    }

    #[test]
    fn probe_respects_reach_and_blockers() {
        let mut units = vec![MapUnit::air(); 25];
        units[2 * 5 + 1] = MapUnit::door(4, 0); // (1, 2), mid-line at 1.0
        let map = Map::new(5, 5, units, vec![DoorState::new(64)]).unwrap();

        let pos = vec2(2.5, 2.5);
        let ray = vec2(-1.0, 0.0);
        assert_eq!(probe_door(&map, pos, ray, 2.2), Some(0));
        assert_eq!(probe_door(&map, pos, ray, 0.5), None, "door beyond reach");

        // a wall in front of the door shadows it
        let mut units = vec![MapUnit::air(); 25];
        units[2 * 5 + 1] = MapUnit::door(4, 0);
        units[2 * 5 + 2] = MapUnit::wall(1); // camera is inside (2,2)... use (3,2) start
        let map = Map::new(5, 5, units, vec![DoorState::new(64)]).unwrap();
        assert_eq!(probe_door(&map, vec2(3.5, 2.5), ray, 4.0), None);
    }
}
