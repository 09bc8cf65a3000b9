//! ASCII **map-file parser** — builds a [`Map`] out of a character grid.
//!
//! The format is two decimal header lines (width, height) followed by
//! `height` rows of exactly `width` cells:
//!
//! ```text
//! 5
//! 5
//! #####
//! #   #
//! # x #
//! #   #
//! #####
//! ```
//!
//! Cell alphabet: `' '` air, `'x'` air + player spawn, `'m'` ↙ diagonal,
//! `'n'` ↘ diagonal, `'d'` door, `'g'` glass, `'s'` strip, anything else a
//! solid wall.  The caller supplies which texture each cell class uses;
//! door states are sized from the door texture's panel width.

use glam::{Vec2, vec2};

use crate::world::{
    DoorId, DoorState, Map, MapError, MapUnit, TextureBank, TextureError, TextureId,
};

/// Texture assignment for each cell class the format can produce.
#[derive(Clone, Copy, Debug)]
pub struct TileTextures {
    pub wall: TextureId,
    pub diagonal: TextureId,
    pub door: TextureId,
    pub glass: TextureId,
    pub strip: TextureId,
}

/// A parsed grid plus the spawn point, if the map marked one.
#[derive(Debug)]
pub struct ParsedMap {
    pub map: Map,
    pub spawn: Option<Vec2>,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum MapFileError {
    #[error("missing {0} header line")]
    MissingHeader(&'static str),

    #[error("bad {name} header `{value}`")]
    BadHeader { name: &'static str, value: String },

    #[error("map declares {expected} rows but only {got} are present")]
    MissingRows { expected: usize, got: usize },

    #[error("row {row} is {got} cells wide, expected {expected}")]
    RowLength {
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error(transparent)]
    Texture(#[from] TextureError),

    #[error(transparent)]
    Map(#[from] MapError),
}

/// Parse `source` into a [`Map`], resolving cell classes through `tiles`.
///
/// `bank` is consulted for the door texture so each door's travel range
/// matches its panel width.
pub fn parse(
    source: &str,
    tiles: &TileTextures,
    bank: &TextureBank,
) -> Result<ParsedMap, MapFileError> {
    let mut lines = source.lines();
    let w = header(lines.next(), "width")?;
    let h = header(lines.next(), "height")?;

    let door_panel_w = bank.texture(tiles.door)?.w;

    let mut units = Vec::with_capacity(w * h);
    let mut doors: Vec<DoorState> = Vec::new();
    let mut spawn = None;

    let mut rows = 0usize;
    for (row, line) in lines.take(h).enumerate() {
        let got = line.chars().count();
        if got != w {
            return Err(MapFileError::RowLength {
                row,
                expected: w,
                got,
            });
        }
        for (col, c) in line.chars().enumerate() {
            units.push(match c {
                ' ' => MapUnit::air(),
                'x' => {
                    spawn = Some(vec2(col as f32 + 0.5, row as f32 + 0.5));
                    MapUnit::air()
                }
                'm' => MapUnit::diag_rl(tiles.diagonal),
                'n' => MapUnit::diag_lr(tiles.diagonal),
                'd' => {
                    doors.push(DoorState::new(door_panel_w));
                    MapUnit::door(tiles.door, (doors.len() - 1) as DoorId)
                }
                'g' => MapUnit::glass(tiles.glass),
                's' => MapUnit::strip(tiles.strip),
                _ => MapUnit::wall(tiles.wall),
            });
        }
        rows += 1;
    }
    if rows != h {
        return Err(MapFileError::MissingRows {
            expected: h,
            got: rows,
        });
    }

    let map = Map::new(w, h, units, doors)?;
    Ok(ParsedMap { map, spawn })
}

fn header(line: Option<&str>, name: &'static str) -> Result<usize, MapFileError> {
    let line = line.ok_or(MapFileError::MissingHeader(name))?;
    line.trim()
        .parse()
        .map_err(|_| MapFileError::BadHeader {
            name,
            value: line.to_string(),
        })
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{MapUnitKind, Texture};

    fn bank_and_tiles() -> (TextureBank, TileTextures) {
        let mut bank = TextureBank::default_with_checker();
        let wall = bank.insert("WALL", Texture::solid(8, 8, 0xFF_111111)).unwrap();
        let door = bank.insert("DOOR", Texture::solid(60, 60, 0xFF_222222)).unwrap();
        let tiles = TileTextures {
            wall,
            diagonal: wall,
            door,
            glass: wall,
            strip: wall,
        };
        (bank, tiles)
    }

    #[test]
    fn parses_grid_and_spawn() {
        let (bank, tiles) = bank_and_tiles();
        let src = "5\n5\n#####\n#m d#\n# x #\n#g s#\n#####\n";
        let parsed = parse(src, &tiles, &bank).unwrap();

        assert_eq!(parsed.spawn, Some(vec2(2.5, 2.5)));
        let map = parsed.map;
        assert_eq!(map.width(), 5);
        assert_eq!(map.unit(0, 0).unwrap().kind, MapUnitKind::Wall);
        assert_eq!(map.unit(1, 1).unwrap().kind, MapUnitKind::DiagRl);
        assert_eq!(map.unit(3, 1).unwrap().kind, MapUnitKind::Door);
        assert_eq!(map.unit(1, 3).unwrap().kind, MapUnitKind::Glass);
        assert_eq!(map.unit(3, 3).unwrap().kind, MapUnitKind::Strip);
        assert_eq!(map.unit(2, 2).unwrap().kind, MapUnitKind::Air);

        // door travel derives from the 60-wide panel
        let door = map.door(map.unit(3, 1).unwrap().door.unwrap()).unwrap();
        assert_eq!(door.max, 60.0);
        assert_eq!(door.min, 10.0);
    }

    #[test]
    fn header_errors() {
        let (bank, tiles) = bank_and_tiles();
        assert_eq!(
            parse("", &tiles, &bank).unwrap_err(),
            MapFileError::MissingHeader("width")
        );
        assert_eq!(
            parse("abc\n3\n", &tiles, &bank).unwrap_err(),
            MapFileError::BadHeader {
                name: "width",
                value: "abc".into()
            }
        );
    }

    #[test]
    fn shape_errors() {
        let (bank, tiles) = bank_and_tiles();
        assert_eq!(
            parse("3\n3\n###\n##\n###\n", &tiles, &bank).unwrap_err(),
            MapFileError::RowLength {
                row: 1,
                expected: 3,
                got: 2
            }
        );
        assert_eq!(
            parse("3\n3\n###\n###\n", &tiles, &bank).unwrap_err(),
            MapFileError::MissingRows { expected: 3, got: 2 }
        );
    }
}
