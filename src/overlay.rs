use serde::Serialize;

pub const TILE_SIZE: u32 = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TileCoord {
    pub x: i64,
    pub y: i64,
    pub zoom: u8,
}

impl TileCoord {
    pub fn new(x: i64, y: i64, zoom: u8) -> Self {
        Self { x, y, zoom }
    }
}

/// Image element handed to the map for one tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TileImage {
    pub src: String,
    pub alt: String,
    visible: bool,
}

impl TileImage {
    fn new(src: String) -> Self {
        Self {
            src,
            alt: String::new(),
            visible: true,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Missing tiles render blank instead of as a broken image.
    pub fn on_load_error(&mut self) {
        self.visible = false;
    }
}

/// Custom overlay layer drawn over the base map.
pub trait TileSource: Send + Sync {
    fn tile_size(&self) -> (u32, u32);
    fn tile(&self, coord: TileCoord) -> TileImage;
    fn release(&self, _tile: TileImage) {}
}

#[derive(Debug, Clone)]
pub struct TileOverlay {
    endpoint: String,
    map_id: String,
}

impl TileOverlay {
    pub fn new(endpoint: impl Into<String>, map_id: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            map_id: map_id.into(),
        }
    }

    pub fn tile_url(&self, coord: TileCoord) -> String {
        format!(
            "{}{}-{}-{}-{}.png",
            self.endpoint, self.map_id, coord.x, coord.y, coord.zoom
        )
    }
}

impl TileSource for TileOverlay {
    fn tile_size(&self) -> (u32, u32) {
        (TILE_SIZE, TILE_SIZE)
    }

    fn tile(&self, coord: TileCoord) -> TileImage {
        TileImage::new(self.tile_url(coord))
    }
}
