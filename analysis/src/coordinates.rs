use common::demo_analysis::Position;

/// Affine mapping from world units onto the minimap canvas.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MapTransform {
    pub scale: f32,
    pub x_offset: f32,
    pub y_offset: f32,
}

impl Default for MapTransform {
    fn default() -> Self {
        Self {
            scale: 0.39,
            x_offset: 150.0,
            y_offset: -150.0,
        }
    }
}

impl MapTransform {
    /// World Y grows north while canvas Y grows down, so it gets flipped.
    pub fn to_canvas(&self, world: Position, width: f32, height: f32) -> Position {
        Position {
            x: world.x * self.scale + width / 2.0 + self.x_offset,
            y: -world.y * self.scale + height / 2.0 + self.y_offset,
        }
    }
}
