/// Which side of the track the yellow cones are on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    YellowLeft,
    YellowRight,
}

/// Sticky knowledge of the track orientation. Unknown until both colors have been seen together
/// once; after that it is only ever refreshed, never forgotten.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrientationMemory {
    orientation: Option<Orientation>,
}

impl OrientationMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe_both_visible(&mut self, blue_x: f32, yellow_x: f32) {
        self.orientation = Some(if yellow_x < blue_x {
            Orientation::YellowLeft
        } else {
            Orientation::YellowRight
        });
    }

    pub fn read(&self) -> Option<Orientation> {
        self.orientation
    }

    pub fn is_known(&self) -> bool {
        self.orientation.is_some()
    }
}
