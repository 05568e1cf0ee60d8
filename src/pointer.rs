#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// `left`/`top` declarations placing an absolutely positioned element
    /// at this point.
    pub fn style(&self) -> String {
        format!("left: {:.2}px; top: {:.2}px;", self.x, self.y)
    }
}

/// Click position relative to the clicked element's bounding box origin.
pub fn ripple_offset(client: Point, rect_left: f64, rect_top: f64) -> Point {
    Point::new(client.x - rect_left, client.y - rect_top)
}

pub fn glow_position(client_x: i32, client_y: i32) -> Point {
    Point::new(f64::from(client_x), f64::from(client_y))
}
