//! Monochrome framebuffer with toroidal wraparound.
//!
//! Sprite draws near an edge spill over to the opposite edge, so every
//! coordinate is reduced modulo width/height before it touches the pixel
//! array. Out-of-range coordinates alias into the grid; they never fault.

/// A width x height grid of on/off pixels, row-major.
pub struct FrameBuffer {
    width: usize,
    height: usize,
    pixels: Vec<bool>,
}

impl FrameBuffer {
    /// Allocate an all-off grid.
    ///
    /// # Panics
    ///
    /// Panics if `width` or `height` is zero.
    pub fn new(width: usize, height: usize) -> Self {
        assert!(width > 0 && height > 0, "framebuffer dimensions must be nonzero");
        Self {
            width,
            height,
            pixels: vec![false; width * height],
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Pixel state at `(x, y)`, wrapped.
    pub fn read(&self, x: usize, y: usize) -> bool {
        self.pixels[self.index(x, y)]
    }

    /// Set the pixel at `(x, y)`, wrapped.
    pub fn write(&mut self, x: usize, y: usize, on: bool) {
        let index = self.index(x, y);
        self.pixels[index] = on;
    }

    /// Switch every pixel off.
    pub fn clear(&mut self) {
        self.pixels.fill(false);
    }

    /// The whole grid, row-major, for hosts that blit rather than poll.
    pub fn pixels(&self) -> &[bool] {
        &self.pixels
    }

    fn index(&self, x: usize, y: usize) -> usize {
        (x % self.width) + self.width * (y % self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_coordinates_before_indexing() {
        let mut framebuffer = FrameBuffer::new(64, 32);
        framebuffer.write(64, 0, true);
        assert!(framebuffer.read(0, 0));
        framebuffer.write(3, 32, true);
        assert!(framebuffer.read(3, 0));
        framebuffer.write(64 + 5, 32 + 7, true);
        assert!(framebuffer.read(5, 7));
    }

    #[test]
    fn write_then_read_round_trips() {
        let mut framebuffer = FrameBuffer::new(64, 32);
        framebuffer.write(10, 20, true);
        assert!(framebuffer.read(10, 20));
        framebuffer.write(10, 20, false);
        assert!(!framebuffer.read(10, 20));
    }

    #[test]
    fn clear_switches_everything_off() {
        let mut framebuffer = FrameBuffer::new(64, 32);
        framebuffer.write(0, 0, true);
        framebuffer.write(63, 31, true);
        framebuffer.clear();
        assert!(framebuffer.pixels().iter().all(|&pixel| !pixel));
    }

    #[test]
    fn pixels_are_row_major() {
        let mut framebuffer = FrameBuffer::new(64, 32);
        framebuffer.write(2, 1, true);
        assert!(framebuffer.pixels()[64 + 2]);
    }
}
