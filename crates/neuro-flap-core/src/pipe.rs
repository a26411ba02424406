/// A pipe pair as seen by a bird: leading edge plus the passable gap between
/// the upper pipe's bottom (`top_height`) and the lower pipe's top (`bottom_start`).
/// Width is shared by every pipe and lives in [`crate::config::GameConfig`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pipe {
    pub x: f64,
    pub top_height: f64,
    pub bottom_start: f64,
}

impl Pipe {
    pub fn new(x: f64, top_height: f64, bottom_start: f64) -> Self {
        Self {
            x,
            top_height,
            bottom_start,
        }
    }

    /// Pipe whose gap of `gap_size` starts `top_height` below the screen top.
    pub fn with_gap(x: f64, top_height: f64, gap_size: f64) -> Self {
        Self::new(x, top_height, top_height + gap_size)
    }

    pub fn gap_midpoint(&self) -> f64 {
        (self.bottom_start + self.top_height) / 2.0
    }

    /// Horizontal centre of the pipe; birds score when they reach it.
    pub fn checkpoint(&self, pipe_width: f64) -> f64 {
        self.x + pipe_width / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gap_geometry() {
        let pipe = Pipe::with_gap(300.0, 100.0, 150.0);
        assert_eq!(pipe.bottom_start, 250.0);
        assert_eq!(pipe.gap_midpoint(), 175.0);
        assert_eq!(pipe.checkpoint(80.0), 340.0);
    }
}
