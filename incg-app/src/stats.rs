//! GPU frame time statistics.

use std::fmt;

/// Number of frames kept.
pub const FRAME_STATS_LEN: usize = 120;

/// How frame times are shown.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum FrameTimeDisplay {
  /// Milliseconds per frame.
  Millis,
  /// Frames per second the GPU time alone would allow.
  Fps,
}

/// Ring buffer of the last [`FRAME_STATS_LEN`] GPU frame times.
#[derive(Clone, Debug)]
pub struct FrameStats {
  millis: [f32; FRAME_STATS_LEN],
  fps: [f32; FRAME_STATS_LEN],
  next: usize,
  len: usize,
  display: FrameTimeDisplay,
}

impl Default for FrameStats {
  fn default() -> Self {
    FrameStats {
      millis: [0.; FRAME_STATS_LEN],
      fps: [0.; FRAME_STATS_LEN],
      next: 0,
      len: 0,
      display: FrameTimeDisplay::Millis,
    }
  }
}

impl FrameStats {
  /// Empty statistics.
  pub fn new() -> Self {
    Self::default()
  }

  /// Record a frame that took `ms` milliseconds on the GPU.
  pub fn push(&mut self, ms: f32) {
    self.millis[self.next] = ms;
    self.fps[self.next] = if ms > 0. { 1000. / ms } else { 0. };
    self.next = (self.next + 1) % FRAME_STATS_LEN;
    self.len = (self.len + 1).min(FRAME_STATS_LEN);
  }

  /// Number of recorded frames, up to [`FRAME_STATS_LEN`].
  pub fn len(&self) -> usize {
    self.len
  }

  /// Whether no frame was recorded yet.
  pub fn is_empty(&self) -> bool {
    self.len == 0
  }

  /// Recorded values in the current display mode, oldest first.
  pub fn values(&self) -> impl Iterator<Item = f32> + '_ {
    let values = match self.display {
      FrameTimeDisplay::Millis => &self.millis,
      FrameTimeDisplay::Fps => &self.fps,
    };
    let start = (self.next + FRAME_STATS_LEN - self.len) % FRAME_STATS_LEN;

    (0..self.len).map(move |i| values[(start + i) % FRAME_STATS_LEN])
  }

  /// Last recorded value in the current display mode.
  pub fn last(&self) -> Option<f32> {
    self.values().last()
  }

  /// Average of the recorded values in the current display mode.
  pub fn average(&self) -> f32 {
    if self.len == 0 {
      0.
    } else {
      self.values().sum::<f32>() / self.len as f32
    }
  }

  /// Current display mode.
  pub fn display(&self) -> FrameTimeDisplay {
    self.display
  }

  /// Switch between milliseconds and frames per second.
  pub fn toggle_display(&mut self) {
    self.display = match self.display {
      FrameTimeDisplay::Millis => FrameTimeDisplay::Fps,
      FrameTimeDisplay::Fps => FrameTimeDisplay::Millis,
    };
  }
}

impl fmt::Display for FrameStats {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match self.display {
      FrameTimeDisplay::Millis => write!(f, "avg. {:.2} ms", self.average()),
      FrameTimeDisplay::Fps => write!(f, "avg. {:.0} fps (theoretical)", self.average()),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn averages_recorded_frames_only() {
    let mut stats = FrameStats::new();
    assert!(stats.is_empty());
    assert_eq!(stats.average(), 0.);

    stats.push(10.);
    stats.push(20.);

    assert_eq!(stats.len(), 2);
    assert_eq!(stats.average(), 15.);
    assert_eq!(stats.last(), Some(20.));
    assert_eq!(stats.to_string(), "avg. 15.00 ms");
  }

  #[test]
  fn ring_keeps_the_latest_frames() {
    let mut stats = FrameStats::new();

    for i in 0..FRAME_STATS_LEN + 10 {
      stats.push(i as f32);
    }

    let values = stats.values().collect::<Vec<_>>();
    assert_eq!(values.len(), FRAME_STATS_LEN);
    assert_eq!(values[0], 10.);
    assert_eq!(stats.last(), Some((FRAME_STATS_LEN + 9) as f32));
  }

  #[test]
  fn fps_display() {
    let mut stats = FrameStats::new();
    stats.push(4.);
    stats.push(0.);
    stats.toggle_display();

    assert_eq!(stats.display(), FrameTimeDisplay::Fps);
    assert_eq!(stats.values().collect::<Vec<_>>(), vec![250., 0.]);
    assert_eq!(stats.to_string(), "avg. 125 fps (theoretical)");

    stats.toggle_display();
    assert_eq!(stats.display(), FrameTimeDisplay::Millis);
  }
}
