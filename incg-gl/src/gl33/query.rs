//! GPU timer queries.

use gl::types::*;

/// Measures GPU time spent between [`TimerQuery::begin`] and [`TimerQuery::end`].
///
/// Two queries are used in turns: the result read at the end of a frame is the one of the previous
/// frame, which is almost always available already.
#[derive(Debug)]
pub struct TimerQuery {
  queries: [GLuint; 2],
  current: usize,
}

impl TimerQuery {
  /// Create the queries.
  ///
  /// Both are primed with an empty measure so that the first frame has something to read.
  pub fn new() -> Self {
    let mut queries = [0; 2];

    unsafe {
      gl::GenQueries(2, queries.as_mut_ptr());

      for &query in &queries {
        gl::BeginQuery(gl::TIME_ELAPSED, query);
        gl::EndQuery(gl::TIME_ELAPSED);
      }
    }

    TimerQuery {
      queries,
      current: 0,
    }
  }

  /// Start measuring.
  pub fn begin(&mut self) {
    unsafe { gl::BeginQuery(gl::TIME_ELAPSED, self.queries[self.current]) };
  }

  /// Stop measuring, and get the duration of the previous measure, in milliseconds.
  pub fn end(&mut self) -> f64 {
    unsafe { gl::EndQuery(gl::TIME_ELAPSED) };
    self.current = (self.current + 1) % 2;

    let query = self.queries[self.current];

    unsafe {
      let mut available: GLint = 0;
      while available == 0 {
        gl::GetQueryObjectiv(query, gl::QUERY_RESULT_AVAILABLE, &mut available);
      }

      let mut elapsed: GLuint64 = 0;
      gl::GetQueryObjectui64v(query, gl::QUERY_RESULT, &mut elapsed);

      nanos_to_millis(elapsed)
    }
  }
}

impl Drop for TimerQuery {
  fn drop(&mut self) {
    unsafe {
      gl::DeleteQueries(2, self.queries.as_ptr());
    }
  }
}

fn nanos_to_millis(nanos: u64) -> f64 {
  nanos as f64 * 1e-6
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn milliseconds() {
    assert_eq!(nanos_to_millis(0), 0.);
    assert!((nanos_to_millis(16_666_667) - 16.666667).abs() < 1e-9);
  }
}
