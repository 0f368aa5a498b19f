// Non-blocking "wait N seconds, then advance" timer, checked once per tick

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DeferredTransition {
    remaining: Option<f32>,
}

impl DeferredTransition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the timer. Re-arming while already armed is ignored so a repeated
    /// completion signal cannot push the transition further out.
    pub fn arm(&mut self, delay: f32) {
        if self.remaining.is_none() {
            self.remaining = Some(delay.max(0.0));
        }
    }

    pub fn cancel(&mut self) {
        self.remaining = None;
    }

    pub fn is_armed(&self) -> bool {
        self.remaining.is_some()
    }

    pub fn remaining(&self) -> Option<f32> {
        self.remaining
    }

    /// Returns true exactly once, on the tick the delay runs out
    pub fn advance(&mut self, dt: f32) -> bool {
        match self.remaining {
            Some(remaining) => {
                let remaining = remaining - dt.max(0.0);
                if remaining <= 0.0 {
                    self.remaining = None;
                    true
                } else {
                    self.remaining = Some(remaining);
                    false
                }
            }
            None => false,
        }
    }
}
