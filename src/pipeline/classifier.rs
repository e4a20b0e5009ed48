use std::time::{Duration, Instant};

/// Wrist x-position, in pixels, observed at one point in time.
#[derive(Debug, Clone, Copy)]
pub struct MotionSample {
    pub at: Instant,
    pub x: f32,
}

/// Discrete directional signal broadcast to subscribers.
///
/// Motion toward increasing x is reported as `Left`. Counter-intuitive,
/// but existing clients depend on the mapping, so it stays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeEvent {
    Left,
    Right,
}

impl SwipeEvent {
    /// Wire form sent to subscribers.
    pub fn as_str(&self) -> &'static str {
        match self {
            SwipeEvent::Left => "Left",
            SwipeEvent::Right => "Right",
        }
    }
}

impl std::fmt::Display for SwipeEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Debounced edge detector over consecutive motion samples.
///
/// State is a single baseline slot: the previous sample's x and the time of
/// the last emitted event. Continuous motion below the threshold is
/// ignored; motion crossing it fires at most once per debounce window.
pub struct SwipeClassifier {
    threshold: f32,
    debounce: Duration,
    last_x: Option<f32>,
    last_event_at: Instant,
}

impl SwipeClassifier {
    pub fn new(threshold: f32, debounce: Duration) -> Self {
        // Backdate the event clock so the very first qualifying movement is
        // not suppressed by the debounce window.
        let last_event_at = Instant::now()
            .checked_sub(debounce)
            .unwrap_or_else(Instant::now);
        Self {
            threshold,
            debounce,
            last_x: None,
            last_event_at,
        }
    }

    pub fn classify(&mut self, sample: MotionSample) -> Option<SwipeEvent> {
        let Some(last_x) = self.last_x else {
            self.last_x = Some(sample.x);
            return None;
        };

        let movement = sample.x - last_x;
        let mut event = None;
        if movement.abs() > self.threshold
            && sample.at.duration_since(self.last_event_at) > self.debounce
        {
            event = Some(if movement > 0.0 {
                SwipeEvent::Left
            } else {
                SwipeEvent::Right
            });
            self.last_event_at = sample.at;
        }

        // The baseline always advances, whether or not an event fired.
        self.last_x = Some(sample.x);
        event
    }
}
