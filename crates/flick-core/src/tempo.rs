//! Musical subdivisions for tempo-derived delay times.

/// Note value a tapped beat is divided into.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NoteDivision {
    /// One echo per beat.
    #[default]
    Quarter,
    /// Three echoes per two beats (the classic "dotted eighth" pattern).
    DottedEighth,
    /// Two echoes per beat.
    Eighth,
    /// Three echoes per beat.
    TripletEighth,
}

impl NoteDivision {
    /// Length of the division in beats.
    pub fn beats(&self) -> f32 {
        match self {
            NoteDivision::Quarter => 1.0,
            NoteDivision::DottedEighth => 0.75,
            NoteDivision::Eighth => 0.5,
            NoteDivision::TripletEighth => 1.0 / 3.0,
        }
    }

    /// Length of the division in milliseconds for a beat of `beat_ms`.
    ///
    /// ```rust
    /// use flick_core::NoteDivision;
    ///
    /// assert_eq!(NoteDivision::DottedEighth.to_ms(500.0), 375.0);
    /// ```
    pub fn to_ms(&self, beat_ms: f32) -> f32 {
        beat_ms * self.beats()
    }

    /// Length of the division in samples for a beat of `beat_ms`.
    pub fn to_samples(&self, beat_ms: f32, sample_rate: f32) -> f32 {
        self.to_ms(beat_ms) * 0.001 * sample_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_beats() {
        assert_eq!(NoteDivision::Quarter.beats(), 1.0);
        assert_eq!(NoteDivision::Eighth.beats(), 0.5);
        assert!((NoteDivision::TripletEighth.beats() * 3.0 - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_to_samples() {
        let samples = NoteDivision::Eighth.to_samples(500.0, 48000.0);
        assert!((samples - 12000.0).abs() < 1e-2);
    }
}
