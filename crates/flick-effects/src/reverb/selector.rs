use super::{HallReverb, PlateReverb, ReverbEngine, ReverbParams, ReverbType, SpringReverb};

/// Owns all three engines and forwards to the selected one.
///
/// Engines not selected receive no input and keep whatever tail they had;
/// [`ReverbEngine::clear`] flushes all three.
#[derive(Debug, Clone)]
pub struct ReverbSelector {
    plate: PlateReverb,
    spring: SpringReverb,
    hall: HallReverb,
    active: ReverbType,
}

impl ReverbSelector {
    /// Builds every engine for `sample_rate`.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            plate: PlateReverb::new(sample_rate),
            spring: SpringReverb::new(sample_rate),
            hall: HallReverb::new(sample_rate),
            active: ReverbType::Plate,
        }
    }

    /// Switches to `reverb_type`.
    pub fn select(&mut self, reverb_type: ReverbType) {
        self.active = reverb_type;
    }

    /// Currently selected engine.
    pub fn active(&self) -> ReverbType {
        self.active
    }

    fn engine(&mut self) -> &mut dyn ReverbEngine {
        match self.active {
            ReverbType::Plate => &mut self.plate,
            ReverbType::Spring => &mut self.spring,
            ReverbType::Hall => &mut self.hall,
        }
    }
}

impl ReverbEngine for ReverbSelector {
    fn configure(&mut self, params: &ReverbParams) {
        self.engine().configure(params);
    }

    #[inline]
    fn process(&mut self, left: f32, right: f32) -> (f32, f32) {
        self.engine().process(left, right)
    }

    fn clear(&mut self) {
        self.plate.clear();
        self.spring.clear();
        self.hall.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_twice_matches_clear_once() {
        for kind in [ReverbType::Plate, ReverbType::Spring, ReverbType::Hall] {
            let mut once = ReverbSelector::new(48000.0);
            let mut twice = ReverbSelector::new(48000.0);
            for sel in [&mut once, &mut twice] {
                sel.select(kind);
                sel.configure(&ReverbParams::default());
                for i in 0..4000 {
                    let x = if i % 300 == 0 { 0.5 } else { 0.0 };
                    sel.process(x, -x);
                }
            }
            once.clear();
            twice.clear();
            twice.clear();
            for _ in 0..256 {
                let a = once.process(0.0, 0.0);
                let b = twice.process(0.0, 0.0);
                assert_eq!(a, b, "{kind:?}");
                assert_eq!(a, (0.0, 0.0), "{kind:?} should be silent after clear");
            }
        }
    }

    #[test]
    fn select_switches_engine() {
        let mut sel = ReverbSelector::new(48000.0);
        sel.select(ReverbType::Hall);
        assert_eq!(sel.active(), ReverbType::Hall);
    }
}
