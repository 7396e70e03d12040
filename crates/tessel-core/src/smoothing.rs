//! Per-sample value smoothing used by gain nodes and the smoothed bypass.
//!
//! - [`SmoothedParam`]: one-pole lowpass, for parameters driven by a control.
//! - [`LinearSmoothedParam`]: constant-rate ramp, for crossfades whose
//!   duration and per-sample step must be known up front.
//!
//! Neither type allocates; both are safe to drive from the render thread.

use libm::expf;

/// A value that follows its target through a one-pole lowpass.
#[derive(Debug, Clone)]
pub struct SmoothedParam {
    current: f32,
    target: f32,
    coeff: f32,
    sample_rate: f32,
    smoothing_time_ms: f32,
}

impl SmoothedParam {
    /// Creates a parameter that jumps instantly until a smoothing time and
    /// sample rate are configured.
    pub fn new(initial: f32) -> Self {
        Self {
            current: initial,
            target: initial,
            coeff: 1.0,
            sample_rate: 44100.0,
            smoothing_time_ms: 0.0,
        }
    }

    /// Creates a fully configured parameter.
    pub fn with_config(initial: f32, sample_rate: f32, smoothing_time_ms: f32) -> Self {
        let mut param = Self::new(initial);
        param.sample_rate = sample_rate;
        param.smoothing_time_ms = smoothing_time_ms;
        param.update_coeff();
        param
    }

    /// Sets the value the parameter moves towards.
    #[inline]
    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Sets the target and jumps to it.
    #[inline]
    pub fn set_immediate(&mut self, value: f32) {
        self.target = value;
        self.current = value;
    }

    /// Changes the sample rate the time constant is measured against.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.update_coeff();
    }

    /// Changes the time constant. Zero disables smoothing.
    pub fn set_smoothing_time_ms(&mut self, time_ms: f32) {
        self.smoothing_time_ms = time_ms;
        self.update_coeff();
    }

    /// Returns the next value, advancing one sample.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        self.current += self.coeff * (self.target - self.current);
        self.current
    }

    /// Current value.
    #[inline]
    pub fn get(&self) -> f32 {
        self.current
    }

    /// Target value.
    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    /// True once the value is within `1e-6` of its target.
    #[inline]
    pub fn is_settled(&self) -> bool {
        (self.current - self.target).abs() < 1e-6
    }

    /// Jumps to the target.
    #[inline]
    pub fn snap_to_target(&mut self) {
        self.current = self.target;
    }

    // coeff = 1 - exp(-1 / (tau * fs)), tau in seconds
    fn update_coeff(&mut self) {
        self.coeff = if self.smoothing_time_ms <= 0.0 || self.sample_rate <= 0.0 {
            1.0
        } else {
            let samples = self.smoothing_time_ms / 1000.0 * self.sample_rate;
            1.0 - expf(-1.0 / samples)
        };
    }
}

impl Default for SmoothedParam {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// A value that reaches its target in a fixed number of equal steps.
#[derive(Debug, Clone)]
pub struct LinearSmoothedParam {
    current: f32,
    target: f32,
    increment: f32,
    samples_remaining: u32,
    sample_rate: f32,
    ramp_time_ms: f32,
}

impl LinearSmoothedParam {
    /// Creates a ramp with a 10 ms transition time at 44.1 kHz.
    pub fn new(initial: f32) -> Self {
        Self::with_config(initial, 44100.0, 10.0)
    }

    /// Creates a fully configured ramp.
    pub fn with_config(initial: f32, sample_rate: f32, ramp_time_ms: f32) -> Self {
        Self {
            current: initial,
            target: initial,
            increment: 0.0,
            samples_remaining: 0,
            sample_rate,
            ramp_time_ms,
        }
    }

    /// Starts a ramp from the current value towards `target`.
    pub fn set_target(&mut self, target: f32) {
        if (target - self.target).abs() < 1e-9 {
            return;
        }
        self.target = target;

        let samples = self.ramp_samples();
        if samples == 0 {
            self.snap_to_target();
        } else {
            self.increment = (target - self.current) / samples as f32;
            self.samples_remaining = samples;
        }
    }

    /// Sets the target and jumps to it.
    pub fn set_immediate(&mut self, value: f32) {
        self.target = value;
        self.snap_to_target();
    }

    /// Changes the sample rate. Takes effect with the next target change.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
    }

    /// Changes the ramp time. Takes effect with the next target change.
    pub fn set_ramp_time_ms(&mut self, time_ms: f32) {
        self.ramp_time_ms = time_ms;
    }

    /// Ramp length in samples at the configured rate and time.
    pub fn ramp_samples(&self) -> u32 {
        (self.ramp_time_ms / 1000.0 * self.sample_rate).max(0.0) as u32
    }

    /// Returns the next value, advancing one sample.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        if self.samples_remaining > 0 {
            self.current += self.increment;
            self.samples_remaining -= 1;
            if self.samples_remaining == 0 {
                self.current = self.target;
            }
        }
        self.current
    }

    /// Current value.
    #[inline]
    pub fn get(&self) -> f32 {
        self.current
    }

    /// Target value.
    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Absolute change per sample of the ramp in flight.
    #[inline]
    pub fn step(&self) -> f32 {
        self.increment.abs()
    }

    /// True when no ramp is in flight.
    #[inline]
    pub fn is_settled(&self) -> bool {
        self.samples_remaining == 0
    }

    /// Ends the ramp at its target.
    pub fn snap_to_target(&mut self) {
        self.current = self.target;
        self.increment = 0.0;
        self.samples_remaining = 0;
    }
}

impl Default for LinearSmoothedParam {
    fn default() -> Self {
        Self::new(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconfigured_param_is_instant() {
        let mut param = SmoothedParam::new(1.0);
        param.set_target(0.5);
        assert_eq!(param.advance(), 0.5);
    }

    #[test]
    fn one_pole_converges() {
        let mut param = SmoothedParam::with_config(0.0, 48000.0, 10.0);
        param.set_target(1.0);
        for _ in 0..2400 {
            param.advance();
        }
        assert!((param.get() - 1.0).abs() < 0.01, "got {}", param.get());
    }

    #[test]
    fn linear_ramp_hits_target_on_time() {
        let mut ramp = LinearSmoothedParam::with_config(0.0, 48000.0, 10.0);
        ramp.set_target(1.0);
        assert_eq!(ramp.ramp_samples(), 480);
        assert!((ramp.step() - 1.0 / 480.0).abs() < 1e-9);

        for _ in 0..240 {
            ramp.advance();
        }
        assert!((ramp.get() - 0.5).abs() < 0.01, "halfway, got {}", ramp.get());

        for _ in 0..240 {
            ramp.advance();
        }
        assert_eq!(ramp.get(), 1.0);
        assert!(ramp.is_settled());
    }

    #[test]
    fn zero_ramp_time_jumps() {
        let mut ramp = LinearSmoothedParam::with_config(1.0, 48000.0, 0.0);
        ramp.set_target(0.0);
        assert!(ramp.is_settled());
        assert_eq!(ramp.get(), 0.0);
    }
}
