//! Audible feedback using the Web Audio API
//!
//! Sounds are synthesized from oscillators; there are no asset files.

use std::cell::Cell;

use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

/// Minimum spacing between collection blips (seconds)
const COLLECT_SPACING: f64 = 0.04;
/// Master gain applied to every effect
const VOLUME: f32 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Pixels collected
    Collect,
    /// Pixels collected while turbo is running
    TurboCollect,
    /// Turbo bought
    TurboActivate,
    /// Level cleared
    LevelUp,
}

pub struct AudioManager {
    ctx: Option<AudioContext>,
    last_collect: Cell<f64>,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    pub fn new() -> Self {
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            last_collect: Cell::new(f64::NEG_INFINITY),
        }
    }

    /// Resume the context after a user gesture
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    pub fn play(&self, effect: SoundEffect) {
        let Some(ctx) = &self.ctx else { return };

        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        let vol = VOLUME;
        match effect {
            SoundEffect::Collect | SoundEffect::TurboCollect => {
                // Collections can fire every frame; keep the blips apart
                let t = ctx.current_time();
                if t - self.last_collect.get() < COLLECT_SPACING {
                    return;
                }
                self.last_collect.set(t);
                let turbo = effect == SoundEffect::TurboCollect;
                self.play_collect(ctx, vol, turbo);
            }
            SoundEffect::TurboActivate => self.play_turbo(ctx, vol),
            SoundEffect::LevelUp => self.play_level_up(ctx, vol),
        }
    }

    fn create_osc(
        &self,
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// Short rising blip, brighter and buzzier during turbo
    fn play_collect(&self, ctx: &AudioContext, vol: f32, turbo: bool) {
        let (start, end, osc_type, level) = if turbo {
            (900.0, 1600.0, OscillatorType::Square, 0.12)
        } else {
            (600.0, 1100.0, OscillatorType::Sine, 0.15)
        };
        let Some((osc, gain)) = self.create_osc(ctx, start, osc_type) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * level, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.06)
            .ok();
        osc.frequency().set_value_at_time(start, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(end, t + 0.05)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.08).ok();
    }

    /// Turbo - charging sweep under a power chord
    fn play_turbo(&self, ctx: &AudioContext, vol: f32) {
        let t = ctx.current_time();

        if let Some((osc, gain)) = self.create_osc(ctx, 120.0, OscillatorType::Sawtooth) {
            gain.gain().set_value_at_time(vol * 0.3, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.5)
                .ok();
            osc.frequency().set_value_at_time(120.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(960.0, t + 0.4)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.55).ok();
        }

        for freq in [440.0, 660.0, 880.0] {
            if let Some((osc, gain)) = self.create_osc(ctx, freq, OscillatorType::Triangle) {
                let start = t + 0.3;
                gain.gain().set_value_at_time(vol * 0.18, start).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, start + 0.5)
                    .ok();
                osc.start_with_when(start).ok();
                osc.stop_with_when(start + 0.55).ok();
            }
        }
    }

    /// Level up - rising arpeggio
    fn play_level_up(&self, ctx: &AudioContext, vol: f32) {
        for (i, freq) in [523.0, 659.0, 784.0, 1047.0].iter().enumerate() {
            let delay = i as f64 * 0.09;
            if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Triangle) {
                let t = ctx.current_time() + delay;
                gain.gain().set_value_at_time(vol * 0.25, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.35)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.4).ok();
            }
        }
    }
}
