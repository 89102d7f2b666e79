//! Audio cues and the injected playback collaborator
//!
//! The simulation never touches an audio backend directly; rooms drive
//! whatever [`AudioSink`] the host passes in. That keeps frames deterministic
//! and tests silent.

/// Cue identifiers the simulation can trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// Loops while an enemy is grinding down the player's shield
    ShieldDrain,
    /// Loops while a cleared room sits idle
    EmptyRoom,
    /// One-shot explosion burst
    Explosion,
    /// One-shot pickup chime
    Pickup,
}

/// Playback collaborator; `loops` of -1 repeats until stopped
pub trait AudioSink {
    fn play(&mut self, cue: Cue, loops: i32);
    fn stop(&mut self, cue: Cue);
    fn is_playing(&self, cue: Cue) -> bool;
}

/// Sink that swallows every cue (headless runs, tests)
#[derive(Debug, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _cue: Cue, _loops: i32) {}

    fn stop(&mut self, _cue: Cue) {}

    fn is_playing(&self, _cue: Cue) -> bool {
        false
    }
}
