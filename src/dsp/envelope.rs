/*
ADSR Envelope Implementation
============================

This module implements a dual-rate ADSR envelope: the state machine runs at
control rate, the amplitude ramp runs at audio rate.

Vocabulary
----------

  level         Amplitude target of a stage, 0..=255. The output multiplies an
                8-bit signal and is shifted back down by 8.

  stage         Which phase of the envelope we're in: Idle, Attack, Decay,
                Sustain or Release.

  update steps  Length of a stage in control ticks. Only `update()` counts
                these; it is the sole clock of the state machine.

  lerp steps    Length of the same stage in audio samples,
                update_steps * (audio_rate / control_rate). The ramp is sized
                so it arrives at the stage level exactly when the state
                machine moves on.

  ramp          A Q15.16 line from wherever the output currently is to the
                stage level. `next()` advances it one audio sample.


Milliseconds to Steps
---------------------

    steps = (ms * control_rate) >> 10

Shifting by 10 instead of dividing by 1000 is ~2.3% short. At 128 Hz:
  attack   50 ms →    6 steps →   768 samples
  decay   200 ms →   25 steps →  3200 samples
  sustain 10 s   → 1250 steps → 160000 samples


The State Machine
-----------------

    ┌──────┐ note_on ┌────────┐ steps ┌───────┐ steps ┌─────────┐
    │ Idle │ ──────→ │ Attack │ ────→ │ Decay │ ────→ │ Sustain │
    └──────┘         └────────┘       └───────┘       └─────────┘
        ↑                                                │     │
        │ steps      ┌─────────┐      note_off           │     │ steps
        └─────────── │ Release │ ←───────────────────────┘     │ (timeout)
                     └─────────┘ ←─────────────────────────────┘

note_off enters Release from any stage. Sustain also times out into Release
on its own, so a lost note-off can never hold a voice open forever.

note_on restarts Attack from the current ramp value instead of from zero, so
retriggering a sounding note does not click. `note_on_reset` is the hard
restart.


Rate Split
----------

`update()` (control rate) moves the state machine and retargets the ramp.
`next()` (audio rate) only slides along the ramp; it never changes stage. Once
a ramp has covered its lerp steps it holds its target, so an audio callback
that runs long between control ticks cannot push the amplitude past a level.
*/

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The current stage of the envelope state machine.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeState {
    Idle,
    Attack,
    Decay,
    Sustain,
    Release,
}

const LEVEL_SHIFT: u32 = 16;

#[derive(Debug, Clone, Copy, Default)]
struct Stage {
    update_steps: u16,
    lerp_steps: i32,
    level: u8,
}

/// Audio-rate linear segment in Q15.16.
#[derive(Debug, Clone, Copy, Default)]
struct Ramp {
    current: i32,
    step: i32,
    remaining: i32,
}

impl Ramp {
    fn retarget(&mut self, level: u8, steps: i32) {
        let target = (level as i32) << LEVEL_SHIFT;
        if steps > 0 {
            self.step = (target - self.current) / steps;
            self.remaining = steps;
        } else {
            self.current = target;
            self.step = 0;
            self.remaining = 0;
        }
    }

    #[inline]
    fn next(&mut self) -> i32 {
        if self.remaining > 0 {
            self.current = self.current.wrapping_add(self.step);
            self.remaining -= 1;
        }
        self.current
    }
}

pub struct Envelope {
    control_rate: u32,
    lerps_per_control: i32,

    attack: Stage,
    decay: Stage,
    sustain: Stage,
    release: Stage,
    idle: Stage,

    state: EnvelopeState,
    step_counter: u16,
    num_update_steps: u16,
    ramp: Ramp,
    playing: bool,
}

impl Envelope {
    pub fn new(control_rate: u32, audio_rate: u32) -> Self {
        let control_rate = control_rate.max(1);
        Self {
            control_rate,
            lerps_per_control: (audio_rate / control_rate) as i32,
            attack: Stage::default(),
            decay: Stage::default(),
            sustain: Stage::default(),
            release: Stage::default(),
            idle: Stage::default(),
            state: EnvelopeState::Idle,
            step_counter: 0,
            num_update_steps: 0,
            ramp: Ramp::default(),
            playing: false,
        }
    }

    /// Control-rate tick. Call once per control update regardless of state.
    pub fn update(&mut self) {
        let next = match self.state {
            EnvelopeState::Attack => EnvelopeState::Decay,
            EnvelopeState::Decay => EnvelopeState::Sustain,
            EnvelopeState::Sustain => EnvelopeState::Release,
            EnvelopeState::Release => EnvelopeState::Idle,
            EnvelopeState::Idle => {
                self.playing = false;
                return;
            }
        };

        self.step_counter = self.step_counter.saturating_add(1);
        if self.step_counter >= self.num_update_steps {
            self.enter(next);
        }
    }

    /// Audio-rate read of the current amplitude, 0..=255.
    #[inline]
    pub fn next(&mut self) -> u8 {
        if self.playing {
            (self.ramp.next() >> LEVEL_SHIFT) as u8
        } else {
            0
        }
    }

    /// Start the attack from wherever the output currently is.
    pub fn note_on(&mut self) {
        self.enter(EnvelopeState::Attack);
        self.playing = true;
    }

    /// Start the attack from zero.
    pub fn note_on_reset(&mut self) {
        self.ramp.current = 0;
        self.note_on();
    }

    pub fn note_off(&mut self) {
        self.enter(EnvelopeState::Release);
    }

    fn enter(&mut self, state: EnvelopeState) {
        let stage = *self.stage(state);
        self.step_counter = 0;
        self.num_update_steps = stage.update_steps;
        self.ramp.retarget(stage.level, stage.lerp_steps);
        self.state = state;
    }

    fn stage(&self, state: EnvelopeState) -> &Stage {
        match state {
            EnvelopeState::Idle => &self.idle,
            EnvelopeState::Attack => &self.attack,
            EnvelopeState::Decay => &self.decay,
            EnvelopeState::Sustain => &self.sustain,
            EnvelopeState::Release => &self.release,
        }
    }

    fn stage_mut(&mut self, state: EnvelopeState) -> &mut Stage {
        match state {
            EnvelopeState::Idle => &mut self.idle,
            EnvelopeState::Attack => &mut self.attack,
            EnvelopeState::Decay => &mut self.decay,
            EnvelopeState::Sustain => &mut self.sustain,
            EnvelopeState::Release => &mut self.release,
        }
    }

    /// Milliseconds to control steps, `(ms * control_rate) >> 10`.
    pub fn ms_to_update_steps(&self, ms: u16) -> u16 {
        ((ms as u32 * self.control_rate) >> 10) as u16
    }

    /// Set a stage's length in control ticks directly.
    pub fn set_update_steps(&mut self, state: EnvelopeState, steps: u16) {
        let lerps = self.lerps_per_control;
        let stage = self.stage_mut(state);
        stage.update_steps = steps;
        stage.lerp_steps = steps as i32 * lerps;
    }

    /// Takes effect the next time the stage is entered.
    pub fn set_time(&mut self, state: EnvelopeState, ms: u16) {
        let steps = self.ms_to_update_steps(ms);
        self.set_update_steps(state, steps);
    }

    pub fn set_attack_time(&mut self, ms: u16) {
        self.set_time(EnvelopeState::Attack, ms);
    }

    pub fn set_decay_time(&mut self, ms: u16) {
        self.set_time(EnvelopeState::Decay, ms);
    }

    pub fn set_sustain_time(&mut self, ms: u16) {
        self.set_time(EnvelopeState::Sustain, ms);
    }

    pub fn set_release_time(&mut self, ms: u16) {
        self.set_time(EnvelopeState::Release, ms);
    }

    pub fn set_idle_time(&mut self, ms: u16) {
        self.set_time(EnvelopeState::Idle, ms);
    }

    pub fn set_times(&mut self, attack_ms: u16, decay_ms: u16, sustain_ms: u16, release_ms: u16) {
        self.set_attack_time(attack_ms);
        self.set_decay_time(decay_ms);
        self.set_sustain_time(sustain_ms);
        self.set_release_time(release_ms);
    }

    pub fn set_level(&mut self, state: EnvelopeState, level: u8) {
        self.stage_mut(state).level = level;
    }

    pub fn set_attack_level(&mut self, level: u8) {
        self.set_level(EnvelopeState::Attack, level);
    }

    pub fn set_decay_level(&mut self, level: u8) {
        self.set_level(EnvelopeState::Decay, level);
    }

    pub fn set_sustain_level(&mut self, level: u8) {
        self.set_level(EnvelopeState::Sustain, level);
    }

    pub fn set_release_level(&mut self, level: u8) {
        self.set_level(EnvelopeState::Release, level);
    }

    pub fn set_idle_level(&mut self, level: u8) {
        self.set_level(EnvelopeState::Idle, level);
    }

    /// Attack peak and decay floor; sustain holds the decay level, release
    /// goes to 1 and idle to 0.
    pub fn set_ad_levels(&mut self, attack: u8, decay: u8) {
        self.set_attack_level(attack);
        self.set_decay_level(decay);
        self.set_sustain_level(decay);
        self.set_release_level(1);
        self.set_idle_level(0);
    }

    pub fn set_levels(&mut self, attack: u8, decay: u8, sustain: u8, release: u8) {
        self.set_attack_level(attack);
        self.set_decay_level(decay);
        self.set_sustain_level(sustain);
        self.set_release_level(release);
        self.set_idle_level(0);
    }

    /// True from `note_on` until the first `update()` spent in Idle.
    pub fn playing(&self) -> bool {
        self.playing
    }

    pub fn state(&self) -> EnvelopeState {
        self.state
    }

    /// Current amplitude without advancing the ramp.
    pub fn level(&self) -> u8 {
        if self.playing {
            (self.ramp.current >> LEVEL_SHIFT) as u8
        } else {
            0
        }
    }

    pub fn update_steps(&self, state: EnvelopeState) -> u16 {
        self.stage(state).update_steps
    }

    pub fn lerps_per_control(&self) -> i32 {
        self.lerps_per_control
    }
}
