use std::time::Duration;

use crate::audio::Channel;
use crate::library::MAX_TRACKS;

/// One backing slot per rhythm track: slot `i` follows rhythm track `i`.
pub const BACKING_SLOTS: usize = MAX_TRACKS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlotState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

pub struct BackingSlot<C: Channel> {
    name: Option<String>,
    sound: Option<C::Sound>,
    channel: C,
    volume: f32,
    state: SlotState,
}

/// The fixed set of looping backing channels.
///
/// Volumes belong to the UI binding and apply at once whatever the transport
/// state; transport calls only ever target the slot of the current rhythm.
pub struct BackingChannels<C: Channel> {
    slots: [BackingSlot<C>; BACKING_SLOTS],
}

impl<C: Channel> BackingChannels<C> {
    pub fn new(channels: [C; BACKING_SLOTS], default_volume: f32) -> Self {
        let volume = default_volume.clamp(0.0, 1.0);
        let slots = channels.map(|mut channel| {
            channel.set_volume(volume);
            BackingSlot {
                name: None,
                sound: None,
                channel,
                volume,
                state: SlotState::Stopped,
            }
        });
        Self { slots }
    }

    /// Attach a loaded sound to `slot`. Out-of-range slots are ignored.
    pub fn load(&mut self, slot: usize, name: String, sound: C::Sound) {
        if let Some(s) = self.slots.get_mut(slot) {
            s.name = Some(name);
            s.sound = Some(sound);
        }
    }

    pub fn play_looped(&mut self, slot: usize, fade: Duration) {
        let Some(s) = self.slots.get_mut(slot) else {
            return;
        };
        let Some(sound) = s.sound.as_ref() else {
            return;
        };
        s.channel.play_looped(sound, fade);
        // A reused channel may come back at its default volume.
        s.channel.set_volume(s.volume);
        s.state = SlotState::Playing;
    }

    pub fn pause(&mut self, slot: usize) {
        if let Some(s) = self.slots.get_mut(slot) {
            if s.state == SlotState::Playing {
                s.channel.pause();
                s.state = SlotState::Paused;
            }
        }
    }

    /// Resume a paused loop. A slot that never started (e.g. after seeking
    /// while idle) starts its loop instead.
    pub fn resume(&mut self, slot: usize) {
        let state = match self.slots.get(slot) {
            Some(s) => s.state,
            None => return,
        };
        match state {
            SlotState::Paused => {
                let s = &mut self.slots[slot];
                s.channel.resume();
                s.state = SlotState::Playing;
            }
            SlotState::Stopped => self.play_looped(slot, Duration::ZERO),
            SlotState::Playing => {}
        }
    }

    pub fn fade_out(&mut self, slot: usize, fade: Duration) {
        if let Some(s) = self.slots.get_mut(slot) {
            s.channel.fade_out(fade);
            s.state = SlotState::Stopped;
        }
    }

    pub fn fade_out_all(&mut self, fade: Duration) {
        for slot in 0..BACKING_SLOTS {
            self.fade_out(slot, fade);
        }
    }

    pub fn set_volume(&mut self, slot: usize, volume: f32) {
        if let Some(s) = self.slots.get_mut(slot) {
            s.volume = volume.clamp(0.0, 1.0);
            s.channel.set_volume(s.volume);
        }
    }

    pub fn volume(&self, slot: usize) -> f32 {
        self.slots.get(slot).map_or(0.0, |s| s.volume)
    }

    pub fn name(&self, slot: usize) -> Option<&str> {
        self.slots.get(slot).and_then(|s| s.name.as_deref())
    }

    #[cfg(test)]
    pub(crate) fn state(&self, slot: usize) -> SlotState {
        self.slots.get(slot).map_or(SlotState::Stopped, |s| s.state)
    }

    pub fn is_loaded(&self, slot: usize) -> bool {
        self.slots.get(slot).is_some_and(|s| s.sound.is_some())
    }
}
