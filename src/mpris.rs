//! MPRIS service so desktop media keys and widgets can drive the session.
//!
//! The D-Bus side runs on its own thread and only ever reads a snapshot of
//! the session (`NowPlaying`) or sends a `ControlCmd` back to the UI thread.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, mpsc::Sender};
use std::time::Duration;

use async_io::{Timer, block_on};
use zbus::{Connection, interface};
use zvariant::{ObjectPath, OwnedValue, Value};

use crate::session::{PlaybackState, ProgressView};

const BUS_NAME: &str = "org.mpris.MediaPlayer2.breathsync";
const OBJECT_PATH: &str = "/org/mpris/MediaPlayer2";
const TRACK_PATH_PREFIX: &str = "/org/breathsync/track";

/// Commands arriving from media keys, handled on the UI thread.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlCmd {
    Quit,
    Play,
    Pause,
    PlayPause,
    Next,
    Prev,
    /// Move the current track by this many microseconds (may be negative).
    SeekBy(i64),
    /// Jump to `position` within rhythm track `index`.
    SetPosition { index: usize, position: Duration },
}

/// What D-Bus clients see of the current rhythm track.
#[derive(Debug, Clone, PartialEq)]
struct NowPlaying {
    index: usize,
    track_count: usize,
    name: String,
    length: Option<Duration>,
    position: Duration,
}

#[derive(Debug, Default)]
struct SharedState {
    playback: PlaybackState,
    now_playing: Option<NowPlaying>,
}

/// Object path identifying rhythm track `index`.
fn track_path(index: usize) -> String {
    format!("{TRACK_PATH_PREFIX}/{index}")
}

fn micros(d: Duration) -> i64 {
    i64::try_from(d.as_micros()).unwrap_or(i64::MAX)
}

fn insert_value(map: &mut HashMap<String, OwnedValue>, key: &str, value: Value<'_>) {
    match OwnedValue::try_from(value) {
        Ok(v) => {
            map.insert(key.to_string(), v);
        }
        Err(e) => log::debug!("MPRIS: cannot encode {key}: {e}"),
    }
}

/// Handle for publishing session state to D-Bus clients.
pub struct MprisHandle {
    state: Arc<Mutex<SharedState>>,
}

impl MprisHandle {
    /// Snapshot the current track, its position and the playback state.
    pub fn publish(&self, view: &ProgressView) {
        let row = view.current();
        let now_playing = NowPlaying {
            index: view.current_index,
            track_count: view.rows.len(),
            name: row.name.clone(),
            length: row.total,
            position: row.total.map_or(row.elapsed, |t| row.elapsed.min(t)),
        };
        if let Ok(mut s) = self.state.lock() {
            s.playback = view.state;
            s.now_playing = Some(now_playing);
        }
    }
}

struct RootIface {
    tx: Sender<ControlCmd>,
}

#[interface(name = "org.mpris.MediaPlayer2")]
impl RootIface {
    fn raise(&self) {
        // No-op for TUI.
    }

    fn quit(&self) {
        let _ = self.tx.send(ControlCmd::Quit);
    }

    #[zbus(property)]
    fn can_quit(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_raise(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn has_track_list(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn identity(&self) -> &str {
        "breathsync"
    }

    #[zbus(property)]
    fn supported_uri_schemes(&self) -> Vec<String> {
        vec![]
    }

    #[zbus(property)]
    fn supported_mime_types(&self) -> Vec<String> {
        vec!["audio/mpeg".to_string()]
    }
}

struct PlayerIface {
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
}

impl PlayerIface {
    fn now_playing(&self) -> Option<NowPlaying> {
        self.state.lock().ok().and_then(|s| s.now_playing.clone())
    }
}

#[interface(name = "org.mpris.MediaPlayer2.Player")]
impl PlayerIface {
    fn next(&self) {
        let _ = self.tx.send(ControlCmd::Next);
    }

    fn previous(&self) {
        let _ = self.tx.send(ControlCmd::Prev);
    }

    fn play(&self) {
        let _ = self.tx.send(ControlCmd::Play);
    }

    fn pause(&self) {
        let _ = self.tx.send(ControlCmd::Pause);
    }

    fn play_pause(&self) {
        let _ = self.tx.send(ControlCmd::PlayPause);
    }

    fn stop(&self) {
        // There is no stopped transport to return to; stop means pause.
        let _ = self.tx.send(ControlCmd::Pause);
    }

    fn seek(&self, offset: i64) {
        if self.can_seek() {
            let _ = self.tx.send(ControlCmd::SeekBy(offset));
        }
    }

    /// Ignored unless `track_id` is the current track and `position` lies
    /// within its known length.
    fn set_position(&self, track_id: ObjectPath<'_>, position: i64) {
        let Some(np) = self.now_playing() else {
            return;
        };
        let Some(length) = np.length else {
            return;
        };
        if track_id.as_str() != track_path(np.index) || position < 0 || position > micros(length) {
            return;
        }
        let _ = self.tx.send(ControlCmd::SetPosition {
            index: np.index,
            position: Duration::from_micros(position.unsigned_abs()),
        });
    }

    #[zbus(property)]
    fn playback_status(&self) -> &str {
        let Ok(s) = self.state.lock() else {
            return "Stopped";
        };
        match s.playback {
            PlaybackState::Stopped => "Stopped",
            PlaybackState::Playing => "Playing",
            PlaybackState::Paused => "Paused",
        }
    }

    /// Elapsed time of the current track in microseconds.
    #[zbus(property)]
    fn position(&self) -> i64 {
        self.now_playing().map_or(0, |np| micros(np.position))
    }

    #[zbus(property)]
    fn can_control(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_play(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_pause(&self) -> bool {
        true
    }

    /// Seeking needs a known length to turn a position into a fraction.
    #[zbus(property)]
    fn can_seek(&self) -> bool {
        self.now_playing().is_some_and(|np| np.length.is_some())
    }

    #[zbus(property)]
    fn can_go_next(&self) -> bool {
        self.now_playing()
            .is_some_and(|np| np.index + 1 < np.track_count)
    }

    #[zbus(property)]
    fn can_go_previous(&self) -> bool {
        self.now_playing().is_some_and(|np| np.index > 0)
    }

    #[zbus(property)]
    fn metadata(&self) -> HashMap<String, OwnedValue> {
        let mut map = HashMap::new();
        let Some(np) = self.now_playing() else {
            return map;
        };

        match ObjectPath::try_from(track_path(np.index)) {
            Ok(path) => insert_value(&mut map, "mpris:trackid", Value::from(path)),
            Err(e) => log::debug!("MPRIS: bad track path: {e}"),
        }
        insert_value(&mut map, "xesam:title", Value::from(np.name));
        if let Some(length) = np.length {
            insert_value(&mut map, "mpris:length", Value::from(micros(length)));
        }
        map
    }
}

/// Serve MPRIS on a background thread. Failures to reach the bus are logged
/// and leave the handle working as a no-op sink.
pub fn spawn_mpris(tx: Sender<ControlCmd>) -> MprisHandle {
    let state = Arc::new(Mutex::new(SharedState::default()));

    let state_for_thread = state.clone();
    std::thread::spawn(move || {
        block_on(async move {
            let connection = match Connection::session().await {
                Ok(c) => c,
                Err(e) => {
                    log::warn!("MPRIS: failed to connect to session bus: {e}");
                    return;
                }
            };

            if let Err(e) = connection.request_name(BUS_NAME).await {
                log::warn!("MPRIS: failed to acquire name: {e}");
                return;
            }

            let object_server = connection.object_server();

            if let Err(e) = object_server.at(OBJECT_PATH, RootIface { tx: tx.clone() }).await {
                log::warn!("MPRIS: failed to register root iface: {e}");
                return;
            }

            let player = PlayerIface {
                tx,
                state: state_for_thread,
            };
            if let Err(e) = object_server.at(OBJECT_PATH, player).await {
                log::warn!("MPRIS: failed to register player iface: {e}");
                return;
            }
            log::info!("MPRIS: registered as {BUS_NAME}");

            // Keep the service alive.
            loop {
                Timer::after(Duration::from_secs(3600)).await;
            }
        });
    });

    MprisHandle { state }
}
