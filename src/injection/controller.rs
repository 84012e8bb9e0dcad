use std::fmt;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use log::{debug, error, info, warn};
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::{INJECT_ID, MIN_POLL_INTERVAL_MS};
use crate::data::InjectionPayload;
use crate::host::{HostContext, HostError};
use crate::jukebox::JukeBoxClient;
use crate::prompt::build_params;
use crate::settings::{Settings, SettingsStore};

/// Where the last refresh cycle left the injection slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectionState {
    /// Slot cleared
    Idle,
    /// A cycle is waiting on the JukeBox plugin
    Refreshing,
    /// Slot holds the text for the most recent track
    Injected,
}

impl fmt::Display for InjectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InjectionState::Idle => write!(f, "idle"),
            InjectionState::Refreshing => write!(f, "refreshing"),
            InjectionState::Injected => write!(f, "injected"),
        }
    }
}

/// Failures inside a refresh cycle; logged, never returned to the caller
#[derive(Debug, Error)]
pub enum InjectionError {
    #[error(transparent)]
    Host(#[from] HostError),
}

struct ControllerInner {
    client: JukeBoxClient,
    host: Arc<dyn HostContext>,
    settings: SettingsStore,
    state: Mutex<InjectionState>,
    timer: Mutex<Option<JoinHandle<()>>>,
}

/// Runs the clear -> probe -> fetch -> format -> inject cycle and owns the poll timer.
///
/// Cycles may overlap: a manual refresh can run while a timer cycle waits
/// on the network. Each cycle clears and then possibly sets the slot on its
/// own, so the last cycle to finish wins even if it started first.
/// Stopping the timer never cancels a cycle that is already running.
#[derive(Clone)]
pub struct InjectionController {
    inner: Arc<ControllerInner>,
}

impl InjectionController {
    pub fn new(client: JukeBoxClient, host: Arc<dyn HostContext>, settings: SettingsStore) -> Self {
        Self {
            inner: Arc::new(ControllerInner {
                client,
                host,
                settings,
                state: Mutex::new(InjectionState::Idle),
                timer: Mutex::new(None),
            }),
        }
    }

    /// State reached by the most recent cycle step
    pub fn state(&self) -> InjectionState {
        match self.inner.state.lock() {
            Ok(state) => *state,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn set_state(&self, state: InjectionState) {
        if let Ok(mut current) = self.inner.state.lock() {
            *current = state;
        }
    }

    /// Clear the injection slot so no stale track lingers
    pub fn reset_inject(&self) {
        if let Err(e) = self
            .inner
            .host
            .set_extension_prompt(InjectionPayload::cleared(INJECT_ID))
        {
            error!("Failed to clear extension prompt: {}", e);
        }
        self.set_state(InjectionState::Idle);
    }

    /// Run one refresh cycle. Safe to call at any time, also while the timer runs.
    pub async fn set_current_track(&self) -> InjectionState {
        self.reset_inject();

        let settings = self.inner.settings.snapshot();
        if !settings.injection_enabled() {
            debug!("Injection disabled or template empty, nothing to inject");
            return InjectionState::Idle;
        }

        self.set_state(InjectionState::Refreshing);
        match self.refresh(&settings).await {
            Ok(state) => {
                self.set_state(state);
                state
            }
            Err(e) => {
                error!("Error setting current track: {}", e);
                self.set_state(InjectionState::Idle);
                InjectionState::Idle
            }
        }
    }

    async fn refresh(&self, settings: &Settings) -> Result<InjectionState, InjectionError> {
        let client = &self.inner.client;

        if !client.is_available().await {
            info!("JukeBox plugin not connected or available");
            return Ok(InjectionState::Idle);
        }

        let track = match client.fetch_current_track().await {
            Some(track) => track,
            None => {
                info!("No track currently playing on Roon");
                return Ok(InjectionState::Idle);
            }
        };
        debug!("Currently playing Roon track: {}", track);

        let lyrics = if settings.include_lyrics {
            let lyrics = client.fetch_current_lyrics().await.and_then(|r| r.lyrics);
            match &lyrics {
                Some(lyrics) if !lyrics.has_text() => debug!("Lyrics record has no text"),
                Some(_) => debug!("Fetched lyrics"),
                None => debug!("No lyrics available"),
            }
            lyrics
        } else {
            None
        };

        let params = build_params(&track, lyrics.as_ref());
        let message = self
            .inner
            .host
            .substitute_params_extended(&settings.template, &params)?;

        self.inner.host.set_extension_prompt(InjectionPayload {
            key: INJECT_ID.to_string(),
            text: message,
            position: settings.position,
            depth: settings.depth,
            scan: settings.scan,
            role: settings.role,
        })?;

        Ok(InjectionState::Injected)
    }

    /// (Re)start the poll timer.
    ///
    /// Does nothing if injection is disabled or the plugin is not reachable.
    /// Otherwise the timer starts and one cycle runs right away. Returns
    /// whether the timer is running.
    pub async fn start_polling(&self) -> bool {
        self.stop_timer();

        let settings = self.inner.settings.snapshot();
        if !settings.position.is_enabled() {
            debug!("Injection disabled, not polling");
            return false;
        }

        if !self.inner.client.is_available().await {
            info!("JukeBox plugin not available, skipping polling setup");
            return false;
        }

        let mut interval_ms = settings.poll_interval;
        if interval_ms < MIN_POLL_INTERVAL_MS {
            warn!(
                "Poll interval {}ms is too short, using {}ms",
                interval_ms, MIN_POLL_INTERVAL_MS
            );
            interval_ms = MIN_POLL_INTERVAL_MS;
        }
        info!("Starting JukeBox polling every {}ms", interval_ms);

        let weak = Arc::downgrade(&self.inner);
        let timer = tokio::spawn(poll_loop(weak, Duration::from_millis(interval_ms)));

        // Another start may have raced us while we were probing
        self.stop_timer();
        if let Ok(mut slot) = self.inner.timer.lock() {
            *slot = Some(timer);
        }

        self.set_current_track().await;
        true
    }

    /// Stop the poll timer; cycles already running finish on their own
    pub fn stop_polling(&self) {
        if self.stop_timer() {
            info!("Stopped JukeBox polling");
        }
    }

    fn stop_timer(&self) -> bool {
        let timer = match self.inner.timer.lock() {
            Ok(mut slot) => slot.take(),
            Err(_) => None,
        };
        match timer {
            Some(timer) => {
                timer.abort();
                true
            }
            None => false,
        }
    }

    /// Check if the poll timer is running
    pub fn is_polling(&self) -> bool {
        match self.inner.timer.lock() {
            Ok(slot) => slot.as_ref().map_or(false, |timer| !timer.is_finished()),
            Err(_) => false,
        }
    }
}

/// Fire a detached cycle on every tick until the timer is aborted or the controller dropped
async fn poll_loop(controller: Weak<ControllerInner>, period: Duration) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; the caller runs that cycle itself
    interval.tick().await;

    loop {
        interval.tick().await;
        let inner = match controller.upgrade() {
            Some(inner) => inner,
            None => break,
        };
        let controller = InjectionController { inner };
        tokio::spawn(async move {
            controller.set_current_track().await;
        });
    }
    debug!("Poll loop exiting");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::InjectionPosition;
    use crate::jukebox::JukeBoxEndpoints;
    use crate::testing::{RecordingHost, Reply, ScriptedHttpClient};
    use serde_json::json;

    struct Fixture {
        http: ScriptedHttpClient,
        host: Arc<RecordingHost>,
        controller: InjectionController,
        settings: SettingsStore,
    }

    fn fixture() -> Fixture {
        let http = ScriptedHttpClient::new();
        let host = Arc::new(RecordingHost::new());
        let settings = SettingsStore::load(host.clone()).unwrap();
        settings
            .update(|s| s.template = "{{song}} by {{artist}} ({{zone}})".to_string())
            .unwrap();
        let client = JukeBoxClient::new(
            Box::new(http.clone()),
            JukeBoxEndpoints::new("http://localhost:8000").unwrap(),
        );
        let controller = InjectionController::new(client, host.clone(), settings.clone());
        Fixture { http, host, controller, settings }
    }

    fn connected(http: &ScriptedHttpClient) {
        http.reply("/probe", Reply::Json(json!({ "status": "connected", "hasTrack": true })));
    }

    fn playing(http: &ScriptedHttpClient) {
        http.reply(
            "/current-track",
            Reply::Json(json!({
                "success": true,
                "connected": true,
                "track": {
                    "song": "Nightswim", "artist": "ODESZA", "album": "In Return",
                    "zoneName": "Office", "playbackStatus": "playing"
                }
            })),
        );
    }

    #[tokio::test]
    async fn test_cycle_injects_formatted_track() {
        let f = fixture();
        connected(&f.http);
        playing(&f.http);

        assert_eq!(f.controller.set_current_track().await, InjectionState::Injected);
        assert_eq!(f.controller.state(), InjectionState::Injected);

        let payload = f.host.prompt(INJECT_ID).unwrap();
        assert_eq!(payload.text, "Nightswim by ODESZA (Office)");
        assert_eq!(payload.position, InjectionPosition::InChat);
        assert_eq!(payload.depth, 1);
        assert!(payload.scan);
        // Lyrics are off by default
        assert_eq!(f.http.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_disabled_position_makes_no_request() {
        let f = fixture();
        connected(&f.http);
        playing(&f.http);
        f.settings.update(|s| s.position = InjectionPosition::None).unwrap();

        assert_eq!(f.controller.set_current_track().await, InjectionState::Idle);
        assert!(f.http.calls().is_empty());
        assert!(f.host.prompt(INJECT_ID).unwrap().is_cleared());
    }

    #[tokio::test]
    async fn test_empty_template_makes_no_request() {
        let f = fixture();
        f.settings.update(|s| s.template.clear()).unwrap();

        assert_eq!(f.controller.set_current_track().await, InjectionState::Idle);
        assert!(f.http.calls().is_empty());
    }

    #[tokio::test]
    async fn test_not_connected_stops_after_probe() {
        let f = fixture();
        f.http.reply("/probe", Reply::Json(json!({ "status": "disconnected", "hasTrack": false })));
        playing(&f.http);

        assert_eq!(f.controller.set_current_track().await, InjectionState::Idle);
        assert_eq!(f.http.calls(), vec!["GET /api/plugins/roon-lyrics/probe"]);
        assert!(f.host.prompt(INJECT_ID).unwrap().is_cleared());
    }

    #[tokio::test]
    async fn test_no_track_skips_lyrics() {
        let f = fixture();
        f.settings.update(|s| s.include_lyrics = true).unwrap();
        connected(&f.http);
        f.http.reply("/current-track", Reply::Json(json!({ "success": false, "connected": true })));
        f.http.reply(
            "/current-lyrics",
            Reply::Json(json!({ "success": true, "lyrics": { "id": 1, "instrumental": false } })),
        );

        assert_eq!(f.controller.set_current_track().await, InjectionState::Idle);
        assert!(!f.http.calls().iter().any(|c| c.ends_with("/current-lyrics")));
        assert!(f.host.prompt(INJECT_ID).unwrap().is_cleared());
    }

    #[tokio::test]
    async fn test_lyrics_are_best_effort() {
        let f = fixture();
        f.settings
            .update(|s| {
                s.include_lyrics = true;
                s.template = "{{song}}|{{instrumental}}|{{lyrics}}".to_string();
            })
            .unwrap();
        connected(&f.http);
        playing(&f.http);
        f.http.reply("/current-lyrics", Reply::Status(500));

        assert_eq!(f.controller.set_current_track().await, InjectionState::Injected);
        // Without lyrics the lyrics placeholders are left to the host
        assert_eq!(
            f.host.prompt(INJECT_ID).unwrap().text,
            "Nightswim|{{instrumental}}|{{lyrics}}"
        );

        f.http.reply(
            "/current-lyrics",
            Reply::Json(json!({
                "success": true,
                "lyrics": { "id": 1, "instrumental": false, "plainLyrics": "Swim" }
            })),
        );
        f.controller.set_current_track().await;
        assert_eq!(f.host.prompt(INJECT_ID).unwrap().text, "Nightswim|false|Swim");
    }

    #[tokio::test]
    async fn test_host_failure_ends_idle() {
        let f = fixture();
        connected(&f.http);
        playing(&f.http);
        f.host.fail_substitution(true);

        assert_eq!(f.controller.set_current_track().await, InjectionState::Idle);
        assert!(f.host.prompt(INJECT_ID).unwrap().is_cleared());
    }

    #[tokio::test]
    async fn test_every_cycle_clears_first() {
        let f = fixture();
        connected(&f.http);
        playing(&f.http);
        f.controller.set_current_track().await;

        f.http.reply("/probe", Reply::Unreachable);
        f.controller.set_current_track().await;

        let history = f.host.prompt_history();
        assert_eq!(history.len(), 3);
        assert!(history[0].is_cleared());
        assert!(!history[1].is_cleared());
        assert!(history[2].is_cleared());
    }

    #[tokio::test(start_paused = true)]
    async fn test_polling_runs_cycles_on_interval() {
        let f = fixture();
        connected(&f.http);
        playing(&f.http);
        f.settings.update(|s| s.poll_interval = 1000).unwrap();

        assert!(f.controller.start_polling().await);
        assert!(f.controller.is_polling());
        // probe for the availability check + immediate cycle (probe, track)
        assert_eq!(f.http.calls().len(), 3);

        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(f.http.calls().len(), 7);

        f.controller.stop_polling();
        assert!(!f.controller.is_polling());
        tokio::time::sleep(Duration::from_millis(5000)).await;
        assert_eq!(f.http.calls().len(), 7);
    }

    #[tokio::test]
    async fn test_polling_not_started_when_unavailable() {
        let f = fixture();
        f.http.reply("/probe", Reply::Unreachable);

        assert!(!f.controller.start_polling().await);
        assert!(!f.controller.is_polling());
        assert_eq!(f.http.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_polling_not_started_when_disabled() {
        let f = fixture();
        connected(&f.http);
        f.settings.update(|s| s.position = InjectionPosition::None).unwrap();

        assert!(!f.controller.start_polling().await);
        assert!(f.http.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_replaces_timer() {
        let f = fixture();
        connected(&f.http);
        playing(&f.http);
        f.settings.update(|s| s.poll_interval = 1000).unwrap();
        f.controller.start_polling().await;

        f.settings.update(|s| s.poll_interval = 10_000).unwrap();
        assert!(f.controller.start_polling().await);
        let after_restart = f.http.calls().len();

        tokio::time::sleep(Duration::from_millis(5000)).await;
        assert_eq!(f.http.calls().len(), after_restart);

        tokio::time::sleep(Duration::from_millis(5500)).await;
        assert_eq!(f.http.calls().len(), after_restart + 2);
        f.controller.stop_polling();
    }

    fn track_named(song: &str) -> serde_json::Value {
        json!({
            "success": true,
            "track": { "song": song, "artist": "ODESZA", "zoneName": "Office" }
        })
    }

    fn injected_texts(host: &RecordingHost) -> Vec<String> {
        host.prompt_history()
            .into_iter()
            .filter(|p| !p.is_cleared())
            .map(|p| p.text)
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_timer_cycle_overwrites_later_manual_cycle() {
        let f = fixture();
        connected(&f.http);
        playing(&f.http);
        f.settings.update(|s| s.poll_interval = 1000).unwrap();
        assert!(f.controller.start_polling().await);

        // The tick at 1000ms gets a reply only at 4000ms
        f.http.reply(
            "/current-track",
            Reply::Delayed(Duration::from_millis(3000), Box::new(Reply::Json(track_named("Slow Song")))),
        );
        tokio::time::sleep(Duration::from_millis(1500)).await;

        f.http.reply("/current-track", Reply::Json(track_named("Fast Song")));
        assert_eq!(f.controller.set_current_track().await, InjectionState::Injected);
        f.controller.stop_polling();
        assert_eq!(f.host.prompt(INJECT_ID).unwrap().text, "Fast Song by ODESZA (Office)");

        tokio::time::sleep(Duration::from_millis(3000)).await;
        assert_eq!(f.host.prompt(INJECT_ID).unwrap().text, "Slow Song by ODESZA (Office)");
        assert_eq!(
            injected_texts(&f.host),
            vec![
                "Nightswim by ODESZA (Office)".to_string(),
                "Fast Song by ODESZA (Office)".to_string(),
                "Slow Song by ODESZA (Office)".to_string(),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_polling_lets_running_cycle_finish() {
        let f = fixture();
        connected(&f.http);
        playing(&f.http);
        f.settings.update(|s| s.poll_interval = 1000).unwrap();
        assert!(f.controller.start_polling().await);

        f.http.reply(
            "/current-track",
            Reply::Delayed(Duration::from_millis(2000), Box::new(Reply::Json(track_named("Late Song")))),
        );
        tokio::time::sleep(Duration::from_millis(1500)).await;

        // The tick at 1000ms cleared the slot and is waiting for the track
        assert!(f.host.prompt(INJECT_ID).unwrap().is_cleared());
        assert_eq!(f.controller.state(), InjectionState::Refreshing);
        f.controller.stop_polling();
        assert!(!f.controller.is_polling());
        let calls = f.http.calls().len();

        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert_eq!(f.host.prompt(INJECT_ID).unwrap().text, "Late Song by ODESZA (Office)");
        assert_eq!(f.controller.state(), InjectionState::Injected);
        assert_eq!(f.http.calls().len(), calls);
    }
}
