// Scripted capture platform shared by the integration tests
//
// Tests push fragments through a `FakePlatform` while the recorder owns the
// stream; the platform counts acquisitions, releases and pipe lifecycle so
// resource symmetry can be asserted.

#![allow(dead_code)]

use bytes::Bytes;
use screen_recorder::capture::{
    CaptureBackend, CaptureConstraints, CaptureError, CaptureStream, Fragment, TrackInfo, TrackKind,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Default)]
struct FakeState {
    deny: bool,
    prompt_delay: Option<Duration>,
    prompts: usize,
    acquisitions: usize,
    releases: usize,
    active_tracks: usize,
    pipes_started: usize,
    pipes_stopped: usize,
    final_fragment: Option<Bytes>,
    sender: Option<mpsc::Sender<Fragment>>,
}

#[derive(Clone, Default)]
pub struct FakePlatform {
    state: Arc<Mutex<FakeState>>,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// A platform whose permission prompt is always refused
    pub fn denying() -> Self {
        let platform = Self::default();
        platform.set_deny(true);
        platform
    }

    /// Fragment emitted when the pipe is stopped (buffered encoder data)
    pub fn with_final_fragment(self, fragment: &'static [u8]) -> Self {
        self.state.lock().unwrap().final_fragment = Some(Bytes::from_static(fragment));
        self
    }

    /// Keep the permission prompt open for `delay` before answering
    pub fn with_prompt_delay(self, delay: Duration) -> Self {
        self.state.lock().unwrap().prompt_delay = Some(delay);
        self
    }

    pub fn set_deny(&self, deny: bool) {
        self.state.lock().unwrap().deny = deny;
    }

    pub fn backend(&self) -> Box<dyn CaptureBackend> {
        Box::new(FakeBackend {
            platform: self.clone(),
        })
    }

    /// Deliver a fragment on the open pipe; false if no pipe is open
    pub async fn push(&self, fragment: Vec<u8>) -> bool {
        let sender = self.state.lock().unwrap().sender.clone();
        match sender {
            Some(sender) => sender.send(Bytes::from(fragment)).await.is_ok(),
            None => false,
        }
    }

    /// The user ended the share from outside the app
    pub fn end_share(&self) {
        self.state.lock().unwrap().sender = None;
    }

    /// Permission prompts shown, answered or not
    pub fn prompts(&self) -> usize {
        self.state.lock().unwrap().prompts
    }

    pub fn acquisitions(&self) -> usize {
        self.state.lock().unwrap().acquisitions
    }

    pub fn releases(&self) -> usize {
        self.state.lock().unwrap().releases
    }

    pub fn active_tracks(&self) -> usize {
        self.state.lock().unwrap().active_tracks
    }

    pub fn pipes_started(&self) -> usize {
        self.state.lock().unwrap().pipes_started
    }

    pub fn pipes_stopped(&self) -> usize {
        self.state.lock().unwrap().pipes_stopped
    }
}

struct FakeBackend {
    platform: FakePlatform,
}

#[async_trait::async_trait]
impl CaptureBackend for FakeBackend {
    async fn acquire(
        &mut self,
        _constraints: CaptureConstraints,
    ) -> Result<Box<dyn CaptureStream>, CaptureError> {
        let delay = {
            let mut state = self.platform.state.lock().unwrap();
            state.prompts += 1;
            state.prompt_delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.platform.state.lock().unwrap();
        if state.deny {
            return Err(CaptureError::Denied("permission denied".to_string()));
        }

        state.acquisitions += 1;
        state.active_tracks += 2;

        Ok(Box::new(FakeStream {
            platform: self.platform.clone(),
            released: false,
        }))
    }

    fn name(&self) -> &str {
        "fake"
    }
}

struct FakeStream {
    platform: FakePlatform,
    released: bool,
}

impl CaptureStream for FakeStream {
    fn tracks(&self) -> Vec<TrackInfo> {
        vec![
            TrackInfo {
                kind: TrackKind::Video,
                label: "fake screen".to_string(),
                active: !self.released,
            },
            TrackInfo {
                kind: TrackKind::Audio,
                label: "fake audio".to_string(),
                active: !self.released,
            },
        ]
    }

    fn start_pipe(&mut self) -> mpsc::Receiver<Fragment> {
        let (tx, rx) = mpsc::channel(1024);
        let mut state = self.platform.state.lock().unwrap();
        state.sender = Some(tx);
        state.pipes_started += 1;
        rx
    }

    fn stop_pipe(&mut self) {
        let mut state = self.platform.state.lock().unwrap();
        state.pipes_stopped += 1;
        if let Some(sender) = state.sender.take() {
            if let Some(fragment) = state.final_fragment.clone() {
                let _ = sender.try_send(fragment);
            }
        }
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        let mut state = self.platform.state.lock().unwrap();
        state.releases += 1;
        state.active_tracks -= 2;
    }
}
