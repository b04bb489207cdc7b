use std::collections::HashSet;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

use eframe::egui::{self, Context};
use tracing::{info, warn};

use crate::config::Config;
use crate::engine::Engine;
use crate::engine::interaction::ZoomLimits;
use crate::engine::physics::ForceParams;
use crate::topology::{DataSource, StatusQuery, Topology, load_topology};

mod graph;
mod reload;
mod render_utils;
mod ui;

use reload::{ReloadTracker, RequestId};

const AGE_TICK: Duration = Duration::from_secs(1);
const LOAD_POLL: Duration = Duration::from_millis(100);

type LoadMessage = (RequestId, Result<Topology, String>);

pub struct TopologyApp {
    source: DataSource,
    timeout: Duration,
    refresh_interval: Option<Duration>,
    query: StatusQuery,
    force_params: ForceParams,
    zoom_limits: ZoomLimits,
    tracker: ReloadTracker,
    tx: Sender<LoadMessage>,
    rx: Receiver<LoadMessage>,
    last_request: Instant,
    state: AppState,
}

enum AppState {
    Loading,
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    engine: Engine,
    search: String,
    search_match_cache: Option<SearchMatchCache>,
    loaded_at: Instant,
}

struct SearchMatchCache {
    query: String,
    generation: Option<u64>,
    matches: Arc<HashSet<usize>>,
}

/// Read-only shell facts the panels display.
struct ShellStatus<'a> {
    source: &'a str,
    query: StatusQuery,
    is_loading: bool,
    refresh_interval: Option<Duration>,
}

/// What the panels asked the shell to do this frame.
#[derive(Default)]
struct ShellRequests {
    reload: bool,
    query: Option<StatusQuery>,
}

impl TopologyApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: &Config) -> Self {
        let (tx, rx) = mpsc::channel();
        let mut app = Self {
            source: config.data_source(),
            timeout: config.timeout(),
            refresh_interval: config.refresh_interval(),
            query: config.query(),
            force_params: config.physics.force_params(),
            zoom_limits: config.zoom_limits(),
            tracker: ReloadTracker::default(),
            tx,
            rx,
            last_request: Instant::now(),
            state: AppState::Loading,
        };
        app.request_load();
        app
    }

    fn request_load(&mut self) {
        let id = self.tracker.issue();
        let source = self.source.clone();
        let query = self.query;
        let timeout = self.timeout;
        let tx = self.tx.clone();
        self.last_request = Instant::now();

        info!(
            id,
            source = %source.describe(),
            window = query.window.minutes(),
            aggregation = ?query.aggregation,
            "requesting topology"
        );
        thread::spawn(move || {
            let result =
                load_topology(&source, query, timeout).map_err(|error| format!("{error:#}"));
            let _ = tx.send((id, result));
        });
    }

    fn poll_loads(&mut self) {
        while let Ok((id, result)) = self.rx.try_recv() {
            if !self.tracker.accept(id) {
                continue;
            }

            match result {
                Ok(topology) => self.apply_topology(&topology),
                Err(error) => {
                    warn!(%error, "topology load failed");
                    self.state = AppState::Error(error);
                }
            }
        }
    }

    fn apply_topology(&mut self, topology: &Topology) {
        if topology.is_empty() {
            info!("backend reported no nodes for this window");
        }

        if let AppState::Ready(model) = &mut self.state {
            model.replace_topology(topology);
            return;
        }

        let mut engine = Engine::new(self.force_params, self.zoom_limits);
        engine.load(topology);
        self.state = AppState::Ready(Box::new(ViewModel::new(engine)));
    }

    fn refresh_remaining(&self) -> Option<Duration> {
        let interval = self.refresh_interval?;
        Some(interval.saturating_sub(self.last_request.elapsed()))
    }
}

/// Delay until the next unprompted frame. While a graph is shown the age
/// label needs at least a coarse tick even with auto-refresh off.
fn next_repaint(in_flight: bool, ready: bool, refresh_left: Option<Duration>) -> Option<Duration> {
    if in_flight {
        return Some(LOAD_POLL);
    }
    match (refresh_left, ready) {
        (Some(left), true) => Some(left.min(AGE_TICK)),
        (None, true) => Some(AGE_TICK),
        (left, false) => left,
    }
}

impl ViewModel {
    fn new(engine: Engine) -> Self {
        Self {
            engine,
            search: String::new(),
            search_match_cache: None,
            loaded_at: Instant::now(),
        }
    }

    fn replace_topology(&mut self, topology: &Topology) {
        self.engine.load(topology);
        self.search_match_cache = None;
        self.loaded_at = Instant::now();
    }
}

impl eframe::App for TopologyApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.poll_loads();

        let is_loading = self.tracker.in_flight();
        let source = self.source.describe();
        let mut requests = ShellRequests::default();

        match &mut self.state {
            AppState::Loading => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading network topology...");
                        ui.add_space(8.0);
                        ui.label(source.as_str());
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load network topology");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    let retry = ui.add_enabled(!is_loading, egui::Button::new("Retry"));
                    if retry.clicked() {
                        requests.reload = true;
                    }
                });
            }
            AppState::Ready(model) => {
                let status = ShellStatus {
                    source: &source,
                    query: self.query,
                    is_loading,
                    refresh_interval: self.refresh_interval,
                };
                model.show(ctx, &status, &mut requests);
            }
        }

        if let Some(query) = requests.query
            && query != self.query
        {
            self.query = query;
            requests.reload = true;
        }

        let refresh_due = !is_loading && self.refresh_remaining().is_some_and(|left| left.is_zero());
        if requests.reload || refresh_due {
            if matches!(self.state, AppState::Error(_)) {
                self.state = AppState::Loading;
            }
            self.request_load();
        }

        let ready = matches!(self.state, AppState::Ready(_));
        if let Some(delay) =
            next_repaint(self.tracker.in_flight(), ready, self.refresh_remaining())
        {
            ctx.request_repaint_after(delay);
        }
    }
}
