//! The boundary object between the UI layer and the engine.
//!
//! A [`MapBridge`] owns its engine exclusively. The engine sits behind a
//! private [`HandleState`]; every operation reaches it through
//! [`MapBridge::engine`] or [`MapBridge::engine_mut`], which refuse (and log)
//! once the bridge has been destroyed. Callers get a documented default back
//! instead of an error in that case. Bad arguments are a different matter and
//! always come back as `Err`.
//!
//! Operations are grouped by concern in the submodules; all of them are
//! inherent methods on `MapBridge`.

mod annotations;
mod camera;
mod diagnostics;
mod query;
mod style;
mod surface;

use crate::core::config::{BridgeOptions, DeviceProfile, DisplayContext};
use crate::core::units::PixelRatio;
use crate::data::image::Image;
use crate::engine::{self, EngineParams, MapEngine};
use crate::events::listeners::{ListenerId, ListenerSet};
use crate::events::{self, EngineEvent, EventQueue, MapChange, MapViewHost, SnapshotCallback};
use crate::{MapError, Result};
use std::rc::Rc;

/// Engine ownership state. Once `Destroyed`, the engine is gone for good.
enum HandleState<E> {
    Live(E),
    Destroyed,
}

pub struct MapBridge<E: MapEngine> {
    handle: HandleState<E>,
    pixel_ratio: PixelRatio,
    device: DeviceProfile,
    view: Option<Rc<dyn MapViewHost>>,
    events: Option<EventQueue>,
    listeners: ListenerSet,
    snapshot: Option<SnapshotCallback>,
}

impl<E: MapEngine> MapBridge<E> {
    /// Creates the bridge and its engine with default options
    pub fn new(display: &DisplayContext, view: Option<Rc<dyn MapViewHost>>) -> Result<Self> {
        Self::with_options(display, view, &BridgeOptions::default())
    }

    pub fn with_options(
        display: &DisplayContext,
        view: Option<Rc<dyn MapViewHost>>,
        options: &BridgeOptions,
    ) -> Result<Self> {
        if !engine::is_initialized() {
            return Err(MapError::EngineNotInitialized);
        }
        let pixel_ratio = PixelRatio::new(display.density)?;
        let device = display.device_profile()?;
        let params = EngineParams {
            pixel_ratio,
            device,
            budget: options.budget_for(&device),
            api_base_url: options.api_base_url.clone(),
        };

        let (sink, queue) = events::channel();
        let engine = E::create(&params, sink)?;
        log::debug!(
            "bridge created: pixel ratio {}, {} processors, {} bytes total memory",
            pixel_ratio.get(),
            device.available_processors,
            device.total_memory
        );

        let mut bridge = Self {
            handle: HandleState::Live(engine),
            pixel_ratio,
            device,
            view,
            events: Some(queue),
            listeners: ListenerSet::new(),
            snapshot: None,
        };
        if options.debug {
            bridge.set_debug(true);
        }
        if options.fps_overlay {
            bridge.set_enable_fps(true);
        }
        if let Some(url) = &options.style_url {
            bridge.set_style_url(url);
        }
        Ok(bridge)
    }

    /// Tears the engine down. Everything after this is a logged no-op.
    pub fn destroy(&mut self) {
        let HandleState::Live(engine) = &mut self.handle else {
            log::warn!("destroy() called on a map bridge that was already destroyed");
            return;
        };
        engine.destroy();
        self.view = None;
        // pending engine events are discarded with the queue
        self.events = None;
        self.snapshot = None;
        self.handle = HandleState::Destroyed;
        log::debug!("bridge destroyed");
    }

    pub fn is_destroyed(&self) -> bool {
        matches!(self.handle, HandleState::Destroyed)
    }

    /// The live engine, or `None` after [`destroy`](Self::destroy).
    ///
    /// A non-empty `op` names the refused call in the error log; an empty one
    /// refuses silently.
    pub fn engine(&self, op: &str) -> Option<&E> {
        match &self.handle {
            HandleState::Live(engine) => Some(engine),
            HandleState::Destroyed => {
                report_destroyed(op);
                None
            }
        }
    }

    pub fn engine_mut(&mut self, op: &str) -> Option<&mut E> {
        match &mut self.handle {
            HandleState::Live(engine) => Some(engine),
            HandleState::Destroyed => {
                report_destroyed(op);
                None
            }
        }
    }

    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio.get()
    }

    pub fn device_profile(&self) -> &DeviceProfile {
        &self.device
    }

    /// View width in physical pixels, 0 without a view
    pub fn width(&self) -> i32 {
        self.engine("")
            .and(self.view.as_ref())
            .map(|view| view.width())
            .unwrap_or(0)
    }

    /// View height in physical pixels, 0 without a view
    pub fn height(&self) -> i32 {
        self.engine("")
            .and(self.view.as_ref())
            .map(|view| view.height())
            .unwrap_or(0)
    }

    pub fn add_on_map_changed_listener<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(MapChange) + Send + Sync + 'static,
    {
        self.listeners.add(listener)
    }

    pub fn remove_on_map_changed_listener(&self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    /// Shared handle to the listener set, usable from inside a listener
    pub fn listeners(&self) -> ListenerSet {
        self.listeners.clone()
    }

    /// Replaces the snapshot callback, then asks for a snapshot of the next frame.
    pub fn add_snapshot_callback<F>(&mut self, callback: F)
    where
        F: FnMut(Image) + 'static,
    {
        self.snapshot = Some(Box::new(callback));
        self.schedule_take_snapshot();
        self.render();
    }

    /// Number of engine events waiting for [`dispatch_events`](Self::dispatch_events)
    pub fn pending_events(&self) -> usize {
        self.events.as_ref().map(|queue| queue.pending()).unwrap_or(0)
    }

    /// Delivers queued engine events on the calling (owner) thread.
    ///
    /// Returns how many events were handled.
    pub fn dispatch_events(&mut self) -> usize {
        let Some(queue) = &self.events else {
            return 0;
        };
        let events = queue.drain();
        let count = events.len();

        for event in events {
            match event {
                EngineEvent::Invalidate => {
                    if let Some(view) = &self.view {
                        view.on_invalidate();
                    }
                }
                EngineEvent::MapChanged(change) => {
                    let delivered = self.listeners.notify(change);
                    log::trace!("{:?} delivered to {} listeners", change, delivered);
                }
                EngineEvent::FpsChanged(fps) => {
                    if let Some(view) = &self.view {
                        view.on_fps_changed(fps);
                    }
                }
                EngineEvent::SnapshotReady(image) => self.on_snapshot_ready(image),
            }
        }
        count
    }

    fn on_snapshot_ready(&mut self, image: Option<Image>) {
        if let (Some(callback), Some(image)) = (self.snapshot.as_mut(), image) {
            callback(image);
        }
    }
}

impl<E: MapEngine> Drop for MapBridge<E> {
    fn drop(&mut self) {
        if !self.is_destroyed() {
            self.destroy();
        }
    }
}

impl<E: MapEngine> std::fmt::Debug for MapBridge<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapBridge")
            .field("destroyed", &self.is_destroyed())
            .field("pixel_ratio", &self.pixel_ratio)
            .field("listeners", &self.listeners)
            .finish()
    }
}

fn report_destroyed(op: &str) {
    if !op.is_empty() {
        log::error!(
            "You're calling `{}` after the map bridge was destroyed, were you invoking it after `destroy()`?",
            op
        );
    }
}
