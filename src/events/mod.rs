//! Notifications flowing from the engine back to the owner thread.
//!
//! The engine may emit on its own render thread. Events are queued through an
//! [`EventSink`] and only touch owner-thread state (the view host, listeners,
//! the snapshot callback) once [`crate::MapBridge::dispatch_events`] drains them.

pub mod listeners;

use crate::data::image::Image;
use crossbeam_channel::{Receiver, Sender};

/// Reason code carried by a map-changed notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapChange {
    RegionWillChange,
    RegionWillChangeAnimated,
    RegionIsChanging,
    RegionDidChange,
    RegionDidChangeAnimated,
    WillStartLoadingMap,
    DidFinishLoadingMap,
    DidFailLoadingMap,
    WillStartRenderingFrame,
    DidFinishRenderingFrame,
    DidFinishRenderingFrameFullyRendered,
    WillStartRenderingMap,
    DidFinishRenderingMap,
    DidFinishRenderingMapFullyRendered,
    DidFinishLoadingStyle,
    SourceDidChange,
    /// A code this version does not know about, preserved verbatim
    Unknown(i32),
}

impl MapChange {
    pub fn from_raw(code: i32) -> Self {
        match code {
            0 => Self::RegionWillChange,
            1 => Self::RegionWillChangeAnimated,
            2 => Self::RegionIsChanging,
            3 => Self::RegionDidChange,
            4 => Self::RegionDidChangeAnimated,
            5 => Self::WillStartLoadingMap,
            6 => Self::DidFinishLoadingMap,
            7 => Self::DidFailLoadingMap,
            8 => Self::WillStartRenderingFrame,
            9 => Self::DidFinishRenderingFrame,
            10 => Self::DidFinishRenderingFrameFullyRendered,
            11 => Self::WillStartRenderingMap,
            12 => Self::DidFinishRenderingMap,
            13 => Self::DidFinishRenderingMapFullyRendered,
            14 => Self::DidFinishLoadingStyle,
            15 => Self::SourceDidChange,
            other => Self::Unknown(other),
        }
    }

    pub fn raw(self) -> i32 {
        match self {
            Self::RegionWillChange => 0,
            Self::RegionWillChangeAnimated => 1,
            Self::RegionIsChanging => 2,
            Self::RegionDidChange => 3,
            Self::RegionDidChangeAnimated => 4,
            Self::WillStartLoadingMap => 5,
            Self::DidFinishLoadingMap => 6,
            Self::DidFailLoadingMap => 7,
            Self::WillStartRenderingFrame => 8,
            Self::DidFinishRenderingFrame => 9,
            Self::DidFinishRenderingFrameFullyRendered => 10,
            Self::WillStartRenderingMap => 11,
            Self::DidFinishRenderingMap => 12,
            Self::DidFinishRenderingMapFullyRendered => 13,
            Self::DidFinishLoadingStyle => 14,
            Self::SourceDidChange => 15,
            Self::Unknown(code) => code,
        }
    }
}

/// Inbound engine notification
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Invalidate,
    MapChanged(MapChange),
    FpsChanged(f64),
    /// `None` when the engine could not produce an image
    SnapshotReady(Option<Image>),
}

/// Engine-side handle for emitting events, usable from any thread
#[derive(Debug, Clone)]
pub struct EventSink {
    sender: Sender<EngineEvent>,
}

impl EventSink {
    /// Queues an event; returns false once the bridge has been torn down
    pub fn send(&self, event: EngineEvent) -> bool {
        match self.sender.send(event) {
            Ok(()) => true,
            Err(err) => {
                log::trace!("dropping {:?}, bridge already destroyed", err.into_inner());
                false
            }
        }
    }

    pub fn invalidate(&self) -> bool {
        self.send(EngineEvent::Invalidate)
    }

    pub fn map_changed(&self, change: MapChange) -> bool {
        self.send(EngineEvent::MapChanged(change))
    }

    pub fn fps_changed(&self, fps: f64) -> bool {
        self.send(EngineEvent::FpsChanged(fps))
    }

    pub fn snapshot_ready(&self, image: Option<Image>) -> bool {
        self.send(EngineEvent::SnapshotReady(image))
    }
}

/// Owner-side end of the event channel
#[derive(Debug)]
pub(crate) struct EventQueue {
    receiver: Receiver<EngineEvent>,
}

impl EventQueue {
    /// Takes everything queued so far without blocking
    pub(crate) fn drain(&self) -> Vec<EngineEvent> {
        self.receiver.try_iter().collect()
    }

    pub(crate) fn pending(&self) -> usize {
        self.receiver.len()
    }
}

pub(crate) fn channel() -> (EventSink, EventQueue) {
    let (sender, receiver) = crossbeam_channel::unbounded();
    (EventSink { sender }, EventQueue { receiver })
}

/// The UI-side view that receives invalidation and FPS callbacks
pub trait MapViewHost {
    /// The engine wants a new frame
    fn on_invalidate(&self);

    fn on_fps_changed(&self, fps: f64);

    /// View width in physical pixels
    fn width(&self) -> i32;

    /// View height in physical pixels
    fn height(&self) -> i32;
}

/// Receives the image produced by a scheduled snapshot
pub type SnapshotCallback = Box<dyn FnMut(Image)>;
