use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use crate::host::{FrameRequest, FrameScheduler};

#[derive(Debug, Default)]
struct FramesShared {
    next_id: u64,
    pending: BTreeSet<u64>,
}

/// Frame scheduler backed by window redraws.
///
/// The runtime only asks winit for a redraw while a request is pending, so an
/// app whose loop is stopped leaves the event loop idle.
#[derive(Debug, Clone, Default)]
pub struct WindowFrames {
    shared: Rc<RefCell<FramesShared>>,
}

impl WindowFrames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pending(&self) -> bool {
        !self.shared.borrow().pending.is_empty()
    }

    /// Fires every pending request. Returns `false` when none was pending.
    pub fn fire_all(&self) -> bool {
        let mut s = self.shared.borrow_mut();
        let fired = !s.pending.is_empty();
        s.pending.clear();
        fired
    }
}

impl FrameScheduler for WindowFrames {
    fn request_frame(&mut self) -> Option<FrameRequest> {
        let mut s = self.shared.borrow_mut();
        s.next_id += 1;
        let id = s.next_id;
        s.pending.insert(id);
        Some(FrameRequest(id))
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        self.shared.borrow_mut().pending.remove(&request.0);
    }
}
