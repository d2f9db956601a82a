use crate::host::{CanvasHost, GlSource};
use crate::paint::Color;

use super::{GpuContext, GpuError};

/// Lazily created, memoised [`GpuContext`].
///
/// The first successful [`get_or_init`](Self::get_or_init) creates the
/// context; later calls for the same surface return it unchanged. Asking for a
/// different surface is an error: a page has one GL context.
pub struct GpuSlot<E: GlSource> {
    context: Option<GpuContext<E>>,
}

impl<E: GlSource> GpuSlot<E> {
    pub const fn new() -> Self {
        Self { context: None }
    }

    pub fn get_or_init<H>(
        &mut self,
        host: &mut H,
        surface_id: &str,
        background: Option<Color>,
    ) -> Result<&mut GpuContext<E>, GpuError>
    where
        H: CanvasHost<Element = E>,
    {
        let context = match self.context.take() {
            Some(existing) => existing,
            None => GpuContext::from_host(host, surface_id, background)?,
        };

        if context.surface_id() != surface_id {
            let bound = context.surface_id().to_owned();
            self.context = Some(context);
            log::error!("GPU context already bound to `{bound}`, rejected `{surface_id}`");
            return Err(GpuError::ContextRebind {
                bound,
                requested: surface_id.to_owned(),
            });
        }

        Ok(self.context.insert(context))
    }

    #[inline]
    pub fn get(&self) -> Option<&GpuContext<E>> {
        self.context.as_ref()
    }

    #[inline]
    pub fn get_mut(&mut self) -> Option<&mut GpuContext<E>> {
        self.context.as_mut()
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.context.is_some()
    }

    /// Drops the context, releasing its GL resources.
    pub fn reset(&mut self) {
        self.context = None;
    }
}

impl<E: GlSource> Default for GpuSlot<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::recording::{RecordingCanvas, RecordingHost};

    #[test]
    fn first_caller_creates_later_callers_share() {
        let canvas = RecordingCanvas::new(10.0, 10.0, 1.0);
        let mut host = RecordingHost::new().with_canvas("webgl", canvas.clone());
        let mut slot = GpuSlot::new();

        assert!(!slot.is_initialized());
        slot.get_or_init(&mut host, "webgl", None).unwrap();
        slot.get_or_init(&mut host, "webgl", Some(Color::white())).unwrap();

        // One context, one vertex array; the second background is ignored.
        assert_eq!(canvas.gl().live_vertex_arrays(), 1);
        assert_eq!(slot.get().map(|c| c.background()), Some(Color::transparent()));
    }

    #[test]
    fn rebinding_to_another_surface_is_rejected() {
        let mut host = RecordingHost::new()
            .with_canvas("a", RecordingCanvas::new(10.0, 10.0, 1.0))
            .with_canvas("b", RecordingCanvas::new(10.0, 10.0, 1.0));
        let mut slot = GpuSlot::new();

        slot.get_or_init(&mut host, "a", None).unwrap();
        let err = slot.get_or_init(&mut host, "b", None).err().unwrap();
        assert!(matches!(
            err,
            GpuError::ContextRebind { ref bound, ref requested } if bound == "a" && requested == "b"
        ));
        assert_eq!(slot.get().map(|c| c.surface_id()), Some("a"));
    }

    #[test]
    fn failed_init_leaves_slot_empty() {
        let mut host = RecordingHost::new();
        let mut slot: GpuSlot<RecordingCanvas> = GpuSlot::new();
        assert!(slot.get_or_init(&mut host, "missing", None).is_err());
        assert!(!slot.is_initialized());
    }

    #[test]
    fn reset_releases_the_context() {
        let canvas = RecordingCanvas::new(10.0, 10.0, 1.0);
        let mut host = RecordingHost::new().with_canvas("webgl", canvas.clone());
        let mut slot = GpuSlot::new();
        slot.get_or_init(&mut host, "webgl", None).unwrap();
        slot.reset();
        assert_eq!(canvas.gl().live_vertex_arrays(), 0);
    }
}
