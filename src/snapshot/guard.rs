//! Scoped container pause: stop on acquire, start on release or Drop.

use crate::models::Volume;
use crate::transport::{ArchiveTransport, Step};

pub(crate) struct PauseGuard<'a> {
    transport: &'a dyn ArchiveTransport,
    volumes: &'a [Volume],
    pause: Step<()>,
    released: bool,
}

impl<'a> PauseGuard<'a> {
    pub(crate) fn acquire(transport: &'a dyn ArchiveTransport, volumes: &'a [Volume]) -> Self {
        let pause = transport.pause_containers(volumes);
        Self {
            transport,
            volumes,
            pause,
            released: false,
        }
    }

    /// Resume now; returns (pause step, resume step).
    pub(crate) fn release(mut self) -> (Step<()>, Step<()>) {
        self.released = true;
        let resume = self.transport.resume_containers(self.volumes);
        let pause = std::mem::replace(&mut self.pause, Step::Succeeded(()));
        (pause, resume)
    }
}

impl Drop for PauseGuard<'_> {
    fn drop(&mut self) {
        // unwinding path only; release() already resumed otherwise
        if !self.released {
            let _ = self.transport.resume_containers(self.volumes);
        }
    }
}
