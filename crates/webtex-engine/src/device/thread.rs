use std::thread::{self, ThreadId};

/// Identity of the thread that owns the host graphics context.
///
/// Every call that touches a GPU handle must happen on this thread. Work is
/// never marshalled here; violating the contract is a bug in the embedding
/// and panics.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RenderThread {
    id: ThreadId,
}

impl RenderThread {
    /// Binds to the calling thread.
    pub fn current() -> Self {
        Self {
            id: thread::current().id(),
        }
    }

    pub fn id(&self) -> ThreadId {
        self.id
    }

    pub fn is_current(&self) -> bool {
        thread::current().id() == self.id
    }

    /// Panics unless called from the bound thread.
    #[track_caller]
    pub fn assert_current(&self) {
        if !self.is_current() {
            let here = thread::current();
            panic!(
                "GPU call off the render thread (called from {:?} / {:?}, render thread is {:?})",
                here.name().unwrap_or("<unnamed>"),
                here.id(),
                self.id
            );
        }
    }
}
