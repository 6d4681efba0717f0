//! Viewport resize notifications

use tokio::sync::watch;

/// Size of the whole display area (terminal cells)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportSize {
    pub width: u16,
    pub height: u16,
}

impl ViewportSize {
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// Publishes viewport size changes to subscribers
pub struct Viewport {
    tx: watch::Sender<ViewportSize>,
}

impl Viewport {
    pub fn new(size: ViewportSize) -> Self {
        let (tx, _) = watch::channel(size);
        Self { tx }
    }

    pub fn size(&self) -> ViewportSize {
        *self.tx.borrow()
    }

    /// Record a new size; subscribers see it on their next poll
    pub fn resize(&self, size: ViewportSize) {
        self.tx.send_if_modified(|current| {
            if *current == size {
                false
            } else {
                *current = size;
                true
            }
        });
    }

    pub fn subscribe(&self) -> ResizeSubscription {
        ResizeSubscription {
            rx: self.tx.subscribe(),
        }
    }

    /// Live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// A registered resize listener
#[derive(Debug)]
pub struct ResizeSubscription {
    rx: watch::Receiver<ViewportSize>,
}

impl ResizeSubscription {
    /// Latest size if it changed since the last poll
    pub fn poll(&mut self) -> Option<ViewportSize> {
        match self.rx.has_changed() {
            Ok(true) => Some(*self.rx.borrow_and_update()),
            _ => None,
        }
    }

    pub fn unsubscribe(self) {}
}
