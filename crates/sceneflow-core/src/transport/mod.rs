//! Chat transport port.
//!
//! The engine never talks to a messaging platform directly: replies leave
//! through a [`Transport`], which owns platform-specific encoding (including
//! turning a rendered [`Keyboard`] into the platform's native wire format).

use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use sceneflow_types::conversation::PeerId;
use sceneflow_types::error::TransportError;
use sceneflow_types::keyboard::Keyboard;

/// Outbound side of a messaging platform binding.
pub trait Transport: Send + Sync {
    /// Send a text message with a keyboard (possibly [`Keyboard::empty`]).
    fn send_text(
        &self,
        peer: &PeerId,
        text: &str,
        keyboard: &Keyboard,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Send an image (URL or platform attachment id).
    fn send_image(
        &self,
        peer: &PeerId,
        source: &str,
        keyboard: &Keyboard,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Send an image with a caption.
    fn send_image_with_text(
        &self,
        peer: &PeerId,
        text: &str,
        source: &str,
        keyboard: &Keyboard,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Send a video (URL or platform attachment id).
    fn send_video(
        &self,
        peer: &PeerId,
        source: &str,
        keyboard: &Keyboard,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;
}

/// Object-safe version of [`Transport`] with boxed futures.
pub trait TransportDyn: Send + Sync {
    fn send_text_boxed<'a>(
        &'a self,
        peer: &'a PeerId,
        text: &'a str,
        keyboard: &'a Keyboard,
    ) -> BoxFuture<'a, Result<(), TransportError>>;

    fn send_image_boxed<'a>(
        &'a self,
        peer: &'a PeerId,
        source: &'a str,
        keyboard: &'a Keyboard,
    ) -> BoxFuture<'a, Result<(), TransportError>>;

    fn send_image_with_text_boxed<'a>(
        &'a self,
        peer: &'a PeerId,
        text: &'a str,
        source: &'a str,
        keyboard: &'a Keyboard,
    ) -> BoxFuture<'a, Result<(), TransportError>>;

    fn send_video_boxed<'a>(
        &'a self,
        peer: &'a PeerId,
        source: &'a str,
        keyboard: &'a Keyboard,
    ) -> BoxFuture<'a, Result<(), TransportError>>;
}

impl<T: Transport> TransportDyn for T {
    fn send_text_boxed<'a>(
        &'a self,
        peer: &'a PeerId,
        text: &'a str,
        keyboard: &'a Keyboard,
    ) -> BoxFuture<'a, Result<(), TransportError>> {
        Box::pin(self.send_text(peer, text, keyboard))
    }

    fn send_image_boxed<'a>(
        &'a self,
        peer: &'a PeerId,
        source: &'a str,
        keyboard: &'a Keyboard,
    ) -> BoxFuture<'a, Result<(), TransportError>> {
        Box::pin(self.send_image(peer, source, keyboard))
    }

    fn send_image_with_text_boxed<'a>(
        &'a self,
        peer: &'a PeerId,
        text: &'a str,
        source: &'a str,
        keyboard: &'a Keyboard,
    ) -> BoxFuture<'a, Result<(), TransportError>> {
        Box::pin(self.send_image_with_text(peer, text, source, keyboard))
    }

    fn send_video_boxed<'a>(
        &'a self,
        peer: &'a PeerId,
        source: &'a str,
        keyboard: &'a Keyboard,
    ) -> BoxFuture<'a, Result<(), TransportError>> {
        Box::pin(self.send_video(peer, source, keyboard))
    }
}

/// Type-erased transport held by the dispatcher.
#[derive(Clone)]
pub struct BoxTransport {
    inner: Arc<dyn TransportDyn>,
}

impl BoxTransport {
    pub fn new<T: Transport + 'static>(transport: T) -> Self {
        Self {
            inner: Arc::new(transport),
        }
    }

    pub async fn send_text(
        &self,
        peer: &PeerId,
        text: &str,
        keyboard: &Keyboard,
    ) -> Result<(), TransportError> {
        self.inner.send_text_boxed(peer, text, keyboard).await
    }

    pub async fn send_image(
        &self,
        peer: &PeerId,
        source: &str,
        keyboard: &Keyboard,
    ) -> Result<(), TransportError> {
        self.inner.send_image_boxed(peer, source, keyboard).await
    }

    pub async fn send_image_with_text(
        &self,
        peer: &PeerId,
        text: &str,
        source: &str,
        keyboard: &Keyboard,
    ) -> Result<(), TransportError> {
        self.inner
            .send_image_with_text_boxed(peer, text, source, keyboard)
            .await
    }

    pub async fn send_video(
        &self,
        peer: &PeerId,
        source: &str,
        keyboard: &Keyboard,
    ) -> Result<(), TransportError> {
        self.inner.send_video_boxed(peer, source, keyboard).await
    }
}

impl std::fmt::Debug for BoxTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxTransport").finish_non_exhaustive()
    }
}
