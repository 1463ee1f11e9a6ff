//! One decoration session bound to a host document

use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::config::DecorConfig;
use crate::coordinator::{CleanupCoordinator, CleanupReport, CoordinatorHandle, DEFAULT_SETTLE_DELAY};
use crate::error::ConfigError;
use crate::host::AnnotationHost;
use crate::overlay::OverlayNode;
use crate::renderer::{DecorationRenderer, Overlay};
use crate::styles::{StyleGuard, StyleRegistry};
use sigdecor_types::Annotation;

/// Per-session settings that are not part of the decoration look
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Identifier of the signed-in user, used when an annotation names no signer
    pub logged_in_user: Option<String>,
    pub settle_delay: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            logged_in_user: None,
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }
}

/// Styles, renderer and cleanup listener for one host document.
///
/// Dropping a session without calling [`DecorSession::shutdown`] releases the
/// styles but leaves the cleanup listener registered with the host.
pub struct DecorSession<H: AnnotationHost + ?Sized + 'static> {
    renderer: DecorationRenderer,
    coordinator: CoordinatorHandle<H>,
    logged_in_user: Option<String>,
    _styles: StyleGuard,
}

impl<H: AnnotationHost + ?Sized + 'static> DecorSession<H> {
    /// Validate the configuration, register styles and attach the cleanup
    /// listener. Must be called inside a tokio runtime.
    pub fn start(
        host: Arc<H>,
        config: DecorConfig,
        options: SessionOptions,
        styles: &StyleRegistry,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let styles = styles.register();
        let coordinator = CleanupCoordinator::new(host, config.signature.clone())
            .with_settle_delay(options.settle_delay)
            .attach();
        info!(
            listener = coordinator.listener_id(),
            user = options.logged_in_user.as_deref().unwrap_or("<anonymous>"),
            "Signature decoration session started"
        );

        Ok(Self {
            renderer: DecorationRenderer::new(config),
            coordinator,
            logged_in_user: options.logged_in_user,
            _styles: styles,
        })
    }

    pub fn renderer(&self) -> &DecorationRenderer {
        &self.renderer
    }

    /// Overlay descriptor for an annotation, or `None` if it is not a signature
    pub fn overlay(&self, annotation: &Annotation) -> Option<Overlay> {
        self.renderer
            .render(annotation, self.logged_in_user.as_deref())
    }

    /// Node tree for the host's custom-overlay hook
    pub fn render_overlay(&self, annotation: &Annotation) -> Option<OverlayNode> {
        self.renderer
            .render_node(annotation, self.logged_in_user.as_deref())
    }

    /// Wait for the next cleanup report. At most `REPORT_BUFFER` unread
    /// reports are kept; later ones are dropped until the queue is read.
    pub async fn next_report(&mut self) -> Option<CleanupReport> {
        self.coordinator.next_report().await
    }

    /// Detach the cleanup listener and release the styles. Returns reports
    /// that were produced but not read.
    pub async fn shutdown(self) -> Vec<CleanupReport> {
        let remaining = self.coordinator.detach().await;
        info!("Signature decoration session stopped");
        remaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryHost;
    use crate::renderer::SIGNER_LABEL_CLASS;
    use sigdecor_types::{AnnotationKind, BoundingBox};

    fn options(user: Option<&str>) -> SessionOptions {
        SessionOptions {
            logged_in_user: user.map(str::to_string),
            settle_delay: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn test_session_owns_styles_and_listener() {
        let host = Arc::new(MemoryHost::new());
        let styles = StyleRegistry::new();

        let first = DecorSession::start(Arc::clone(&host), DecorConfig::default(), options(None), &styles).unwrap();
        let second = DecorSession::start(Arc::clone(&host), DecorConfig::default(), options(None), &styles).unwrap();
        assert_eq!(styles.install_count(), 1);
        assert_eq!(styles.active_registrations(), 2);
        assert_eq!(host.listener_count(), 2);

        first.shutdown().await;
        assert!(styles.is_installed());
        assert_eq!(host.listener_count(), 1);

        second.shutdown().await;
        assert!(!styles.is_installed());
        assert_eq!(host.listener_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected_before_attaching() {
        let host = Arc::new(MemoryHost::new());
        let styles = StyleRegistry::new();
        let mut config = DecorConfig::default();
        config.curve.stroke_width = f64::INFINITY;

        let result = DecorSession::start(Arc::clone(&host), config, options(None), &styles);
        assert!(matches!(result, Err(ConfigError::NonFinite { .. })));
        assert_eq!(host.listener_count(), 0);
        assert!(!styles.is_installed());
    }

    #[tokio::test]
    async fn test_render_overlay_uses_session_user() {
        let host = Arc::new(MemoryHost::new());
        let session = DecorSession::start(host, DecorConfig::default(), options(Some("Alice")), &StyleRegistry::new()).unwrap();

        let ink = Annotation::new("ink", AnnotationKind::Ink, BoundingBox::new(0.0, 0.0, 150.0, 50.0));
        let node = session.render_overlay(&ink).unwrap();
        assert_eq!(
            node.find_by_class(SIGNER_LABEL_CLASS).unwrap().text_content(),
            "By Alice"
        );

        let widget = Annotation::new("w", AnnotationKind::Widget, BoundingBox::new(0.0, 0.0, 150.0, 50.0));
        assert!(session.render_overlay(&widget).is_none());
        session.shutdown().await;
    }
}
