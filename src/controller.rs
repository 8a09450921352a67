use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

use crate::{
    models::Category,
    panel::{ImageRequestPanel, PanelCommand, PanelEvent, PanelView, RequestStatus},
    service::ImageService,
};

/// Drives an [`ImageRequestPanel`] against an [`ImageService`].
///
/// The panel sits behind an async mutex that is released while the service
/// call is awaited, so the panel stays responsive (and refuses duplicate
/// submissions) during a request. Clones share the same panel.
#[derive(Clone)]
pub struct PanelController {
    panel: Arc<Mutex<ImageRequestPanel>>,
    service: Arc<dyn ImageService>,
}

impl PanelController {
    pub fn new(service: Arc<dyn ImageService>) -> Self {
        Self::with_panel(ImageRequestPanel::new(), service)
    }

    pub fn with_panel(panel: ImageRequestPanel, service: Arc<dyn ImageService>) -> Self {
        Self {
            panel: Arc::new(Mutex::new(panel)),
            service,
        }
    }

    pub async fn panel(&self) -> MutexGuard<'_, ImageRequestPanel> {
        self.panel.lock().await
    }

    pub async fn view(&self) -> PanelView {
        self.panel.lock().await.view()
    }

    pub async fn status(&self) -> RequestStatus {
        self.panel.lock().await.status()
    }

    pub async fn select_category(&self, category: Category) {
        self.dispatch(PanelEvent::SelectCategory(category)).await;
    }

    pub async fn set_percentage(&self, raw: &str) {
        self.dispatch(PanelEvent::SetPercentage(raw.to_string())).await;
    }

    /// Submits and waits for the outcome. Returns the final status, or the
    /// current one unchanged when the submission was refused.
    pub async fn generate_image(&self) -> RequestStatus {
        self.dispatch(PanelEvent::Generate).await;
        self.status().await
    }

    /// Feeds one event to the panel and runs whatever command it produces.
    pub async fn dispatch(&self, event: PanelEvent) {
        let command = self.panel.lock().await.update(event);

        if let Some(PanelCommand::FetchImage(request)) = command {
            let result = self.service.generate(&request).await;
            self.panel.lock().await.update(PanelEvent::ImageReceived {
                request_id: request.request_id,
                result,
            });
        }
    }
}
