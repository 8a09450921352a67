//! End-to-end panel flows driven through `PanelController`.

mod common;

use async_trait::async_trait;
use common::{start_mock, Reply, PNG};
use elongation::{
    Category, GenerationRequest, HttpImageService, ImagePayload, ImageRequestPanel, ImageService,
    ObjectUrlRegistry, PanelController, RequestError, RequestStatus, RetryPolicy, ServiceConfig,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

fn http_controller(base_url: &str, registry: &ObjectUrlRegistry) -> PanelController {
    let config = ServiceConfig::new()
        .with_base_url(base_url)
        .with_timeout(Duration::from_secs(5))
        .with_retry(RetryPolicy::none());
    let service = HttpImageService::new(&config).unwrap();
    PanelController::with_panel(
        ImageRequestPanel::with_registry(registry.clone()),
        Arc::new(service),
    )
}

/// Holds every request until released, counting calls.
struct GatedService {
    gate: Notify,
    calls: AtomicUsize,
}

#[async_trait]
impl ImageService for GatedService {
    async fn generate(&self, _request: &GenerationRequest) -> Result<ImagePayload, RequestError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.gate.notified().await;
        Ok(ImagePayload::new(PNG.to_vec()))
    }
}

#[tokio::test]
async fn test_successful_generation_previews_and_names_download() {
    let mock = start_mock(vec![Reply::png()]);
    let registry = ObjectUrlRegistry::new();
    let controller = http_controller(&mock.base_url, &registry);

    controller.select_category(Category::PhaseMap).await;
    controller.set_percentage("25").await;
    assert_eq!(controller.generate_image().await, RequestStatus::Completed);

    assert_eq!(
        mock.requests()[0].json(),
        serde_json::json!({"percentage": 25.0, "type": "phase_map"})
    );

    let view = controller.view().await;
    assert!(!view.is_loading);
    assert!(view.failure_message.is_none());
    let preview = view.preview.expect("preview shown");
    assert_eq!(preview.download_filename, "elongation_25.png");
    assert_eq!(preview.mime_type, "image/png");
    assert_eq!(registry.resolve(&preview.object_url).as_deref(), Some(PNG));
}

#[tokio::test]
async fn test_out_of_range_percentage_never_reaches_the_service() {
    let mock = start_mock(vec![Reply::png()]);
    let registry = ObjectUrlRegistry::new();
    let controller = http_controller(&mock.base_url, &registry);

    controller.select_category(Category::Kam).await;
    controller.set_percentage("3").await;

    let view = controller.view().await;
    assert_eq!(view.validation_message.as_deref(), Some("Enter minimum 5%"));
    assert!(!view.submit_enabled());

    assert_eq!(controller.generate_image().await, RequestStatus::Idle);
    assert!(mock.requests().is_empty());

    controller.set_percentage("61").await;
    assert_eq!(
        controller.view().await.validation_message.as_deref(),
        Some("Enter maximum 60%")
    );
}

#[tokio::test]
async fn test_service_failure_clears_loading_and_shows_no_image() {
    let mock = start_mock(vec![Reply::error(500, "model crashed")]);
    let registry = ObjectUrlRegistry::new();
    let controller = http_controller(&mock.base_url, &registry);

    controller.select_category(Category::Kam).await;
    controller.set_percentage("30").await;
    assert_eq!(controller.generate_image().await, RequestStatus::Failed);

    let view = controller.view().await;
    assert!(!view.is_loading);
    assert!(view.preview.is_none());
    assert!(view.submit_enabled());
    assert_eq!(
        view.failure_message.as_deref(),
        Some("Could not generate image: model crashed")
    );
    assert_eq!(registry.live_count(), 0);
}

#[tokio::test]
async fn test_second_submit_while_in_flight_is_ignored() {
    let service = Arc::new(GatedService {
        gate: Notify::new(),
        calls: AtomicUsize::new(0),
    });
    let controller = PanelController::new(service.clone());

    controller.select_category(Category::Kam).await;
    controller.set_percentage("20").await;

    let first = tokio::spawn({
        let controller = controller.clone();
        async move { controller.generate_image().await }
    });

    while service.calls.load(Ordering::SeqCst) == 0 {
        tokio::task::yield_now().await;
    }

    let view = controller.view().await;
    assert!(view.is_loading);
    assert!(!view.submit_enabled());

    assert_eq!(controller.generate_image().await, RequestStatus::InFlight);
    assert_eq!(service.calls.load(Ordering::SeqCst), 1);

    service.gate.notify_one();
    assert_eq!(first.await.unwrap(), RequestStatus::Completed);
    assert_eq!(service.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_switching_category_drops_previous_image() {
    let mock = start_mock(vec![Reply::png()]);
    let registry = ObjectUrlRegistry::new();
    let controller = http_controller(&mock.base_url, &registry);

    controller.select_category(Category::Kam).await;
    controller.set_percentage("45").await;
    controller.generate_image().await;

    let href = controller.view().await.preview.unwrap().object_url;
    assert_eq!(registry.live_count(), 1);

    controller.select_category(Category::PhaseMap).await;

    let view = controller.view().await;
    assert!(view.preview.is_none());
    assert_eq!(view.percentage_field.unwrap().value, "45");
    assert!(registry.resolve(&href).is_none());
    assert_eq!(registry.live_count(), 0);
}

#[tokio::test]
async fn test_downloaded_file_matches_received_bytes() {
    let mock = start_mock(vec![Reply::png()]);
    let registry = ObjectUrlRegistry::new();
    let controller = http_controller(&mock.base_url, &registry);
    let dir = tempfile::tempdir().unwrap();

    controller.select_category(Category::PhaseMap).await;
    controller.set_percentage("7.5").await;
    controller.generate_image().await;

    let path = {
        let panel = controller.panel().await;
        panel.image().unwrap().save_to(dir.path()).unwrap()
    };

    assert_eq!(path.file_name().unwrap(), "elongation_7.5.png");
    assert_eq!(std::fs::read(path).unwrap(), PNG);
}
