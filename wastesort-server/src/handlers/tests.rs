use std::io::Cursor;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use ndarray::Array4;
use tempfile::TempDir;
use tower::ServiceExt;
use wastesort_core::logic::model::UnavailableClassifier;
use wastesort_core::{
    ClassLabel, ClassifierError, Classifier, Preprocessor, ReportSet, WastePipeline,
};

use crate::{create_router, AppState, Config};

const BOUNDARY: &str = "wastesort-test-boundary";

/// Always answers with one label at a fixed confidence
struct FixedClassifier {
    label: ClassLabel,
    confidence: f32,
}

impl Classifier for FixedClassifier {
    fn predict(&self, _batch: &Array4<f32>) -> Result<Vec<f32>, ClassifierError> {
        let rest = (1.0 - self.confidence) / (ClassLabel::COUNT as f32 - 1.0);
        Ok(ClassLabel::ALL
            .iter()
            .map(|l| if *l == self.label { self.confidence } else { rest })
            .collect())
    }

    fn input_size(&self) -> u32 {
        128
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

/// Metal for reddish images, paper for bluish ones
struct ColourClassifier;

impl Classifier for ColourClassifier {
    fn predict(&self, batch: &Array4<f32>) -> Result<Vec<f32>, ClassifierError> {
        let label = if batch[[0, 0, 0, 0]] > batch[[0, 0, 0, 2]] {
            ClassLabel::Metal
        } else {
            ClassLabel::Paper
        };
        Ok(ClassLabel::ALL
            .iter()
            .map(|l| if *l == label { 0.9 } else { 0.1 / 9.0 })
            .collect())
    }

    fn input_size(&self) -> u32 {
        128
    }
}

struct TestApp {
    dir: TempDir,
    state: AppState,
}

impl TestApp {
    fn new(classifier: Arc<dyn Classifier>) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let config = Config {
            static_dir: root.join("static"),
            upload_dir: root.join("static").join("uploads"),
            csv_path: root.join("waste_log.csv"),
            pdf_path: root.join("waste_report.pdf"),
            chart_path: root.join("static").join("stats_chart.png"),
            ..Config::default()
        };

        let pipeline = WastePipeline::new(
            classifier,
            Preprocessor::new(config.img_size, config.channel_order),
            ReportSet::new(config.report_paths()),
        )
        .unwrap();

        Self {
            dir,
            state: AppState {
                pipeline: Arc::new(pipeline),
                config,
            },
        }
    }

    fn cardboard() -> Self {
        Self::new(Arc::new(FixedClassifier {
            label: ClassLabel::Cardboard,
            confidence: 0.91,
        }))
    }

    fn router(&self) -> Router {
        create_router(self.state.clone())
    }

    fn path(&self, relative: &str) -> std::path::PathBuf {
        self.dir.path().join(relative)
    }

    /// File names currently in the upload directory, sorted
    fn stored_uploads(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(&self.state.config.upload_dir)
            .map(|entries| {
                entries
                    .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names
    }

    async fn get(&self, uri: &str) -> Response {
        self.router()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn upload(&self, filename: &str, data: &[u8]) -> Response {
        self.router()
            .oneshot(multipart_request(&[("file", Some(filename), data)]))
            .await
            .unwrap()
    }
}

fn multipart_request(fields: &[(&str, Option<&str>, &[u8])]) -> Request<Body> {
    let mut body = Vec::new();
    for (name, filename, data) in fields {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match filename {
            Some(f) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n",
                    name, f
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
            ),
        }
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

fn png_bytes() -> Vec<u8> {
    solid_png([140, 100, 60])
}

fn solid_png(rgb: [u8; 3]) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(200, 150, image::Rgb(rgb));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8_lossy(&bytes).into_owned()
}

fn assert_redirects_home(response: &Response) {
    assert!(response.status().is_redirection(), "got {}", response.status());
    assert_eq!(response.headers()[header::LOCATION], "/");
}

#[tokio::test]
async fn test_index_shows_upload_form() {
    let app = TestApp::cardboard();
    let response = app.get("/").await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("enctype=\"multipart/form-data\""));
    assert!(html.contains("name=\"file\""));
}

#[tokio::test]
async fn test_cardboard_upload_renders_result() {
    let app = TestApp::cardboard();
    let response = app.upload("box.png", &png_bytes()).await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("<strong>cardboard</strong>"));
    assert!(html.contains("91.00%"));
    assert!(html.contains("Recyclable"));
    let stored = app.stored_uploads();
    assert_eq!(stored.len(), 1);
    assert!(stored[0].ends_with("-box.png"), "{:?}", stored);
    assert!(html.contains(&format!("/static/uploads/{}", stored[0])));
    let snapshot = app.state.pipeline.snapshot();
    assert_eq!(snapshot.total(), 1);
    assert_eq!(snapshot.get(ClassLabel::Cardboard), 1);
}

#[tokio::test]
async fn test_upload_refreshes_csv_report() {
    let app = TestApp::cardboard();
    app.upload("a.png", &png_bytes()).await;
    app.upload("b.png", &png_bytes()).await;

    let csv = std::fs::read_to_string(app.path("waste_log.csv")).unwrap();
    assert_eq!(
        csv,
        "Waste Classification Report\nTotal Items Processed: 2\ncardboard: 2\n"
    );
}

#[tokio::test]
async fn test_missing_file_redirects_without_counting() {
    let app = TestApp::cardboard();

    let no_field = app
        .router()
        .oneshot(multipart_request(&[("comment", None, b"hello".as_slice())]))
        .await
        .unwrap();
    assert_redirects_home(&no_field);

    let empty_name = app.upload("", &png_bytes()).await;
    assert_redirects_home(&empty_name);

    let empty_body = app.upload("empty.png", b"").await;
    assert_redirects_home(&empty_body);

    assert_eq!(app.state.pipeline.snapshot().total(), 0);
}

#[tokio::test]
async fn test_undecodable_upload_is_422_and_not_counted() {
    let app = TestApp::cardboard();
    let response = app.upload("notes.jpg", b"definitely not a jpeg").await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body_text(response).await;
    assert!(html.contains("not a readable image"));
    assert_eq!(app.state.pipeline.snapshot().total(), 0);
}

#[tokio::test]
async fn test_missing_model_is_500_and_not_counted() {
    let app = TestApp::new(Arc::new(UnavailableClassifier::new(128)));
    let response = app.upload("box.png", &png_bytes()).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_text(response).await.contains("not loaded"));
    assert_eq!(app.state.pipeline.snapshot().total(), 0);
}

#[tokio::test]
async fn test_upload_name_is_reduced_to_final_component() {
    let app = TestApp::cardboard();
    let response = app.upload("../../outside.png", &png_bytes()).await;

    assert_eq!(response.status(), StatusCode::OK);
    let stored = app.stored_uploads();
    assert_eq!(stored.len(), 1);
    assert!(stored[0].ends_with("-outside.png"), "{:?}", stored);
    assert!(!app.path("outside.png").exists());
}

#[tokio::test]
async fn test_stats_page_renders_table_and_chart() {
    let app = TestApp::cardboard();
    app.upload("box.png", &png_bytes()).await;

    let response = app.get("/stats").await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("<td>cardboard</td><td>1</td><td>Recyclable</td>"));
    assert!(html.contains("/static/stats_chart.png?v=1"));
    assert!(app.path("static/stats_chart.png").exists());
}

#[tokio::test]
async fn test_stats_page_with_empty_tally_writes_no_chart() {
    let app = TestApp::cardboard();
    let response = app.get("/stats").await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("No items classified yet."));
    assert!(!app.path("static/stats_chart.png").exists());
}

#[tokio::test]
async fn test_chart_is_served_from_static() {
    let app = TestApp::cardboard();
    app.upload("box.png", &png_bytes()).await;
    app.get("/stats").await;

    let response = app.get("/static/stats_chart.png").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
}

#[tokio::test]
async fn test_download_csv_is_attachment() {
    let app = TestApp::cardboard();
    app.upload("box.png", &png_bytes()).await;

    let response = app.get("/download_csv").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"waste_log.csv\""
    );
    assert_eq!(
        body_text(response).await,
        "Waste Classification Report\nTotal Items Processed: 1\ncardboard: 1\n"
    );
}

#[tokio::test]
async fn test_download_csv_before_any_upload() {
    let app = TestApp::cardboard();
    let response = app.get("/download_csv").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_text(response).await,
        "Waste Classification Report\nTotal Items Processed: 0\n"
    );
}

#[tokio::test]
async fn test_download_pdf() {
    let app = TestApp::cardboard();
    app.upload("box.png", &png_bytes()).await;

    let response = app.get("/download_pdf").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"waste_report.pdf\""
    );

    let pdf = body_text(response).await;
    assert!(pdf.starts_with("%PDF-1.4"));
    assert!(pdf.contains("(cardboard: 1)"));
}

#[tokio::test]
async fn test_api_stats_json() {
    let app = TestApp::cardboard();
    app.upload("box.png", &png_bytes()).await;

    let response = app.get("/api/stats").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["total"], 1);
    assert_eq!(json["categories"][0]["label"], "cardboard");
    assert_eq!(json["categories"][0]["count"], 1);
    assert_eq!(json["categories"][0]["disposition"], "Recyclable");
}

#[tokio::test]
async fn test_health_reports_model_state() {
    let loaded = TestApp::cardboard();
    let json: serde_json::Value =
        serde_json::from_str(&body_text(loaded.get("/health").await).await).unwrap();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["model_loaded"], true);

    let missing = TestApp::new(Arc::new(UnavailableClassifier::new(128)));
    let json: serde_json::Value =
        serde_json::from_str(&body_text(missing.get("/health").await).await).unwrap();
    assert_eq!(json["model_loaded"], false);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_uploads_with_same_name_stay_separate() {
    let app = TestApp::new(Arc::new(ColourClassifier));
    let red = solid_png([220, 20, 20]);
    let blue = solid_png([20, 20, 220]);
    const ROUNDS: usize = 20;

    let mut tasks = Vec::new();
    for _ in 0..ROUNDS {
        for (data, expected) in [(red.clone(), "metal"), (blue.clone(), "paper")] {
            let router = app.router();
            tasks.push(tokio::spawn(async move {
                let response = router
                    .oneshot(multipart_request(&[("file", Some("photo.png"), data.as_slice())]))
                    .await
                    .unwrap();
                (response.status(), body_text(response).await, expected)
            }));
        }
    }

    for task in tasks {
        let (status, html, expected) = task.await.unwrap();
        assert_eq!(status, StatusCode::OK);
        assert!(
            html.contains(&format!("<strong>{}</strong>", expected)),
            "expected {} in result page",
            expected
        );
    }

    let snapshot = app.state.pipeline.snapshot();
    assert_eq!(snapshot.get(ClassLabel::Metal), ROUNDS as u64);
    assert_eq!(snapshot.get(ClassLabel::Paper), ROUNDS as u64);
    assert_eq!(app.stored_uploads().len(), 2 * ROUNDS);
}
