use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::multipart::{Form, Part};
use reqwest::{Response, Url};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, info};
use crate::config::LeonardoConfig;
use crate::generator::provider::{GenerationError, GenerationProvider, ImageRequest, VideoRequest};

const PROVIDER: &str = "leonardo";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InitImageEnvelope {
    upload_init_image: InitImageSlot,
}

#[derive(Debug, Deserialize)]
struct InitImageSlot {
    id: String,
    /// JSON-encoded map of presigned form fields
    fields: String,
    url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerationEnvelope {
    sd_generation_job: SdGenerationJob,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SdGenerationJob {
    generation_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MotionEnvelope {
    motion_generation_job: MotionGenerationJob,
}

#[derive(Debug, Deserialize)]
struct MotionGenerationJob {
    id: String,
}

#[derive(Debug, Deserialize)]
struct PollEnvelope {
    generations_by_pk: Option<GenerationRecord>,
}

#[derive(Debug, Deserialize)]
struct GenerationRecord {
    status: String,
    #[serde(default)]
    generated_images: Vec<GeneratedImage>,
}

#[derive(Debug, Deserialize)]
struct GeneratedImage {
    url: Option<String>,
    #[serde(rename = "motionMP4URL")]
    motion_mp4_url: Option<String>,
}

impl GenerationRecord {
    /// First generated asset, only once the provider says the job is done
    fn first_complete(&self) -> Option<&GeneratedImage> {
        if self.status != "COMPLETE" {
            return None;
        }
        self.generated_images.first()
    }
}

/// Leonardo.ai REST adapter
pub struct LeonardoProvider {
    client: reqwest::Client,
    config: LeonardoConfig,
}

impl LeonardoProvider {
    pub fn new(client: reqwest::Client, config: LeonardoConfig) -> Self {
        Self { client, config }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// `<base>/generations/<job_id>` with the id kept as one encoded segment
    fn generation_url(&self, job_id: &str) -> Result<Url, GenerationError> {
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| GenerationError::upstream(PROVIDER, format!("invalid base URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| GenerationError::upstream(PROVIDER, "base URL cannot carry a path"))?
            .pop_if_empty()
            .push("generations")
            .push(job_id);
        Ok(url)
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<Response, reqwest::Error> {
        self.client
            .post(self.url(path))
            .bearer_auth(&self.config.api_key)
            .header(ACCEPT, "application/json")
            .json(body)
            .send()
            .await
    }

    async fn fetch_generation(&self, job_id: &str) -> Result<Option<GenerationRecord>, GenerationError> {
        let response = self
            .client
            .get(self.generation_url(job_id)?)
            .bearer_auth(&self.config.api_key)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| GenerationError::upstream(PROVIDER, e))?;

        let envelope: PollEnvelope = read_json(response).await?;
        Ok(envelope.generations_by_pk)
    }
}

async fn ensure_success(response: Response) -> Result<Response, String> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(format!("HTTP {}: {}", status, body))
}

async fn read_json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, GenerationError> {
    let response = ensure_success(response)
        .await
        .map_err(|detail| GenerationError::upstream(PROVIDER, detail))?;

    response
        .json()
        .await
        .map_err(|e| GenerationError::upstream(PROVIDER, format!("unexpected response: {e}")))
}

fn upload_error(e: impl std::fmt::Display) -> GenerationError {
    GenerationError::Upload(e.to_string())
}

fn field_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        other => other.to_string(),
    }
}

#[async_trait]
impl GenerationProvider for LeonardoProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn upload_seed_image(&self, bytes: Vec<u8>, filename: &str) -> Result<String, GenerationError> {
        // 1. ask for a presigned upload slot
        let response = self
            .post_json("init-image", &json!({ "fileName": filename }))
            .await
            .map_err(upload_error)?;
        let response = ensure_success(response).await.map_err(upload_error)?;
        let envelope: InitImageEnvelope = response.json().await.map_err(upload_error)?;
        let slot = envelope.upload_init_image;

        let fields: Map<String, Value> = serde_json::from_str(&slot.fields).map_err(upload_error)?;

        // 2. push the bytes to the slot, presigned fields first
        let mut form = Form::new();
        for (key, value) in fields {
            form = form.text(key, field_text(value));
        }
        form = form.part("file", Part::bytes(bytes).file_name(filename.to_string()));

        let response = self
            .client
            .post(&slot.url)
            .multipart(form)
            .send()
            .await
            .map_err(upload_error)?;
        ensure_success(response).await.map_err(upload_error)?;

        info!(seed_image_id = %slot.id, "seed image uploaded");
        Ok(slot.id)
    }

    async fn submit_image(&self, request: &ImageRequest) -> Result<String, GenerationError> {
        let mut payload = json!({
            "prompt": request.prompt,
            "modelId": request.model_id,
            "public": request.is_public,
            "sd_version": "v2",
        });
        if let Some(seed) = &request.seed_image_id {
            payload["init_image_id"] = json!(seed);
        }
        debug!(model_id = %request.model_id, img2img = request.seed_image_id.is_some(), "submitting image generation");

        let response = self
            .post_json("generations", &payload)
            .await
            .map_err(|e| GenerationError::upstream(PROVIDER, e))?;
        let envelope: GenerationEnvelope = read_json(response).await?;

        Ok(envelope.sd_generation_job.generation_id)
    }

    async fn poll_image(&self, job_id: &str) -> Result<Option<String>, GenerationError> {
        let record = self.fetch_generation(job_id).await?;
        Ok(record
            .as_ref()
            .and_then(GenerationRecord::first_complete)
            .and_then(|image| image.url.clone()))
    }

    async fn submit_video(&self, request: &VideoRequest) -> Result<String, GenerationError> {
        let payload = json!({
            "imageId": request.image_id,
            "prompt": request.prompt,
            "isPublic": request.is_public,
            "resolution": request.resolution,
            "frameInterpolation": request.frame_interpolation,
            "promptEnhance": request.prompt_enhance,
            "imageType": "UPLOADED",
        });
        debug!(image_id = %request.image_id, resolution = %request.resolution, "submitting image-to-video");

        let response = self
            .post_json("generations-image-to-video", &payload)
            .await
            .map_err(|e| GenerationError::upstream(PROVIDER, e))?;
        let envelope: MotionEnvelope = read_json(response).await?;

        Ok(envelope.motion_generation_job.id)
    }

    async fn poll_video(&self, job_id: &str) -> Result<Option<String>, GenerationError> {
        let record = self.fetch_generation(job_id).await?;
        Ok(record
            .as_ref()
            .and_then(GenerationRecord::first_complete)
            .and_then(|image| image.motion_mp4_url.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use axum::extract::{Multipart, Path, State};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use tokio::net::TcpListener;

    #[derive(Default)]
    struct Recorded {
        bodies: Vec<(String, Value)>,
        upload_fields: Vec<String>,
        auth: Vec<String>,
    }

    type Shared = Arc<Mutex<Recorded>>;

    async fn spawn_fake_leonardo(fail_generations: bool) -> (String, Shared) {
        let recorded: Shared = Arc::default();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let upload_url = format!("{base}/s3-upload");

        let app = Router::new()
            .route(
                "/init-image",
                post(move |State(rec): State<Shared>, headers: HeaderMap, Json(body): Json<Value>| {
                    let upload_url = upload_url.clone();
                    async move {
                        let mut rec = rec.lock().unwrap();
                        rec.bodies.push(("init-image".into(), body));
                        if let Some(auth) = headers.get("authorization") {
                            rec.auth.push(auth.to_str().unwrap().to_string());
                        }
                        Json(json!({
                            "uploadInitImage": {
                                "id": "seed-42",
                                "fields": "{\"key\":\"uploads/seed-42.jpg\",\"policy\":\"abc\"}",
                                "url": upload_url,
                            }
                        }))
                    }
                }),
            )
            .route(
                "/s3-upload",
                post(|State(rec): State<Shared>, mut multipart: Multipart| async move {
                    let mut names = Vec::new();
                    while let Some(field) = multipart.next_field().await.unwrap() {
                        names.push(field.name().unwrap_or_default().to_string());
                        let _ = field.bytes().await.unwrap();
                    }
                    rec.lock().unwrap().upload_fields = names;
                    StatusCode::NO_CONTENT
                }),
            )
            .route(
                "/generations",
                post(move |State(rec): State<Shared>, Json(body): Json<Value>| async move {
                    rec.lock().unwrap().bodies.push(("generations".into(), body));
                    if fail_generations {
                        return (StatusCode::BAD_REQUEST, Json(json!({"error": "bad prompt"})));
                    }
                    (StatusCode::OK, Json(json!({"sdGenerationJob": {"generationId": "gen-1"}})))
                }),
            )
            .route(
                "/generations-image-to-video",
                post(|State(rec): State<Shared>, Json(body): Json<Value>| async move {
                    rec.lock().unwrap().bodies.push(("video".into(), body));
                    Json(json!({"motionGenerationJob": {"id": "motion-7"}}))
                }),
            )
            .route(
                "/generations/{id}",
                get(|Path(id): Path<String>| async move {
                    let body = match id.as_str() {
                        "pending" | "nested/../done" => json!({"generations_by_pk": {"status": "PENDING", "generated_images": []}}),
                        "unknown" => json!({"generations_by_pk": null}),
                        "broken" => json!({"unexpected": true, "generations_by_pk": {"status": 3}}),
                        _ => json!({"generations_by_pk": {
                            "status": "COMPLETE",
                            "generated_images": [
                                {"url": "https://cdn/img-1.jpg", "motionMP4URL": "https://cdn/motion-1.mp4"},
                                {"url": "https://cdn/img-2.jpg", "motionMP4URL": null}
                            ]
                        }}),
                    };
                    Json(body)
                }),
            )
            .with_state(recorded.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (base, recorded)
    }

    fn provider(base: &str) -> LeonardoProvider {
        LeonardoProvider::new(
            reqwest::Client::new(),
            LeonardoConfig {
                api_key: "test-key".into(),
                base_url: base.to_string(),
            },
        )
    }

    fn image_request(seed: Option<&str>) -> ImageRequest {
        ImageRequest {
            prompt: "a cat surfing".into(),
            is_public: false,
            model_id: "model-x".into(),
            seed_image_id: seed.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_text_to_image_payload() {
        let (base, recorded) = spawn_fake_leonardo(false).await;
        let id = provider(&base).submit_image(&image_request(None)).await.unwrap();
        assert_eq!(id, "gen-1");

        let rec = recorded.lock().unwrap();
        let (_, body) = rec.bodies.iter().find(|(path, _)| path == "generations").unwrap();
        assert_eq!(body["prompt"], "a cat surfing");
        assert_eq!(body["modelId"], "model-x");
        assert_eq!(body["public"], false);
        assert_eq!(body["sd_version"], "v2");
        assert!(body.get("init_image_id").is_none());
    }

    #[tokio::test]
    async fn test_seeded_image_requests_img2img() {
        let (base, recorded) = spawn_fake_leonardo(false).await;
        provider(&base).submit_image(&image_request(Some("seed-42"))).await.unwrap();

        let rec = recorded.lock().unwrap();
        let (_, body) = rec.bodies.iter().find(|(path, _)| path == "generations").unwrap();
        assert_eq!(body["init_image_id"], "seed-42");
    }

    #[tokio::test]
    async fn test_upload_is_two_step() {
        let (base, recorded) = spawn_fake_leonardo(false).await;
        let id = provider(&base)
            .upload_seed_image(b"jpeg-bytes".to_vec(), "seed.jpg")
            .await
            .unwrap();
        assert_eq!(id, "seed-42");

        let rec = recorded.lock().unwrap();
        let (_, body) = rec.bodies.iter().find(|(path, _)| path == "init-image").unwrap();
        assert_eq!(body["fileName"], "seed.jpg");
        assert_eq!(rec.auth, vec!["Bearer test-key".to_string()]);
        assert_eq!(rec.upload_fields.last().map(String::as_str), Some("file"));
        assert!(rec.upload_fields.contains(&"key".to_string()));
        assert!(rec.upload_fields.contains(&"policy".to_string()));
    }

    #[tokio::test]
    async fn test_upload_fails_when_slot_unavailable() {
        let err = provider("http://127.0.0.1:9")
            .upload_seed_image(b"x".to_vec(), "seed.jpg")
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Upload(_)));
    }

    #[tokio::test]
    async fn test_rejected_generation_is_upstream_error() {
        let (base, _) = spawn_fake_leonardo(true).await;
        let err = provider(&base).submit_image(&image_request(None)).await.unwrap_err();
        match err {
            GenerationError::Upstream { provider, detail } => {
                assert_eq!(provider, "leonardo");
                assert!(detail.contains("400"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_video_payload_defaults() {
        let (base, recorded) = spawn_fake_leonardo(false).await;
        let id = provider(&base).submit_video(&VideoRequest::new("img-9")).await.unwrap();
        assert_eq!(id, "motion-7");

        let rec = recorded.lock().unwrap();
        let (_, body) = rec.bodies.iter().find(|(path, _)| path == "video").unwrap();
        assert_eq!(body["imageId"], "img-9");
        assert_eq!(body["resolution"], "RESOLUTION_480");
        assert_eq!(body["frameInterpolation"], true);
        assert_eq!(body["promptEnhance"], true);
        assert_eq!(body["imageType"], "UPLOADED");
    }

    #[tokio::test]
    async fn test_polling() {
        let (base, _) = spawn_fake_leonardo(false).await;
        let leonardo = provider(&base);

        assert_eq!(leonardo.poll_image("pending").await.unwrap(), None);
        assert_eq!(leonardo.poll_image("unknown").await.unwrap(), None);
        assert_eq!(leonardo.poll_image("done").await.unwrap().as_deref(), Some("https://cdn/img-1.jpg"));
        assert_eq!(leonardo.poll_video("pending").await.unwrap(), None);
        assert_eq!(leonardo.poll_video("done").await.unwrap().as_deref(), Some("https://cdn/motion-1.mp4"));

        assert!(matches!(
            leonardo.poll_image("broken").await,
            Err(GenerationError::Upstream { .. })
        ));
    }

    #[tokio::test]
    async fn test_job_id_is_one_path_segment() {
        let (base, _) = spawn_fake_leonardo(false).await;
        let leonardo = provider(&base);

        let url = leonardo.generation_url("a/b?c#d").unwrap();
        assert_eq!(url.as_str(), format!("{base}/generations/a%2Fb%3Fc%23d"));

        // unencoded, these would resolve to /generations/done and a missing route
        assert_eq!(leonardo.poll_image("nested/../done").await.unwrap(), None);
        assert_eq!(
            leonardo.poll_image("a/b").await.unwrap().as_deref(),
            Some("https://cdn/img-1.jpg")
        );
    }

    #[test]
    fn test_generation_url_keeps_base_path() {
        let leonardo = provider("https://cloud.leonardo.ai/api/rest/v1/");
        let url = leonardo.generation_url("gen-1").unwrap();
        assert_eq!(url.as_str(), "https://cloud.leonardo.ai/api/rest/v1/generations/gen-1");
    }
}
