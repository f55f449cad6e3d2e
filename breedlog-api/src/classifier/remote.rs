//! Remote inference endpoint client
//!
//! POSTs the image as multipart field `file` and maps either
//! `{"predictions": [{"class"|"label", "confidence"}, ...]}` or a single
//! `{"label", "confidence"}` object. Labels are normalized to breed codes.

use async_trait::async_trait;
use breedlog_common::breed_code::normalize_breed_name;
use breedlog_common::predictions::{rank, TOP_K};
use breedlog_common::{BreedPrediction, Species};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{BreedClassifier, ClassifierError};

const USER_AGENT: &str = concat!("breedlog/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Ranked { predictions: Vec<InferenceItem> },
    Single(InferenceItem),
}

#[derive(Debug, Deserialize)]
struct InferenceItem {
    #[serde(alias = "class")]
    label: Option<String>,
    #[serde(default)]
    confidence: f64,
}

/// Client for an HTTP inference model
pub struct RemoteClassifier {
    http_client: reqwest::Client,
    model_url: String,
    api_key: Option<String>,
    version: String,
}

impl RemoteClassifier {
    pub fn new(
        model_url: String,
        api_key: Option<String>,
        version: String,
    ) -> Result<Self, ClassifierError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ClassifierError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            model_url,
            api_key,
            version,
        })
    }
}

#[async_trait]
impl BreedClassifier for RemoteClassifier {
    fn model_version(&self) -> &str {
        &self.version
    }

    async fn classify(
        &self,
        image: &[u8],
        species: Species,
    ) -> Result<Vec<BreedPrediction>, ClassifierError> {
        let part = reqwest::multipart::Part::bytes(image.to_vec()).file_name("upload.jpg");
        let form = reqwest::multipart::Form::new().part("file", part);

        let mut request = self.http_client.post(&self.model_url).multipart(form);
        if let Some(key) = &self.api_key {
            request = request.query(&[("api_key", key.as_str())]);
        }

        debug!(species = %species, bytes = image.len(), "Querying inference endpoint");

        let response = request
            .send()
            .await
            .map_err(|e| ClassifierError::NetworkError(e.to_string()))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(ClassifierError::ApiError(status.as_u16()));
        }

        let body: InferenceResponse = response
            .json()
            .await
            .map_err(|e| ClassifierError::ParseError(e.to_string()))?;

        let mut ranked = rank(map_response(body));
        if ranked.is_empty() {
            return Err(ClassifierError::NoPredictions);
        }
        ranked.truncate(TOP_K);
        Ok(ranked)
    }
}

fn map_response(body: InferenceResponse) -> Vec<BreedPrediction> {
    let items = match body {
        InferenceResponse::Ranked { predictions } => predictions,
        InferenceResponse::Single(item) => vec![item],
    };
    items
        .into_iter()
        .filter_map(|item| {
            let code = normalize_breed_name(item.label.as_deref()?);
            Some(BreedPrediction::new(code, item.confidence))
        })
        .collect()
}
