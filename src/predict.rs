use axum::{
    body::Bytes,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, warn};

use crate::labels;
use crate::model::Classifier;
use crate::preprocess::{self, PreprocessError};
use crate::SharedState;

/// Multipart field carrying the leaf photograph.
pub const IMAGE_FIELD: &str = "image";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnosis {
    pub disease: String,
    pub confidence: String,
    pub remedy: String,
}

#[derive(Error, Debug)]
pub enum PredictError {
    #[error("Machine learning model not loaded or dependencies missing.")]
    ModelUnavailable,

    #[error("No image provided.")]
    NoImage,

    #[error("No image selected.")]
    NoImageSelected,

    #[error("Failed to process image. Make sure it is a valid image format.")]
    UnprocessableImage(#[source] PreprocessError),

    /// Passed to the client verbatim.
    #[error("{0}")]
    Internal(String),
}

impl PredictError {
    pub fn status(&self) -> StatusCode {
        match self {
            PredictError::ModelUnavailable | PredictError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            PredictError::NoImage
            | PredictError::NoImageSelected
            | PredictError::UnprocessableImage(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for PredictError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// POST /predict - diagnose the uploaded leaf image
pub async fn predict(
    State(state): State<SharedState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Diagnosis>, PredictError> {
    let result = handle(state, multipart).await;
    if let Err(err) = &result {
        match err {
            PredictError::UnprocessableImage(source) => warn!("Rejected upload: {}", source),
            other => warn!("Prediction failed ({}): {}", other.status(), other),
        }
    }
    result.map(Json)
}

async fn handle(
    state: SharedState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Diagnosis, PredictError> {
    let classifier = state
        .engine
        .classifier()
        .ok_or(PredictError::ModelUnavailable)?;

    let multipart = multipart.map_err(|rejection| {
        debug!("Request is not a multipart upload: {}", rejection);
        PredictError::NoImage
    })?;

    let image_data = read_image_field(multipart).await?;

    // Decoding and inference are CPU bound; keep them off the async workers.
    tokio::task::spawn_blocking(move || diagnose(classifier.as_ref(), &image_data))
        .await
        .map_err(|err| PredictError::Internal(err.to_string()))?
}

/// Find the `image` file field and read it fully into memory.
///
/// Fields without a file name are plain form values, not uploads.
async fn read_image_field(mut multipart: Multipart) -> Result<Bytes, PredictError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(read_failure)?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let empty_file_name = field.file_name().map(str::is_empty);
        match empty_file_name {
            None => continue,
            Some(true) => return Err(PredictError::NoImageSelected),
            Some(false) => {
                return field
                    .bytes()
                    .await
                    .map_err(read_failure)
            }
        }
    }

    Err(PredictError::NoImage)
}

/// Keeps the parser's detailed message, e.g. an exceeded length limit.
fn read_failure(err: MultipartError) -> PredictError {
    PredictError::Internal(err.body_text())
}

/// Run one image through normalization, classification and label lookup.
pub fn diagnose(classifier: &dyn Classifier, image_data: &[u8]) -> Result<Diagnosis, PredictError> {
    let tensor = preprocess::normalize(image_data).map_err(PredictError::UnprocessableImage)?;

    let probabilities = classifier
        .classify(&tensor)
        .map_err(|err| PredictError::Internal(err.to_string()))?;

    let (index, probability) = argmax(&probabilities)
        .ok_or_else(|| PredictError::Internal("model returned no class scores".to_string()))?;

    let label = labels::label_at(index).ok_or_else(|| {
        PredictError::Internal(format!(
            "model predicted class {} but only {} labels are known",
            index,
            labels::CLASS_COUNT
        ))
    })?;

    let diagnosis = Diagnosis {
        disease: labels::display_name(label),
        confidence: format_confidence(probability),
        remedy: labels::remedy_for(label).to_string(),
    };
    debug!(label, confidence = %diagnosis.confidence, "Prediction");

    Ok(diagnosis)
}

/// Index and value of the highest score. The first maximum wins; NaN never does.
pub fn argmax(scores: &[f32]) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (index, &score) in scores.iter().enumerate() {
        if score.is_nan() {
            continue;
        }
        match best {
            Some((_, current)) if score <= current => {}
            _ => best = Some((index, score)),
        }
    }
    best
}

/// Probability as a percentage with two decimals, e.g. `0.98765` -> `98.77%`.
pub fn format_confidence(probability: f32) -> String {
    format!("{:.2}%", f64::from(probability) * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::InferenceError;
    use crate::preprocess::NormalizedTensor;
    use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};
    use std::io::Cursor;

    struct Fixed(Vec<f32>);

    impl Classifier for Fixed {
        fn classify(&self, input: &NormalizedTensor) -> Result<Vec<f32>, InferenceError> {
            assert_eq!(input.shape(), &[1, 128, 128, 3]);
            Ok(self.0.clone())
        }
    }

    struct Broken;

    impl Classifier for Broken {
        fn classify(&self, _input: &NormalizedTensor) -> Result<Vec<f32>, InferenceError> {
            Err(InferenceError::Backend("session run failed".to_string()))
        }
    }

    fn one_hot(index: usize, probability: f32) -> Vec<f32> {
        let rest = (1.0 - probability) / (labels::CLASS_COUNT - 1) as f32;
        let mut scores = vec![rest; labels::CLASS_COUNT];
        scores[index] = probability;
        scores
    }

    fn leaf_png() -> Vec<u8> {
        let img = RgbImage::from_pixel(96, 64, Rgb([34, 139, 34]));
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut buf, ImageOutputFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_argmax_picks_maximum() {
        assert_eq!(argmax(&[0.1, 0.7, 0.2]), Some((1, 0.7)));
    }

    #[test]
    fn test_argmax_ties_go_to_lowest_index() {
        assert_eq!(argmax(&[0.2, 0.4, 0.4, 0.0]), Some((1, 0.4)));
    }

    #[test]
    fn test_argmax_skips_nan() {
        assert_eq!(argmax(&[f32::NAN, 0.3, 0.6]), Some((2, 0.6)));
        assert_eq!(argmax(&[f32::NAN]), None);
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn test_format_confidence() {
        assert_eq!(format_confidence(1.0), "100.00%");
        assert_eq!(format_confidence(0.5), "50.00%");
        assert_eq!(format_confidence(0.0), "0.00%");
    }

    #[test]
    fn test_diagnose_success() {
        let diagnosis = diagnose(&Fixed(one_hot(30, 0.875)), &leaf_png()).unwrap();
        assert_eq!(diagnosis.disease, "Tomato - Late blight");
        assert_eq!(diagnosis.confidence, "87.50%");
        assert_eq!(
            diagnosis.remedy,
            "Apply appropriate preventative fungicides. Remove and destroy infected materials."
        );
    }

    #[test]
    fn test_diagnose_invalid_image() {
        let err = diagnose(&Fixed(one_hot(0, 0.9)), b"GIF? no.").unwrap_err();
        assert!(matches!(err, PredictError::UnprocessableImage(_)));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_diagnose_backend_failure_is_internal() {
        let err = diagnose(&Broken, &leaf_png()).unwrap_err();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "session run failed");
    }

    #[test]
    fn test_diagnose_out_of_catalog_index() {
        let mut scores = vec![0.0; 40];
        scores[39] = 1.0;
        let err = diagnose(&Fixed(scores), &leaf_png()).unwrap_err();
        assert!(matches!(err, PredictError::Internal(_)));
    }

    #[test]
    fn test_diagnose_empty_output() {
        let err = diagnose(&Fixed(Vec::new()), &leaf_png()).unwrap_err();
        assert!(matches!(err, PredictError::Internal(_)));
    }

    #[test]
    fn test_error_statuses() {
        assert_eq!(
            PredictError::ModelUnavailable.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(PredictError::NoImage.status(), StatusCode::BAD_REQUEST);
        assert_eq!(PredictError::NoImageSelected.status(), StatusCode::BAD_REQUEST);
    }
}
