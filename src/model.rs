use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::preprocess::NormalizedTensor;

#[cfg(feature = "tensorflow")]
mod frozen_graph;

#[cfg(feature = "tensorflow")]
pub use frozen_graph::FrozenGraphModel;

/// File name of the trained plant disease model, looked up next to the executable.
pub const MODEL_FILE_NAME: &str = "trained_plant_disease_model.pb";

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("model file not found at {0}")]
    NotFound(PathBuf),

    #[error("failed to read model file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to import model graph: {0}")]
    Graph(String),

    #[error("operation '{0}' not found in model graph")]
    MissingOperation(String),

    #[error("built without the tensorflow backend")]
    BackendDisabled,
}

#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("{0}")]
    Backend(String),

    #[error("operation '{0}' not found in model graph")]
    MissingOperation(String),

    #[error("input tensor is not contiguous")]
    NonContiguousInput,
}

/// A pre-trained classifier producing one probability per catalog label.
///
/// Implementations are shared read-only between concurrent requests.
pub trait Classifier: Send + Sync {
    fn classify(&self, input: &NormalizedTensor) -> Result<Vec<f32>, InferenceError>;
}

/// The inference engine as seen by request handlers.
///
/// Decided once at startup; an unavailable engine is never reloaded.
#[derive(Clone)]
pub enum Engine {
    Ready(Arc<dyn Classifier>),
    Unavailable,
}

impl Engine {
    pub fn ready(classifier: impl Classifier + 'static) -> Self {
        Engine::Ready(Arc::new(classifier))
    }

    /// Load the model at `path`. Any failure leaves the engine unavailable.
    pub fn load(path: &Path) -> Self {
        match load_classifier(path) {
            Ok(classifier) => {
                info!("Model loaded from {}", path.display());
                Engine::Ready(classifier)
            }
            Err(err) => {
                warn!("Model unavailable: {}", err);
                Engine::Unavailable
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Engine::Ready(_))
    }

    pub fn classifier(&self) -> Option<Arc<dyn Classifier>> {
        match self {
            Engine::Ready(classifier) => Some(Arc::clone(classifier)),
            Engine::Unavailable => None,
        }
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Engine::Ready(_) => f.write_str("Engine::Ready"),
            Engine::Unavailable => f.write_str("Engine::Unavailable"),
        }
    }
}

fn load_classifier(path: &Path) -> Result<Arc<dyn Classifier>, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }

    #[cfg(feature = "tensorflow")]
    let classifier = FrozenGraphModel::load(path).map(|model| Arc::new(model) as Arc<dyn Classifier>);

    #[cfg(not(feature = "tensorflow"))]
    let classifier = Err(LoadError::BackendDisabled);

    classifier
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Uniform;

    impl Classifier for Uniform {
        fn classify(&self, _input: &NormalizedTensor) -> Result<Vec<f32>, InferenceError> {
            Ok(vec![1.0 / 38.0; 38])
        }
    }

    #[test]
    fn test_missing_model_file_is_unavailable() {
        let engine = Engine::load(Path::new("/nonexistent/trained_plant_disease_model.pb"));
        assert!(!engine.is_ready());
        assert!(engine.classifier().is_none());
    }

    #[test]
    fn test_unreadable_model_is_unavailable() {
        let path = std::env::temp_dir().join(format!("leaf_doctor_garbage_{}.pb", std::process::id()));
        std::fs::write(&path, b"definitely not a graph").unwrap();

        let engine = Engine::load(&path);
        std::fs::remove_file(&path).unwrap();

        assert!(!engine.is_ready());
    }

    #[test]
    fn test_ready_engine_hands_out_classifier() {
        let engine = Engine::ready(Uniform);
        assert!(engine.is_ready());
        assert_eq!(format!("{:?}", engine), "Engine::Ready");
        assert!(engine.classifier().is_some());
    }

    #[test]
    fn test_load_error_messages() {
        let err = LoadError::NotFound(PathBuf::from("model.pb"));
        assert_eq!(err.to_string(), "model file not found at model.pb");
        assert_eq!(
            InferenceError::Backend("out of memory".into()).to_string(),
            "out of memory"
        );
    }
}
