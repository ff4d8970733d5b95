use std::path::Path;

use tensorflow::{
    Graph, ImportGraphDefOptions, Operation, Session, SessionOptions, SessionRunArgs, Status,
    Tensor,
};

use super::{Classifier, InferenceError, LoadError};
use crate::preprocess::NormalizedTensor;

const INPUT_OPERATION: &str = "x";
const OUTPUT_OPERATION: &str = "Identity";

impl From<Status> for InferenceError {
    fn from(status: Status) -> Self {
        InferenceError::Backend(status.to_string())
    }
}

/// Keras classifier exported as a frozen TensorFlow graph.
pub struct FrozenGraphModel {
    session: Session,
    graph: Graph,
}

impl FrozenGraphModel {
    pub fn load(model_path: &Path) -> Result<Self, LoadError> {
        let model_bytes = std::fs::read(model_path)?;

        let mut graph = Graph::new();
        graph
            .import_graph_def(&model_bytes, &ImportGraphDefOptions::new())
            .map_err(|status| LoadError::Graph(status.to_string()))?;

        for name in [INPUT_OPERATION, OUTPUT_OPERATION] {
            if graph.operation_by_name(name).ok().flatten().is_none() {
                return Err(LoadError::MissingOperation(name.to_string()));
            }
        }

        let session = Session::new(&SessionOptions::new(), &graph)
            .map_err(|status| LoadError::Graph(status.to_string()))?;

        Ok(FrozenGraphModel { session, graph })
    }

    fn operation(&self, name: &str) -> Result<Operation, InferenceError> {
        self.graph
            .operation_by_name(name)?
            .ok_or_else(|| InferenceError::MissingOperation(name.to_string()))
    }
}

impl Classifier for FrozenGraphModel {
    fn classify(&self, input: &NormalizedTensor) -> Result<Vec<f32>, InferenceError> {
        let values = input.as_slice().ok_or(InferenceError::NonContiguousInput)?;
        let dims: Vec<u64> = input.shape().iter().map(|&d| d as u64).collect();
        let input_tensor = Tensor::<f32>::new(&dims).with_values(values)?;

        let input_operation = self.operation(INPUT_OPERATION)?;
        let output_operation = self.operation(OUTPUT_OPERATION)?;

        let mut args = SessionRunArgs::new();
        args.add_feed(&input_operation, 0, &input_tensor);
        let output_token = args.request_fetch(&output_operation, 0);
        self.session.run(&mut args)?;

        let output_tensor: Tensor<f32> = args.fetch(output_token)?;
        Ok(output_tensor.to_vec())
    }
}
