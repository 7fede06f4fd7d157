use std::path::PathBuf;

/// Errors from model loading.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("glTF import error: {0}")]
    Gltf(#[from] gltf::Error),
    #[error("{0} has no scenes")]
    NoScene(PathBuf),
    #[error("{0} contains no triangle meshes")]
    EmptyModel(PathBuf),
    #[error("loader thread exited without a result")]
    WorkerLost,
}
