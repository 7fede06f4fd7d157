use crate::error::AssetError;
use crate::gltf_import::load_model;
use duckview_scene::Node;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread::JoinHandle;

/// A loaded model: the root of its node hierarchy and where it came from.
#[derive(Debug, Clone)]
pub struct Model {
    pub source: PathBuf,
    pub root: Node,
}

impl Model {
    pub fn mesh_count(&self) -> usize {
        self.root.mesh_count()
    }

    pub fn into_root(self) -> Node {
        self.root
    }
}

/// Result of one load request, delivered exactly once.
pub type LoadOutcome = Result<Model, AssetError>;

/// Import `path` on a worker thread and hand the outcome to `on_complete`
/// from that thread.
pub fn spawn_load<F>(path: impl Into<PathBuf>, on_complete: F) -> std::io::Result<JoinHandle<()>>
where
    F: FnOnce(LoadOutcome) + Send + 'static,
{
    let path = path.into();
    std::thread::Builder::new()
        .name("model-loader".into())
        .spawn(move || {
            let outcome = load_model(&path);
            match &outcome {
                Ok(model) => tracing::info!(
                    path = %path.display(),
                    meshes = model.mesh_count(),
                    "model loaded"
                ),
                Err(e) => tracing::warn!(path = %path.display(), "model load failed: {e}"),
            }
            on_complete(outcome);
        })
}

/// A load running in the background, polled from the owning thread.
#[derive(Debug)]
pub struct PendingLoad {
    rx: mpsc::Receiver<LoadOutcome>,
}

impl PendingLoad {
    /// The outcome if the worker has finished. A worker that died without
    /// sending reports [`AssetError::WorkerLost`].
    pub fn try_take(&self) -> Option<LoadOutcome> {
        match self.rx.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => Some(Err(AssetError::WorkerLost)),
        }
    }

    /// Block until the worker finishes.
    pub fn wait(self) -> LoadOutcome {
        self.rx.recv().unwrap_or(Err(AssetError::WorkerLost))
    }
}

/// [`spawn_load`] with the outcome parked in a channel.
pub fn load_in_background(path: impl Into<PathBuf>) -> Result<PendingLoad, AssetError> {
    let (tx, rx) = mpsc::channel();
    spawn_load(path, move |outcome| {
        // receiver dropped means nobody is waiting any more
        let _ = tx.send(outcome);
    })?;
    Ok(PendingLoad { rx })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gltf_import::tests::write_two_triangle_model;

    #[test]
    fn callback_receives_exactly_one_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_two_triangle_model(dir.path(), false);
        let (tx, rx) = mpsc::channel();
        let handle = spawn_load(path, move |outcome| tx.send(outcome).unwrap()).unwrap();
        handle.join().unwrap();

        let outcome = rx.recv().unwrap();
        assert_eq!(outcome.unwrap().mesh_count(), 2);
        // sender was moved into the callback and dropped with it
        assert!(rx.recv().is_err());
    }

    #[test]
    fn failure_is_delivered_not_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let pending = load_in_background(dir.path().join("missing.glb")).unwrap();
        assert!(matches!(pending.wait(), Err(AssetError::Gltf(_))));
    }

    #[test]
    fn pending_load_polls_until_done() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_two_triangle_model(dir.path(), false);
        let pending = load_in_background(path).unwrap();
        let outcome = loop {
            if let Some(outcome) = pending.try_take() {
                break outcome;
            }
            std::thread::yield_now();
        };
        let model = outcome.unwrap();
        assert_eq!(model.into_root().children.len(), 1);
    }
}
