// loader.rs - serial background queue for scene/model loading
//
// Requests go in over one channel, results come back over another and are
// polled from the UI thread with `try_recv`. The worker remembers the last
// identity it started, so a reload for the same variant is dropped instead of
// queued behind the in-flight one.

use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::error::LoadError;
use crate::model::ModelIdentity;
use crate::scene::{Node, Scene};

/// The asset service. Runs on the loader thread only.
pub trait ModelSource: Send + 'static {
    type Model: Send + Sync + 'static;

    /// Scene template holding at least `camera`, `model` and `model-focus`.
    fn load_scene(&mut self) -> Result<Scene<Self::Model>, LoadError>;

    fn load_model(&mut self, identity: &ModelIdentity) -> Result<Node<Self::Model>, LoadError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadRequest {
    Initial(ModelIdentity),
    Reload(ModelIdentity),
    Forget,
}

#[derive(Debug)]
pub enum LoadOutcome<M> {
    SceneReady {
        identity: ModelIdentity,
        scene: Scene<M>,
        model: Node<M>,
    },
    ModelReady {
        identity: ModelIdentity,
        model: Node<M>,
    },
    Failed {
        identity: ModelIdentity,
        error: LoadError,
    },
}

pub struct ModelLoader<M> {
    requests: Option<Sender<LoadRequest>>,
    results: Receiver<LoadOutcome<M>>,
    worker: Option<JoinHandle<()>>,
}

impl<M: Send + Sync + 'static> ModelLoader<M> {
    pub fn spawn<S: ModelSource<Model = M>>(source: S) -> Self {
        let (request_tx, request_rx) = channel();
        let (result_tx, result_rx) = channel();
        let worker = thread::spawn(move || run_worker(source, request_rx, result_tx));

        Self {
            requests: Some(request_tx),
            results: result_rx,
            worker: Some(worker),
        }
    }

    /// Loads the scene template together with the first model.
    pub fn request_initial(&self, identity: ModelIdentity) -> Result<(), LoadError> {
        self.send(LoadRequest::Initial(identity))
    }

    pub fn request_reload(&self, identity: ModelIdentity) -> Result<(), LoadError> {
        self.send(LoadRequest::Reload(identity))
    }

    /// The displayed model was lost on the UI side; the next reload of the
    /// same identity must load again.
    pub fn forget_current(&self) -> Result<(), LoadError> {
        self.send(LoadRequest::Forget)
    }

    fn send(&self, request: LoadRequest) -> Result<(), LoadError> {
        self.requests
            .as_ref()
            .ok_or(LoadError::Disconnected)?
            .send(request)
            .map_err(|_| LoadError::Disconnected)
    }

    /// Non-blocking; call once per frame.
    pub fn try_recv(&self) -> Result<Option<LoadOutcome<M>>, LoadError> {
        match self.results.try_recv() {
            Ok(outcome) => Ok(Some(outcome)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(LoadError::Disconnected),
        }
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<LoadOutcome<M>>, LoadError> {
        match self.results.recv_timeout(timeout) {
            Ok(outcome) => Ok(Some(outcome)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(LoadError::Disconnected),
        }
    }
}

impl<M> Drop for ModelLoader<M> {
    fn drop(&mut self) {
        // closing the request channel ends the worker loop
        self.requests.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("model loader thread panicked");
            }
        }
    }
}

fn run_worker<S: ModelSource>(
    mut source: S,
    requests: Receiver<LoadRequest>,
    results: Sender<LoadOutcome<S::Model>>,
) {
    let mut current: Option<ModelIdentity> = None;

    for request in requests {
        let outcome = match request {
            LoadRequest::Initial(identity) => {
                current = Some(identity);
                log::info!("loading scene with model {identity}");
                let loaded = source
                    .load_scene()
                    .and_then(|scene| Ok((scene, source.load_model(&identity)?)));
                match loaded {
                    Ok((scene, model)) => LoadOutcome::SceneReady {
                        identity,
                        scene,
                        model,
                    },
                    Err(error) => LoadOutcome::Failed { identity, error },
                }
            }
            LoadRequest::Forget => {
                current = None;
                continue;
            }
            LoadRequest::Reload(identity) => {
                if current == Some(identity) {
                    log::debug!("model {identity} already loaded, skipping reload");
                    continue;
                }
                current = Some(identity);
                log::info!("reloading model {identity}");
                match source.load_model(&identity) {
                    Ok(model) => LoadOutcome::ModelReady { identity, model },
                    Err(error) => LoadOutcome::Failed { identity, error },
                }
            }
        };

        if let LoadOutcome::Failed { identity, error } = &outcome {
            log::error!("loading model {identity} failed: {error}");
            current = None;
        }

        if results.send(outcome).is_err() {
            log::debug!("screen went away, stopping model loader");
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Gender, UserProfile};
    use crate::scene::{Transform, CAMERA_NODE, FOCUS_NODE, MODEL_NODE};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const WAIT: Duration = Duration::from_secs(5);

    struct FakeSource {
        model_loads: Arc<AtomicUsize>,
        fail_keys: Vec<String>,
    }

    impl ModelSource for FakeSource {
        type Model = String;

        fn load_scene(&mut self) -> Result<Scene<String>, LoadError> {
            Ok(Scene::new(vec![
                Node::empty(CAMERA_NODE, Transform::default()),
                Node::empty(MODEL_NODE, Transform::default()),
                Node::empty(FOCUS_NODE, Transform::default()),
            ]))
        }

        fn load_model(&mut self, identity: &ModelIdentity) -> Result<Node<String>, LoadError> {
            self.model_loads.fetch_add(1, Ordering::SeqCst);
            let key = identity.key();
            if self.fail_keys.contains(&key) {
                return Err(LoadError::AssetNotFound(key));
            }
            Ok(Node::with_content("avatar", Transform::default(), Arc::new(key)))
        }
    }

    fn identity(gender: Gender, weight: f32) -> ModelIdentity {
        ModelIdentity::for_profile(&UserProfile {
            gender,
            height_cm: Some(175.0),
            weight_kg: Some(weight),
            body_fat_percentage: Some(15.0),
        })
    }

    fn loader(fail_keys: Vec<String>) -> (ModelLoader<String>, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let source = FakeSource {
            model_loads: count.clone(),
            fail_keys,
        };
        (ModelLoader::spawn(source), count)
    }

    #[test]
    fn initial_request_delivers_scene_and_model() {
        let (loader, _) = loader(Vec::new());
        let id = identity(Gender::Male, 70.0);
        loader.request_initial(id).expect("send");

        match loader.recv_timeout(WAIT).expect("connected") {
            Some(LoadOutcome::SceneReady { identity, scene, model }) => {
                assert_eq!(identity, id);
                assert!(scene.bind().is_ok());
                assert_eq!(model.content.as_deref(), Some(&id.key()));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn redundant_reload_is_skipped_on_the_worker() {
        let (loader, loads) = loader(Vec::new());
        let id = identity(Gender::Male, 70.0);
        let other = identity(Gender::Female, 70.0);

        loader.request_initial(id).expect("send");
        loader.request_reload(id).expect("send");
        loader.request_reload(other).expect("send");

        assert!(matches!(
            loader.recv_timeout(WAIT),
            Ok(Some(LoadOutcome::SceneReady { .. }))
        ));
        match loader.recv_timeout(WAIT).expect("connected") {
            Some(LoadOutcome::ModelReady { identity, .. }) => assert_eq!(identity, other),
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn forgotten_model_loads_again() {
        let (loader, loads) = loader(Vec::new());
        let id = identity(Gender::Male, 70.0);

        loader.request_reload(id).expect("send");
        loader.forget_current().expect("send");
        loader.request_reload(id).expect("send");

        for _ in 0..2 {
            match loader.recv_timeout(WAIT).expect("connected") {
                Some(LoadOutcome::ModelReady { identity, .. }) => assert_eq!(identity, id),
                other => panic!("unexpected outcome {other:?}"),
            }
        }
        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn failure_is_reported_and_allows_retry() {
        let bad = identity(Gender::Female, 50.0);
        let (loader, loads) = loader(vec![bad.key()]);

        loader.request_reload(bad).expect("send");
        loader.request_reload(bad).expect("send");

        for _ in 0..2 {
            match loader.recv_timeout(WAIT).expect("connected") {
                Some(LoadOutcome::Failed { identity, error }) => {
                    assert_eq!(identity, bad);
                    assert!(matches!(error, LoadError::AssetNotFound(_)));
                }
                other => panic!("unexpected outcome {other:?}"),
            }
        }
        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn nothing_pending_reads_as_none() {
        let (loader, _) = loader(Vec::new());
        assert!(matches!(loader.try_recv(), Ok(None)));
    }
}
