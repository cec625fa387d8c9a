// ABOUTME: In-memory container runtime for exercising the promotion machine.
// ABOUTME: Scriptable failure modes: refuse signals, ignore SIGTERM, fail starts.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use glaukos::runtime::{
    ContainerError, ContainerInfo, ContainerOps, ContainerSpec, ContainerState, ImageError,
    ImageOps,
};
use glaukos::types::{ContainerId, ImageRef};

#[derive(Debug, Clone)]
pub struct FakeContainer {
    pub id: ContainerId,
    pub name: String,
    pub state: ContainerState,
    pub labels: HashMap<String, String>,
    pub env: HashMap<String, String>,
}

#[derive(Default)]
struct Inner {
    containers: HashMap<String, FakeContainer>,
    signals: Vec<(String, String)>,
    next_id: u64,
}

/// A runtime whose containers live in a HashMap. Signals behave like the
/// real thing by default: the stop signal moves a container to Exited,
/// SIGKILL always does.
#[derive(Default)]
pub struct FakeRuntime {
    inner: Mutex<Inner>,
    /// Names whose `signal_container` calls fail outright (e.g. a proxy
    /// that refuses to reload).
    refuse_signals: Mutex<HashSet<String>>,
    /// Names that ignore graceful stop signals and keep running.
    ignore_stop: Mutex<HashSet<String>>,
    /// Names whose `start_container` fails.
    fail_start: Mutex<HashSet<String>>,
}

impl FakeRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed a running container.
    pub fn seed_running(&self, name: &str) -> ContainerId {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let id = ContainerId::new(format!("fake-{}", inner.next_id));
        inner.containers.insert(
            name.to_string(),
            FakeContainer {
                id: id.clone(),
                name: name.to_string(),
                state: ContainerState::Running,
                labels: HashMap::new(),
                env: HashMap::new(),
            },
        );
        id
    }

    pub fn refuse_signals_for(&self, name: &str) {
        self.refuse_signals.lock().unwrap().insert(name.to_string());
    }

    pub fn ignore_stop_for(&self, name: &str) {
        self.ignore_stop.lock().unwrap().insert(name.to_string());
    }

    pub fn fail_start_for(&self, name: &str) {
        self.fail_start.lock().unwrap().insert(name.to_string());
    }

    pub fn container(&self, name: &str) -> Option<FakeContainer> {
        self.inner.lock().unwrap().containers.get(name).cloned()
    }

    pub fn state_of(&self, name: &str) -> Option<ContainerState> {
        self.container(name).map(|c| c.state)
    }

    /// Signals delivered so far, as (container name, signal) pairs.
    pub fn signals(&self) -> Vec<(String, String)> {
        self.inner.lock().unwrap().signals.clone()
    }

    fn name_for(&self, id: &ContainerId) -> Option<String> {
        let inner = self.inner.lock().unwrap();
        inner
            .containers
            .values()
            .find(|c| &c.id == id || c.name == id.as_str())
            .map(|c| c.name.clone())
    }
}

#[async_trait]
impl ImageOps for FakeRuntime {
    async fn pull_image(&self, _image: &ImageRef) -> Result<(), ImageError> {
        Ok(())
    }
}

#[async_trait]
impl ContainerOps for FakeRuntime {
    async fn create_container(&self, spec: &ContainerSpec) -> Result<ContainerId, ContainerError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.containers.contains_key(&spec.name) {
            return Err(ContainerError::AlreadyExists(spec.name.clone()));
        }
        inner.next_id += 1;
        let id = ContainerId::new(format!("fake-{}", inner.next_id));
        inner.containers.insert(
            spec.name.clone(),
            FakeContainer {
                id: id.clone(),
                name: spec.name.clone(),
                state: ContainerState::Created,
                labels: spec.labels.clone(),
                env: spec.env.clone(),
            },
        );
        Ok(id)
    }

    async fn start_container(&self, id: &ContainerId) -> Result<(), ContainerError> {
        let name = self
            .name_for(id)
            .ok_or_else(|| ContainerError::NotFound(id.to_string()))?;
        if self.fail_start.lock().unwrap().contains(&name) {
            return Err(ContainerError::Runtime(format!(
                "injected start failure for {name}"
            )));
        }
        let mut inner = self.inner.lock().unwrap();
        let container = inner
            .containers
            .get_mut(&name)
            .ok_or_else(|| ContainerError::NotFound(name.clone()))?;
        container.state = ContainerState::Running;
        Ok(())
    }

    async fn signal_container(
        &self,
        id: &ContainerId,
        signal: &str,
    ) -> Result<(), ContainerError> {
        let name = self
            .name_for(id)
            .ok_or_else(|| ContainerError::NotFound(id.to_string()))?;

        if self.refuse_signals.lock().unwrap().contains(&name) {
            return Err(ContainerError::Runtime(format!(
                "injected signal failure for {name}"
            )));
        }

        let mut inner = self.inner.lock().unwrap();
        inner.signals.push((name.clone(), signal.to_string()));

        let container = inner
            .containers
            .get_mut(&name)
            .ok_or_else(|| ContainerError::NotFound(name.clone()))?;
        if !container.state.is_running() {
            return Err(ContainerError::NotRunning(name.clone()));
        }

        let ignores_stop = signal != "SIGKILL"
            && self
                .ignore_stop
                .lock()
                .unwrap()
                .contains(&name);
        // SIGHUP reloads in place; stop signals exit unless ignored.
        if signal != "SIGHUP" && !ignores_stop {
            container.state = ContainerState::Exited;
        }
        Ok(())
    }

    async fn remove_container(&self, id: &ContainerId, _force: bool) -> Result<(), ContainerError> {
        let name = self
            .name_for(id)
            .ok_or_else(|| ContainerError::NotFound(id.to_string()))?;
        self.inner.lock().unwrap().containers.remove(&name);
        Ok(())
    }

    async fn inspect_container(&self, id: &ContainerId) -> Result<ContainerInfo, ContainerError> {
        let name = self
            .name_for(id)
            .ok_or_else(|| ContainerError::NotFound(id.to_string()))?;
        let inner = self.inner.lock().unwrap();
        let container = inner
            .containers
            .get(&name)
            .ok_or_else(|| ContainerError::NotFound(name.clone()))?;
        Ok(ContainerInfo {
            id: container.id.clone(),
            name: container.name.clone(),
            state: container.state,
            labels: container.labels.clone(),
        })
    }

    async fn find_container(&self, name: &str) -> Result<Option<ContainerInfo>, ContainerError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.containers.get(name).map(|container| ContainerInfo {
            id: container.id.clone(),
            name: container.name.clone(),
            state: container.state,
            labels: container.labels.clone(),
        }))
    }
}
