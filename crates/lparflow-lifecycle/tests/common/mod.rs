use async_trait::async_trait;
use lparflow_cloud::{
    CloudError, CreateInstanceRequest, Health, HealthStatus, Instance, InstanceAction,
    InstanceClient, InstanceHandle, InstanceStatus, UpdateInstanceRequest,
};
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, Once};
use std::time::Duration;
use tokio::time::Instant;

pub const CONTAINER: &str = "cloud-1";

static TRACING: Once = Once::new();

pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}

/// One scripted reaction to a read
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub enum Step {
    /// Snapshot moves to this status / health
    State(&'static str, Option<&'static str>),
    /// Instance disappears; reads answer not-found from now on
    Gone,
    /// This read fails with the given HTTP status
    Fail(u16),
    /// This read hangs for an hour
    Stall,
}

#[derive(Debug, Clone, PartialEq)]
#[allow(dead_code)]
pub enum Call {
    Create { replicants: u32 },
    Get(String),
    Update(String, UpdateInstanceRequest),
    Action(String, InstanceAction),
    Delete(String),
}

impl Call {
    pub fn is_mutating(&self) -> bool {
        !matches!(self, Call::Get(_))
    }
}

struct Entry {
    snapshot: Instance,
    script: VecDeque<Step>,
}

#[derive(Default)]
struct FakeState {
    instances: HashMap<String, Entry>,
    calls: Vec<(Instant, Call)>,
    next_id: u32,
    /// Ids handed out by the next create instead of fresh ones
    create_ids: Option<Vec<String>>,
    /// Script given to every created instance instead of BUILD -> ACTIVE
    create_script: Option<Vec<Step>>,
    /// Script given to an instance after delete instead of DELETING -> gone
    delete_script: Option<Vec<Step>>,
    /// A stop/modify/start resize settles on ACTIVE instead of SHUTOFF
    resize_lands_active: bool,
    /// Power actions and deletes are first seen one read late
    lagging: bool,
    /// Mutations and the status each read observed, in order
    timeline: Vec<String>,
}

/// In-memory [`InstanceClient`] whose instances walk through scripted states
///
/// Each read consumes at most one scripted step; once the script is empty
/// the snapshot stays where it is.
#[derive(Default)]
pub struct FakeClient {
    state: Mutex<FakeState>,
}

#[allow(dead_code)]
impl FakeClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, instance: Instance) -> InstanceHandle {
        let id = instance.instance_id.clone();
        self.insert_as(&id, instance)
    }

    /// Stores `instance` under a key that may differ from its own id
    pub fn insert_as(&self, key: &str, instance: Instance) -> InstanceHandle {
        let mut state = self.state.lock().unwrap();
        state.instances.insert(
            key.to_string(),
            Entry {
                snapshot: instance,
                script: VecDeque::new(),
            },
        );
        InstanceHandle::new(CONTAINER, key)
    }

    pub fn push_steps(&self, id: &str, steps: Vec<Step>) {
        let mut state = self.state.lock().unwrap();
        if let Some(entry) = state.instances.get_mut(id) {
            entry.script.extend(steps);
        }
    }

    pub fn set_create_ids(&self, ids: &[&str]) {
        self.state.lock().unwrap().create_ids = Some(ids.iter().map(|s| s.to_string()).collect());
    }

    pub fn set_create_script(&self, steps: Vec<Step>) {
        self.state.lock().unwrap().create_script = Some(steps);
    }

    pub fn set_delete_script(&self, steps: Vec<Step>) {
        self.state.lock().unwrap().delete_script = Some(steps);
    }

    pub fn set_resize_lands_active(&self) {
        self.state.lock().unwrap().resize_lands_active = true;
    }

    /// The first read after a power action or delete still shows the
    /// state from before the request
    pub fn set_lagging(&self) {
        self.state.lock().unwrap().lagging = true;
    }

    /// Entries such as `read SHUTOFF`, `update` or `action start`
    pub fn timeline(&self) -> Vec<String> {
        self.state.lock().unwrap().timeline.clone()
    }

    /// Status seen by the last read before the `n`th entry named `event`
    pub fn read_before(&self, event: &str, n: usize) -> Option<String> {
        let timeline = self.timeline();
        let at = timeline
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.as_str() == event)
            .nth(n)?
            .0;
        timeline[..at]
            .iter()
            .rev()
            .find_map(|entry| entry.strip_prefix("read "))
            .map(str::to_string)
    }

    pub fn calls(&self) -> Vec<Call> {
        let state = self.state.lock().unwrap();
        state.calls.iter().map(|(_, call)| call.clone()).collect()
    }

    pub fn mutating_calls(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutating).collect()
    }

    /// Times at which reads were issued
    pub fn get_times(&self) -> Vec<Instant> {
        let state = self.state.lock().unwrap();
        state
            .calls
            .iter()
            .filter(|(_, call)| matches!(call, Call::Get(_)))
            .map(|(at, _)| *at)
            .collect()
    }

    pub fn get_count(&self) -> usize {
        self.get_times().len()
    }

    pub fn snapshot(&self, id: &str) -> Option<Instance> {
        let state = self.state.lock().unwrap();
        state.instances.get(id).map(|entry| entry.snapshot.clone())
    }

    fn record(state: &mut FakeState, call: Call) {
        let event = match &call {
            Call::Create { .. } => Some("create".to_string()),
            Call::Get(_) => None,
            Call::Update(..) => Some("update".to_string()),
            Call::Action(_, action) => Some(format!("action {action}")),
            Call::Delete(_) => Some("delete".to_string()),
        };
        state.timeline.extend(event);
        state.calls.push((Instant::now(), call));
    }

    fn observe(state: &mut FakeState, seen: &str) {
        state.timeline.push(format!("read {seen}"));
    }
}

/// Repeats the current snapshot once when lagging is on
fn lag_step(lagging: bool, snapshot: &Instance) -> Option<Step> {
    if !lagging {
        return None;
    }
    let status: &'static str = match snapshot.status {
        InstanceStatus::Active => "ACTIVE",
        InstanceStatus::Shutoff => "SHUTOFF",
        InstanceStatus::Build => "BUILD",
        InstanceStatus::Stopping => "STOPPING",
        _ => return None,
    };
    let health = match snapshot.health_status() {
        Some(HealthStatus::Ok) => Some("OK"),
        Some(HealthStatus::Warning) => Some("WARNING"),
        _ => None,
    };
    Some(Step::State(status, health))
}

fn not_found(handle: &InstanceHandle) -> CloudError {
    CloudError::NotFound(handle.to_string())
}

fn apply_state(snapshot: &mut Instance, status: &str, health: Option<&str>) {
    snapshot.status = InstanceStatus::from(status);
    snapshot.health = health.map(|h| Health {
        status: HealthStatus::from(h.to_string()),
    });
}

fn exceeds(value: Option<f64>, ceiling: Option<f64>, current: f64) -> bool {
    match value {
        Some(value) => value > ceiling.unwrap_or(current),
        None => false,
    }
}

#[async_trait]
impl InstanceClient for FakeClient {
    async fn create(
        &self,
        _container_id: &str,
        request: &CreateInstanceRequest,
    ) -> lparflow_cloud::Result<Vec<Instance>> {
        let mut state = self.state.lock().unwrap();
        FakeClient::record(
            &mut state,
            Call::Create {
                replicants: request.replicants,
            },
        );

        let ids = match state.create_ids.take() {
            Some(ids) => ids,
            None => (0..request.replicants)
                .map(|_| {
                    state.next_id += 1;
                    format!("pvm-{}", state.next_id)
                })
                .collect(),
        };
        let script = state.create_script.clone().unwrap_or_else(|| {
            vec![
                Step::State("BUILD", None),
                Step::State("ACTIVE", Some("OK")),
            ]
        });

        let mut created = Vec::new();
        for id in ids {
            let mut snapshot = instance(&id, "BUILD", None, request.memory, request.processors);
            snapshot.name = request.name.clone();
            snapshot.processor_type = Some(request.processor_type);
            snapshot.max_memory = Some(request.memory * 2.0);
            snapshot.max_processors = Some(request.processors * 2.0);
            state.instances.insert(
                id.clone(),
                Entry {
                    snapshot: snapshot.clone(),
                    script: script.clone().into(),
                },
            );
            created.push(snapshot);
        }
        Ok(created)
    }

    async fn get(&self, handle: &InstanceHandle) -> lparflow_cloud::Result<Instance> {
        let step = {
            let mut state = self.state.lock().unwrap();
            FakeClient::record(&mut state, Call::Get(handle.instance_id.clone()));
            if !state.instances.contains_key(&handle.instance_id) {
                FakeClient::observe(&mut state, "gone");
                return Err(not_found(handle));
            }
            let Some(entry) = state.instances.get_mut(&handle.instance_id) else {
                return Err(not_found(handle));
            };
            let step = entry.script.pop_front();
            match &step {
                Some(Step::State(status, health)) => {
                    apply_state(&mut entry.snapshot, status, *health);
                }
                Some(Step::Gone) => {
                    state.instances.remove(&handle.instance_id);
                    FakeClient::observe(&mut state, "gone");
                    return Err(not_found(handle));
                }
                Some(Step::Fail(code)) => {
                    let code = *code;
                    FakeClient::observe(&mut state, "failed");
                    return Err(CloudError::with_status(code, "injected failure"));
                }
                Some(Step::Stall) | None => {}
            }
            step
        };

        if matches!(step, Some(Step::Stall)) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }

        let mut state = self.state.lock().unwrap();
        let snapshot = state
            .instances
            .get(&handle.instance_id)
            .map(|entry| entry.snapshot.clone());
        match snapshot {
            Some(snapshot) => {
                FakeClient::observe(&mut state, &snapshot.status.to_string());
                Ok(snapshot)
            }
            None => {
                FakeClient::observe(&mut state, "gone");
                Err(not_found(handle))
            }
        }
    }

    async fn update(
        &self,
        handle: &InstanceHandle,
        request: &UpdateInstanceRequest,
    ) -> lparflow_cloud::Result<Instance> {
        let mut state = self.state.lock().unwrap();
        FakeClient::record(
            &mut state,
            Call::Update(handle.instance_id.clone(), request.clone()),
        );
        let lands_active = state.resize_lands_active;
        let Some(entry) = state.instances.get_mut(&handle.instance_id) else {
            return Err(not_found(handle));
        };

        let snapshot = &mut entry.snapshot;
        let shutoff = snapshot.status == InstanceStatus::Shutoff;
        let over_ceiling = exceeds(request.memory, snapshot.max_memory, snapshot.memory)
            || exceeds(request.processors, snapshot.max_processors, snapshot.processors);
        let retyped = request
            .processor_type
            .is_some_and(|requested| snapshot.processor_type != Some(requested));
        if !shutoff && (over_ceiling || retyped) {
            return Err(CloudError::with_status(
                409,
                "change requires the instance to be powered off",
            ));
        }

        if let Some(name) = &request.name {
            snapshot.name = name.clone();
        }
        if let Some(processor_type) = request.processor_type {
            snapshot.processor_type = Some(processor_type);
        }
        if let Some(memory) = request.memory {
            snapshot.memory = memory;
            snapshot.max_memory = Some(snapshot.max_memory.unwrap_or(memory).max(memory));
        }
        if let Some(processors) = request.processors {
            snapshot.processors = processors;
            snapshot.max_processors = Some(
                snapshot
                    .max_processors
                    .unwrap_or(processors)
                    .max(processors),
            );
        }

        if shutoff && request.touches_capacity() {
            let settled = if lands_active {
                Step::State("ACTIVE", Some("OK"))
            } else {
                Step::State("SHUTOFF", Some("OK"))
            };
            entry.script.extend([
                Step::State("RESIZE", None),
                Step::State("VERIFY_RESIZE", None),
                settled,
            ]);
        }
        Ok(entry.snapshot.clone())
    }

    async fn action(
        &self,
        handle: &InstanceHandle,
        action: InstanceAction,
    ) -> lparflow_cloud::Result<()> {
        let mut state = self.state.lock().unwrap();
        FakeClient::record(&mut state, Call::Action(handle.instance_id.clone(), action));
        let lagging = state.lagging;
        let Some(entry) = state.instances.get_mut(&handle.instance_id) else {
            return Err(not_found(handle));
        };
        let lag = lag_step(lagging, &entry.snapshot);
        let steps = match action {
            InstanceAction::Start => [
                Step::State("BUILD", None),
                Step::State("ACTIVE", Some("OK")),
            ],
            InstanceAction::Stop | InstanceAction::ImmediateShutdown => [
                Step::State("STOPPING", None),
                Step::State("SHUTOFF", Some("OK")),
            ],
            InstanceAction::SoftReboot | InstanceAction::HardReboot => [
                Step::State("BUILD", None),
                Step::State("ACTIVE", Some("OK")),
            ],
        };
        entry.script.extend(lag.into_iter().chain(steps));
        Ok(())
    }

    async fn delete(&self, handle: &InstanceHandle) -> lparflow_cloud::Result<()> {
        let mut state = self.state.lock().unwrap();
        FakeClient::record(&mut state, Call::Delete(handle.instance_id.clone()));
        let script = state
            .delete_script
            .clone()
            .unwrap_or_else(|| vec![Step::State("DELETING", None), Step::Gone]);
        let lagging = state.lagging;
        let Some(entry) = state.instances.get_mut(&handle.instance_id) else {
            return Err(not_found(handle));
        };
        let lag = lag_step(lagging, &entry.snapshot);
        entry.script.extend(lag.into_iter().chain(script));
        Ok(())
    }
}

/// Snapshot with the given state and no capacity ceilings
pub fn instance(
    id: &str,
    status: &str,
    health: Option<&str>,
    memory: f64,
    processors: f64,
) -> Instance {
    let mut snapshot = Instance {
        instance_id: id.to_string(),
        name: format!("lpar-{id}"),
        image_id: Some("img-7300".to_string()),
        status: InstanceStatus::Build,
        health: None,
        processor_type: None,
        system_type: None,
        memory,
        processors,
        min_memory: None,
        max_memory: None,
        min_processors: None,
        max_processors: None,
        migratable: None,
        progress: None,
        pin_policy: None,
        addresses: Vec::new(),
        network_ids: vec!["net-1".to_string()],
        volume_ids: Vec::new(),
        created_at: None,
    };
    apply_state(&mut snapshot, status, health);
    snapshot
}
