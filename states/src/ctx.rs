use std::any::{TypeId, type_name};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use flume::{Receiver, Sender};
use log::{debug, error, warn};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::slot::Entry;
use crate::updater::Update;
use crate::{Command, CommandSnapshot, Compute, Dep, Error, State, StateSyncStatus, Updater};

/// Upper bound on apply/recompute rounds in one `sync_computes` call.
const MAX_SYNC_PASSES: usize = 16;

/// How long [`StateCtx::shutdown`] waits for cancelled commands before aborting them.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

struct RegisteredCommand {
    name: &'static str,
    command: Arc<dyn Command>,
}

/// Owner of every state, compute and command.
///
/// Lives on the shell thread. Commands run as tasks on the ambient Tokio runtime, so
/// [`flush_commands`](Self::flush_commands) must be called from within one.
pub struct StateCtx {
    entries: BTreeMap<TypeId, Entry>,
    commands: BTreeMap<TypeId, RegisteredCommand>,
    queue: VecDeque<TypeId>,

    send: Sender<Update>,
    recv: Receiver<Update>,

    tasks: JoinSet<()>,
    cancel: CancellationToken,
}

impl Default for StateCtx {
    fn default() -> Self {
        Self::new()
    }
}

impl StateCtx {
    pub fn new() -> Self {
        let (send, recv) = flume::unbounded();
        Self {
            entries: BTreeMap::new(),
            commands: BTreeMap::new(),
            queue: VecDeque::new(),
            send,
            recv,
            tasks: JoinSet::new(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn add_state<T: State>(&mut self, state: T) {
        self.entries.insert(TypeId::of::<T>(), Entry::state(state));
    }

    pub fn record_compute<T: Compute>(&mut self, compute: T) {
        self.entries.insert(TypeId::of::<T>(), Entry::compute(compute));
    }

    pub fn record_command<C: Command>(&mut self, command: C) {
        self.commands.insert(
            TypeId::of::<C>(),
            RegisteredCommand {
                name: type_name::<C>(),
                command: Arc::new(command),
            },
        );
    }

    pub fn try_state<T: State>(&self) -> Result<&T, Error> {
        self.entries
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.slot.as_any().downcast_ref::<T>())
            .ok_or_else(|| Error::state_not_found(type_name::<T>()))
    }

    /// # Panics
    /// Panics if `T` was never registered.
    pub fn state<T: State>(&self) -> &T {
        self.try_state::<T>().unwrap_or_else(|err| panic!("{err}"))
    }

    pub fn try_compute<T: Compute>(&self) -> Result<&T, Error> {
        self.entries
            .get(&TypeId::of::<T>())
            .filter(|entry| entry.slot.is_compute())
            .and_then(|entry| entry.slot.as_any().downcast_ref::<T>())
            .ok_or_else(|| Error::compute_not_found(type_name::<T>()))
    }

    /// # Panics
    /// Panics if `T` was never recorded.
    pub fn compute<T: Compute>(&self) -> &T {
        self.try_compute::<T>().unwrap_or_else(|err| panic!("{err}"))
    }

    /// Mutate a registered value in place and mark it dirty.
    pub fn update<T: State>(&mut self, apply: impl FnOnce(&mut T)) {
        let Some(entry) = self.entries.get_mut(&TypeId::of::<T>()) else {
            error!("StateCtx: update for unregistered {}", type_name::<T>());
            return;
        };
        if let Some(value) = entry.slot.as_any_mut().downcast_mut::<T>() {
            apply(value);
            entry.status = StateSyncStatus::Dirty;
        }
    }

    pub fn updater(&self) -> Updater {
        Updater::new(self.send.clone())
    }

    /// Apply everything posted through an [`Updater`] and re-run derived computes whose
    /// dependencies changed, until nothing moves.
    pub fn sync_computes(&mut self) {
        for _ in 0..MAX_SYNC_PASSES {
            let applied = self.apply_updates();
            let recomputed = self.run_dirty_computes();
            if !applied && !recomputed {
                return;
            }
        }
        warn!("StateCtx: updates did not settle after {MAX_SYNC_PASSES} passes");
    }

    fn apply_updates(&mut self) -> bool {
        let mut applied = false;
        while let Ok(update) = self.recv.try_recv() {
            applied = true;
            match update {
                Update::Replace { id, name, value } => {
                    let Some(entry) = self.entries.get_mut(&id) else {
                        error!("StateCtx: set for unregistered {name}");
                        continue;
                    };
                    if entry.slot.assign(value) {
                        entry.status = StateSyncStatus::Dirty;
                    } else {
                        error!(
                            "StateCtx: {name} cannot replace {}",
                            entry.slot.type_name()
                        );
                    }
                }
                Update::Mutate { id, name, apply } => match self.entries.get_mut(&id) {
                    Some(entry) => {
                        apply(entry.slot.as_any_mut());
                        entry.status = StateSyncStatus::Dirty;
                    }
                    None => error!("StateCtx: update for unregistered {name}"),
                },
                Update::Dispatch { id, name } => {
                    debug!("StateCtx: follow-up command {name} queued");
                    self.queue.push_back(id);
                }
            }
        }
        applied
    }

    fn run_dirty_computes(&mut self) -> bool {
        let dirty: BTreeSet<TypeId> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.status == StateSyncStatus::Dirty)
            .map(|(id, _)| *id)
            .collect();

        let to_run: Vec<TypeId> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.slot.is_compute())
            .filter(|(_, entry)| {
                entry.status == StateSyncStatus::BeforeInit
                    || entry.slot.deps().iter().any(|dep| dirty.contains(dep))
            })
            .map(|(id, _)| *id)
            .collect();

        for entry in self.entries.values_mut() {
            entry.status = StateSyncStatus::Clean;
        }

        if to_run.is_empty() {
            return false;
        }

        let updater = self.updater();
        let deps = Dep::new(&self.entries);
        for id in &to_run {
            if let Some(entry) = self.entries.get(id) {
                entry.slot.recompute(&deps, &updater);
            }
        }
        true
    }

    pub fn enqueue_command<C: Command>(&mut self) {
        self.queue.push_back(TypeId::of::<C>());
    }

    pub fn has_pending_commands(&self) -> bool {
        !self.queue.is_empty()
    }

    fn snapshot(&self) -> CommandSnapshot {
        let mut snap = CommandSnapshot::new();
        for (id, entry) in &self.entries {
            snap.insert_cloned(*id, entry.slot.snapshot());
        }
        snap
    }

    /// Spawn every queued command on the current Tokio runtime.
    pub fn flush_commands(&mut self) {
        while let Some(id) = self.queue.pop_front() {
            let Some(registered) = self.commands.get(&id) else {
                error!("StateCtx: dropping queued command that was never recorded");
                continue;
            };
            let name = registered.name;
            let command = Arc::clone(&registered.command);

            debug!("StateCtx: spawning {name}");
            let future = command.run(
                self.snapshot(),
                self.updater(),
                self.cancel.child_token(),
            );
            self.tasks.spawn(future);
        }
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Sync, flush and await until no command is queued or running.
    ///
    /// Follow-up commands dispatched by finished tasks are flushed in the same call.
    pub async fn run_until_idle(&mut self) {
        loop {
            self.sync_computes();
            self.flush_commands();

            if self.tasks.is_empty() {
                break;
            }
            if let Some(Err(err)) = self.tasks.join_next().await {
                error!("StateCtx: command task failed: {err}");
            }
        }
        self.sync_computes();
    }

    /// Cancel every running command and wait for the tasks to wind down.
    ///
    /// Commands get [`SHUTDOWN_GRACE`] to observe the token and post their final updates.
    /// Whatever is still running after that is aborted.
    pub async fn shutdown(&mut self) {
        self.cancel.cancel();
        let drained = tokio::time::timeout(SHUTDOWN_GRACE, async {
            while let Some(joined) = self.tasks.join_next().await {
                if let Err(err) = joined {
                    error!("StateCtx: command task failed: {err}");
                }
            }
        })
        .await;
        if drained.is_err() {
            warn!(
                "StateCtx: aborting {} command(s) that ignored cancellation",
                self.tasks.len()
            );
            self.tasks.shutdown().await;
        }
        self.cancel = CancellationToken::new();
        self.sync_computes();
    }
}

impl std::fmt::Debug for StateCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateCtx")
            .field("entries", &self.entries.len())
            .field("commands", &self.commands.len())
            .field("queued", &self.queue.len())
            .field("tasks", &self.tasks.len())
            .finish()
    }
}
