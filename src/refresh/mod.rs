//! Background refresh orchestration.
//!
//! Every tick fires one fetch thread per category; each thread sends
//! back a full keyed-map replacement tagged with a generation stamp.
//! Results arrive over an mpsc channel and are drained by the event
//! loop between draws. A result older than the newest one already
//! delivered for its category is dropped, so a slow fetch can never
//! overwrite fresher data.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use crate::agent::{fetch_agent_sessions, AgentSession};
use crate::config::Config;
use crate::enrich::{fetch_note_counts, fetch_plan_stats, NoteCounts, PlanStats};
use crate::git::{fetch_statuses, GitStatus};
use crate::keymap::SessionRecord;
use crate::mux;
use crate::project::{discover, Project};

/// One independently fetched data category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Projects,
    Git,
    Running,
    KeyMap,
    Agents,
    Notes,
    Plans,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Projects,
        Category::Git,
        Category::Running,
        Category::KeyMap,
        Category::Agents,
        Category::Notes,
        Category::Plans,
    ];
}

/// A completed fetch: the category's entire new value.
#[derive(Debug)]
pub enum RefreshMsg {
    Projects(Vec<Project>),
    Git(HashMap<PathBuf, GitStatus>),
    Running(HashSet<String>),
    KeyMap(Vec<SessionRecord>),
    Agents(HashMap<PathBuf, AgentSession>),
    Notes(HashMap<PathBuf, NoteCounts>),
    Plans(HashMap<PathBuf, PlanStats>),
}

impl RefreshMsg {
    pub fn category(&self) -> Category {
        match self {
            RefreshMsg::Projects(_) => Category::Projects,
            RefreshMsg::Git(_) => Category::Git,
            RefreshMsg::Running(_) => Category::Running,
            RefreshMsg::KeyMap(_) => Category::KeyMap,
            RefreshMsg::Agents(_) => Category::Agents,
            RefreshMsg::Notes(_) => Category::Notes,
            RefreshMsg::Plans(_) => Category::Plans,
        }
    }
}

/// A message with its generation stamp, as sent over the channel.
#[derive(Debug)]
struct Stamped {
    generation: u64,
    msg: RefreshMsg,
}

/// Spawns fetches and filters their results.
pub struct Orchestrator {
    tx: Sender<Stamped>,
    rx: Receiver<Stamped>,
    /// Last generation issued, per category
    issued: HashMap<Category, u64>,
    /// Newest generation delivered to the app, per category
    delivered: HashMap<Category, u64>,
    /// In-flight fetch count, per category
    in_flight: HashMap<Category, usize>,
    keymap_backend: Box<dyn FnMut() -> Vec<SessionRecord> + Send>,
}

impl Orchestrator {
    pub fn new<F>(keymap_loader: F) -> Self
    where
        F: FnMut() -> Vec<SessionRecord> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        Self {
            tx,
            rx,
            issued: HashMap::new(),
            delivered: HashMap::new(),
            in_flight: HashMap::new(),
            keymap_backend: Box::new(keymap_loader),
        }
    }

    /// Fire one fetch thread per category. `paths` is the current
    /// project-path snapshot the per-path categories enumerate over.
    pub fn tick(&mut self, config: &Config, paths: &[PathBuf]) {
        let roots = config.workspace_roots.clone();
        self.spawn(Category::Projects, move || {
            RefreshMsg::Projects(discover(&roots))
        });

        let git_paths = paths.to_vec();
        let main_branch = config.main_branch.clone();
        self.spawn(Category::Git, move || {
            RefreshMsg::Git(fetch_statuses(&git_paths, &main_branch))
        });

        self.spawn(Category::Running, || {
            RefreshMsg::Running(mux::list_running_identifiers())
        });

        // Key-map reads are cheap and must happen on this thread: the
        // backend is owned here, not clonable into a worker.
        let records = (self.keymap_backend)();
        let generation = self.next_generation(Category::KeyMap);
        let _ = self.tx.send(Stamped {
            generation,
            msg: RefreshMsg::KeyMap(records),
        });

        let agent_commands = config.agent_commands.clone();
        self.spawn(Category::Agents, move || {
            RefreshMsg::Agents(fetch_agent_sessions(&agent_commands))
        });

        let note_paths = paths.to_vec();
        self.spawn(Category::Notes, move || {
            RefreshMsg::Notes(fetch_note_counts(&note_paths))
        });

        let plan_paths = paths.to_vec();
        self.spawn(Category::Plans, move || {
            RefreshMsg::Plans(fetch_plan_stats(&plan_paths))
        });
    }

    /// Drain completed fetches, newest-generation wins: stale results
    /// are dropped here and never reach the app.
    pub fn poll(&mut self) -> Vec<RefreshMsg> {
        let mut out = Vec::new();
        while let Ok(stamped) = self.rx.try_recv() {
            let category = stamped.msg.category();
            if let Some(count) = self.in_flight.get_mut(&category) {
                *count = count.saturating_sub(1);
            }
            let newest = self.delivered.entry(category).or_insert(0);
            if stamped.generation <= *newest {
                continue;
            }
            *newest = stamped.generation;
            out.push(stamped.msg);
        }
        out
    }

    /// Whether any fetch for this category is still in flight.
    pub fn is_loading(&self, category: Category) -> bool {
        self.in_flight.get(&category).copied().unwrap_or(0) > 0
    }

    /// Whether anything at all is still in flight.
    pub fn any_loading(&self) -> bool {
        Category::ALL.iter().any(|c| self.is_loading(*c))
    }

    fn spawn<F>(&mut self, category: Category, fetch: F)
    where
        F: FnOnce() -> RefreshMsg + Send + 'static,
    {
        let generation = self.next_generation(category);
        let tx = self.tx.clone();
        thread::spawn(move || {
            let _ = tx.send(Stamped {
                generation,
                msg: fetch(),
            });
        });
    }

    fn next_generation(&mut self, category: Category) -> u64 {
        let issued = self.issued.entry(category).or_insert(0);
        *issued += 1;
        *self.in_flight.entry(category).or_insert(0) += 1;
        *issued
    }

    #[cfg(test)]
    fn inject(&mut self, generation: u64, msg: RefreshMsg) {
        self.tx.send(Stamped { generation, msg }).unwrap();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orchestrator() -> Orchestrator {
        Orchestrator::new(Vec::new)
    }

    #[test]
    fn poll_delivers_messages_in_arrival_order() {
        let mut orch = orchestrator();
        orch.inject(1, RefreshMsg::Running(HashSet::new()));
        orch.inject(1, RefreshMsg::Projects(Vec::new()));

        let msgs = orch.poll();
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].category(), Category::Running);
        assert_eq!(msgs[1].category(), Category::Projects);
    }

    #[test]
    fn stale_generation_is_dropped() {
        let mut orch = orchestrator();
        orch.inject(2, RefreshMsg::Running(["w_app".to_string()].into()));
        orch.inject(1, RefreshMsg::Running(HashSet::new()));

        let msgs = orch.poll();
        assert_eq!(msgs.len(), 1);
        match &msgs[0] {
            RefreshMsg::Running(running) => assert!(running.contains("w_app")),
            other => panic!("unexpected {:?}", other.category()),
        }
    }

    #[test]
    fn staleness_is_tracked_per_category() {
        let mut orch = orchestrator();
        orch.inject(2, RefreshMsg::Running(HashSet::new()));
        // Generation 1 for a different category still applies.
        orch.inject(1, RefreshMsg::Projects(Vec::new()));

        assert_eq!(orch.poll().len(), 2);
    }

    #[test]
    fn loading_flag_clears_when_the_result_arrives() {
        let mut orch = orchestrator();
        let generation = orch.next_generation(Category::Running);
        assert!(orch.is_loading(Category::Running));
        assert!(orch.any_loading());

        orch.inject(generation, RefreshMsg::Running(HashSet::new()));
        orch.poll();
        assert!(!orch.is_loading(Category::Running));
        assert!(!orch.any_loading());
    }

    #[test]
    fn overlapping_fetches_keep_loading_until_all_return() {
        let mut orch = orchestrator();
        let first = orch.next_generation(Category::Git);
        let second = orch.next_generation(Category::Git);

        orch.inject(second, RefreshMsg::Git(HashMap::new()));
        orch.poll();
        assert!(orch.is_loading(Category::Git));

        orch.inject(first, RefreshMsg::Git(HashMap::new()));
        let msgs = orch.poll();
        // Stale result clears the flag but delivers nothing.
        assert!(msgs.is_empty());
        assert!(!orch.is_loading(Category::Git));
    }

    #[test]
    fn tick_runs_the_keymap_loader_synchronously() {
        let mut orch = Orchestrator::new(|| {
            vec![SessionRecord {
                key: 'a',
                project_path: None,
                repository_name: String::new(),
            }]
        });
        // Empty paths and roots keep the worker threads trivial.
        orch.tick(&Config::default(), &[]);

        // The key-map message is already in the channel.
        let has_keymap = orch
            .poll()
            .iter()
            .any(|m| m.category() == Category::KeyMap);
        assert!(has_keymap);
    }
}
