//! Applying refresh results to the model.
//!
//! Every message is a full replacement of one category. Categories
//! whose values compare structurally are diffed before commit: an
//! identical snapshot mutates nothing and leaves the version counter
//! alone, so steady-state refreshes never cause a redraw. The
//! project-list and key-map categories always apply.

use super::*;

use crate::persist::save_project_cache;
use crate::refresh::RefreshMsg;

impl<B: KeyMapBackend> App<B> {
    pub fn apply(&mut self, msg: RefreshMsg) {
        match msg {
            RefreshMsg::Projects(projects) => {
                self.phase = ListPhase::Ready;
                // The snapshot rarely changes between ticks; only a
                // changed one is worth a disk write.
                if projects != self.projects {
                    save_project_cache(&projects);
                    #[cfg(test)]
                    {
                        self.cache_writes += 1;
                    }
                }
                self.projects = projects;
                self.rebuild_combined();
                self.recompute();
            }
            RefreshMsg::KeyMap(records) => {
                self.keymap.replace_records(records);
                self.recompute();
            }
            RefreshMsg::Git(statuses) => {
                if self.git != statuses {
                    self.git = statuses;
                    self.recompute();
                }
            }
            RefreshMsg::Running(identifiers) => {
                if self.running != identifiers {
                    self.running = identifiers;
                    self.recompute();
                }
            }
            RefreshMsg::Agents(sessions) => {
                if self.agents != sessions {
                    self.agents = sessions;
                    self.rebuild_combined();
                    self.recompute();
                }
            }
            RefreshMsg::Notes(counts) => {
                if self.notes != counts {
                    self.notes = counts;
                    // Cell content only; membership and order are
                    // unaffected.
                    self.version += 1;
                }
            }
            RefreshMsg::Plans(stats) => {
                if self.plans != stats {
                    self.plans = stats;
                    self.version += 1;
                }
            }
        }
    }
}
