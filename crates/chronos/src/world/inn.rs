use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use tracing::warn;

static INN_LOCK_POISON_WARNED: AtomicBool = AtomicBool::new(false);

fn warn_inn_lock_poison_once(operation: &'static str) {
    if INN_LOCK_POISON_WARNED
        .compare_exchange(false, true, Ordering::Relaxed, Ordering::Relaxed)
        .is_ok()
    {
        warn!(operation, "inn lock poisoned; recovered inner value");
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Npc {
    pub name: String,
    pub far_description: String,
    pub near_description: String,
}

impl Npc {
    pub fn new(
        name: impl Into<String>,
        far_description: impl Into<String>,
        near_description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            far_description: far_description.into(),
            near_description: near_description.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Inn {
    name: String,
    innkeeper: String,
    description: String,
    patrons: Vec<Npc>,
}

impl Inn {
    pub fn new(
        name: impl Into<String>,
        innkeeper: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            innkeeper: innkeeper.into(),
            description: description.into(),
            patrons: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn patrons(&self) -> &[Npc] {
        &self.patrons
    }

    pub fn find(&self, npc_name: &str) -> Option<&Npc> {
        self.patrons
            .iter()
            .find(|patron| patron.name.eq_ignore_ascii_case(npc_name))
    }

    pub fn contains(&self, npc_name: &str) -> bool {
        self.find(npc_name).is_some()
    }

    /// Refuses an NPC who is already inside.
    pub fn add(&mut self, npc: Npc) -> bool {
        if self.contains(&npc.name) {
            return false;
        }
        self.patrons.push(npc);
        true
    }

    pub fn remove(&mut self, npc_name: &str) -> bool {
        let before = self.patrons.len();
        self.patrons
            .retain(|patron| !patron.name.eq_ignore_ascii_case(npc_name));
        self.patrons.len() != before
    }

    pub fn describe(&self) -> String {
        let mut description = format!(
            "{}\n{} tends the bar.\n{}",
            self.name, self.innkeeper, self.description
        );
        if !self.patrons.is_empty() {
            description.push_str("\n\nYou see patrons inside:");
            for patron in &self.patrons {
                description.push_str(&format!("\n{}\n\t{}", patron.name, patron.far_description));
            }
        }
        description
    }
}

/// Shared access to an [`Inn`] for the commands that mutate it.
#[derive(Clone, Debug)]
pub struct InnHandle {
    inn: Arc<RwLock<Inn>>,
}

impl InnHandle {
    pub fn new(inn: Inn) -> Self {
        Self {
            inn: Arc::new(RwLock::new(inn)),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Inn> {
        match self.inn.read() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn_inn_lock_poison_once("read");
                poisoned.into_inner()
            }
        }
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, Inn> {
        match self.inn.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn_inn_lock_poison_once("write");
                poisoned.into_inner()
            }
        }
    }
}
