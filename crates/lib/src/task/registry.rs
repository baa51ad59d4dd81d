use std::collections::{BTreeMap, HashMap, HashSet};

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use thiserror::Error;
use tracing::debug;

use super::{Task, TaskInfo};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
  #[error("task '{0}' is already registered")]
  Duplicate(String),

  #[error("task '{task}' depends on unknown task '{dependency}'")]
  MissingDependency { task: String, dependency: String },

  #[error("dependency cycle: {}", .path.join(" -> "))]
  Cycle { path: Vec<String> },
}

/// Tasks keyed by unique name, in registration order.
pub struct TaskRegistry<C: ?Sized> {
  tasks: Vec<Box<dyn Task<C>>>,
  index: HashMap<String, usize>,
}

impl<C: ?Sized> Default for TaskRegistry<C> {
  fn default() -> Self {
    Self::new()
  }
}

impl<C: ?Sized> TaskRegistry<C> {
  pub fn new() -> Self {
    Self {
      tasks: Vec::new(),
      index: HashMap::new(),
    }
  }

  /// Add a task. A name collision leaves the registry unchanged.
  pub fn register(&mut self, task: impl Task<C> + 'static) -> Result<(), RegistryError> {
    self.insert(Box::new(task))
  }

  /// Add several tasks. Either all are added or none are.
  pub fn register_all(&mut self, tasks: Vec<Box<dyn Task<C>>>) -> Result<(), RegistryError> {
    let mut seen = HashSet::new();
    for task in &tasks {
      let name = task.name();
      if self.index.contains_key(name) || !seen.insert(name.to_string()) {
        return Err(RegistryError::Duplicate(name.to_string()));
      }
    }
    for task in tasks {
      self.insert(task)?;
    }
    Ok(())
  }

  fn insert(&mut self, task: Box<dyn Task<C>>) -> Result<(), RegistryError> {
    let name = task.name().to_string();
    if self.index.contains_key(&name) {
      return Err(RegistryError::Duplicate(name));
    }
    debug!(task = %name, "registered task");
    self.index.insert(name, self.tasks.len());
    self.tasks.push(task);
    Ok(())
  }

  pub fn get(&self, name: &str) -> Option<&dyn Task<C>> {
    self.index.get(name).map(|&i| self.tasks[i].as_ref())
  }

  pub fn contains(&self, name: &str) -> bool {
    self.index.contains_key(name)
  }

  pub fn len(&self) -> usize {
    self.tasks.len()
  }

  pub fn is_empty(&self) -> bool {
    self.tasks.is_empty()
  }

  /// Task metadata in registration order.
  pub fn tasks(&self) -> impl Iterator<Item = &TaskInfo> {
    self.tasks.iter().map(|t| t.info())
  }

  /// Check the whole graph: every dependency exists and there are no cycles.
  ///
  /// The executor detects the same problems lazily; this reports them before
  /// any task body runs.
  pub fn validate(&self) -> Result<(), RegistryError> {
    let mut graph: DiGraph<&str, ()> = DiGraph::new();
    let nodes: BTreeMap<&str, NodeIndex> = self
      .tasks
      .iter()
      .map(|t| (t.name(), graph.add_node(t.name())))
      .collect();

    for task in &self.tasks {
      let from = nodes[task.name()];
      for dep in &task.info().dependencies {
        let to = nodes.get(dep.as_str()).ok_or_else(|| RegistryError::MissingDependency {
          task: task.name().to_string(),
          dependency: dep.clone(),
        })?;
        graph.add_edge(from, *to, ());
      }
    }

    for component in tarjan_scc(&graph) {
      let self_loop = component.len() == 1 && graph.contains_edge(component[0], component[0]);
      if component.len() > 1 || self_loop {
        return Err(RegistryError::Cycle {
          path: cycle_path(&graph, &component),
        });
      }
    }

    Ok(())
  }
}

/// Walk one cycle inside a strongly connected component, starting from its
/// first-registered member.
fn cycle_path(graph: &DiGraph<&str, ()>, component: &[NodeIndex]) -> Vec<String> {
  let members: HashSet<NodeIndex> = component.iter().copied().collect();
  let start = component.iter().copied().min().unwrap_or(component[0]);

  let mut path = vec![start];
  let mut current = start;
  loop {
    let next = graph
      .neighbors(current)
      .filter(|n| members.contains(n))
      .min()
      .unwrap_or(start);
    if let Some(pos) = path.iter().position(|&n| n == next) {
      let mut cycle: Vec<String> = path[pos..].iter().map(|&n| graph[n].to_string()).collect();
      cycle.push(graph[next].to_string());
      return cycle;
    }
    path.push(next);
    current = next;
  }
}
