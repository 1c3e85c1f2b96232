//! Dependency graph derived from declared step keys.

use super::StepDescriptor;
use crate::errors::{ConfigurationError, CycleDetectedError, DuplicateWriteError};
use std::collections::{BTreeSet, HashMap, HashSet};

/// A validated, acyclic graph of steps.
///
/// Edges are implicit: a consumer depends on the producer of every key it
/// reads. Construction checks every configuration rule before any step can
/// run, so a `StepGraph` that exists is always executable.
#[derive(Debug)]
pub struct StepGraph {
    steps: Vec<StepDescriptor>,
    index: HashMap<String, usize>,
    initial_inputs: BTreeSet<String>,
    producers: HashMap<String, usize>,
    consumers: HashMap<String, Vec<usize>>,
    upstream: Vec<BTreeSet<usize>>,
    execution_order: Vec<usize>,
}

impl StepGraph {
    /// Builds and validates a graph.
    ///
    /// # Errors
    ///
    /// Returns the first configuration error found: an invalid descriptor,
    /// a duplicate step name, a key written both as an initial input and by
    /// a step, an ambiguous producer, an unresolved input, or a cycle.
    pub fn build(
        initial_inputs: BTreeSet<String>,
        steps: Vec<StepDescriptor>,
    ) -> Result<Self, ConfigurationError> {
        for step in &steps {
            step.validate()?;
        }

        let mut index = HashMap::with_capacity(steps.len());
        for (i, step) in steps.iter().enumerate() {
            if index.insert(step.name.clone(), i).is_some() {
                return Err(ConfigurationError::DuplicateStep {
                    step: step.name.clone(),
                });
            }
        }

        let mut producers: HashMap<String, usize> = HashMap::new();
        for (i, step) in steps.iter().enumerate() {
            for key in &step.outputs {
                if initial_inputs.contains(key) {
                    return Err(DuplicateWriteError::new(key).with_writer(&step.name).into());
                }
                if let Some(&first) = producers.get(key) {
                    return Err(ConfigurationError::AmbiguousProducer {
                        key: key.clone(),
                        first: steps[first].name.clone(),
                        second: step.name.clone(),
                    });
                }
                producers.insert(key.clone(), i);
            }
        }

        let mut consumers: HashMap<String, Vec<usize>> = HashMap::new();
        let mut upstream = vec![BTreeSet::new(); steps.len()];
        for (i, step) in steps.iter().enumerate() {
            for key in step.inputs() {
                if let Some(&producer) = producers.get(key) {
                    upstream[i].insert(producer);
                } else if !initial_inputs.contains(key) {
                    return Err(ConfigurationError::UnresolvedInput {
                        step: step.name.clone(),
                        key: key.clone(),
                    });
                }
                consumers.entry(key.clone()).or_default().push(i);
            }
        }

        let mut graph = Self {
            steps,
            index,
            initial_inputs,
            producers,
            consumers,
            upstream,
            execution_order: Vec::new(),
        };

        if let Some(cycle) = graph.find_cycle() {
            return Err(CycleDetectedError::new(cycle).into());
        }
        graph.execution_order = graph.topological_sort();

        Ok(graph)
    }

    /// Returns all step descriptors in declaration order.
    #[must_use]
    pub fn steps(&self) -> &[StepDescriptor] {
        &self.steps
    }

    /// Returns the number of steps.
    #[must_use]
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Looks up a step by name.
    #[must_use]
    pub fn step(&self, name: &str) -> Option<&StepDescriptor> {
        self.index.get(name).map(|&i| &self.steps[i])
    }

    /// Returns the declared initial-input keys.
    #[must_use]
    pub fn initial_inputs(&self) -> &BTreeSet<String> {
        &self.initial_inputs
    }

    /// Returns the step producing a key.
    #[must_use]
    pub fn producer_of(&self, key: &str) -> Option<&StepDescriptor> {
        self.producers.get(key).map(|&i| &self.steps[i])
    }

    /// Returns true if the key is an initial input or a step output.
    #[must_use]
    pub fn is_known_key(&self, key: &str) -> bool {
        self.initial_inputs.contains(key) || self.producers.contains_key(key)
    }

    /// Returns the names of the steps a step directly depends on.
    #[must_use]
    pub fn dependencies_of(&self, name: &str) -> Vec<&str> {
        self.index
            .get(name)
            .map(|&i| {
                self.upstream[i]
                    .iter()
                    .map(|&p| self.steps[p].name.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns a topological order of step names.
    ///
    /// One valid order among many; execution only guarantees dependency order.
    #[must_use]
    pub fn execution_order(&self) -> Vec<&str> {
        self.execution_order
            .iter()
            .map(|&i| self.steps[i].name.as_str())
            .collect()
    }

    /// Returns every step the value of `key` transitively depends on.
    #[must_use]
    pub fn ancestors_of_key(&self, key: &str) -> BTreeSet<String> {
        let mut seen = HashSet::new();
        let mut stack: Vec<usize> = self.producers.get(key).copied().into_iter().collect();
        while let Some(i) = stack.pop() {
            if seen.insert(i) {
                stack.extend(self.upstream[i].iter().copied());
            }
        }
        seen.into_iter().map(|i| self.steps[i].name.clone()).collect()
    }

    pub(crate) fn descriptor(&self, i: usize) -> &StepDescriptor {
        &self.steps[i]
    }

    pub(crate) fn consumer_indices(&self, key: &str) -> &[usize] {
        self.consumers.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    pub(crate) fn topological_indices(&self) -> &[usize] {
        &self.execution_order
    }

    fn find_cycle(&self) -> Option<Vec<String>> {
        let mut visited = HashSet::new();
        let mut on_stack = HashSet::new();
        let mut path = Vec::new();

        for i in 0..self.steps.len() {
            if !visited.contains(&i) {
                if let Some(cycle) = self.dfs_cycle(i, &mut visited, &mut on_stack, &mut path) {
                    return Some(cycle.into_iter().map(|j| self.steps[j].name.clone()).collect());
                }
            }
        }
        None
    }

    fn dfs_cycle(
        &self,
        node: usize,
        visited: &mut HashSet<usize>,
        on_stack: &mut HashSet<usize>,
        path: &mut Vec<usize>,
    ) -> Option<Vec<usize>> {
        visited.insert(node);
        on_stack.insert(node);
        path.push(node);

        for &dep in &self.upstream[node] {
            if !visited.contains(&dep) {
                if let Some(cycle) = self.dfs_cycle(dep, visited, on_stack, path) {
                    return Some(cycle);
                }
            } else if on_stack.contains(&dep) {
                let start = path.iter().position(|&n| n == dep).unwrap_or(0);
                let mut cycle = path[start..].to_vec();
                cycle.push(dep);
                return Some(cycle);
            }
        }

        path.pop();
        on_stack.remove(&node);
        None
    }

    fn topological_sort(&self) -> Vec<usize> {
        fn visit(graph: &StepGraph, node: usize, visited: &mut HashSet<usize>, order: &mut Vec<usize>) {
            if !visited.insert(node) {
                return;
            }
            for &dep in &graph.upstream[node] {
                visit(graph, dep, visited, order);
            }
            order.push(node);
        }

        let mut visited = HashSet::new();
        let mut order = Vec::with_capacity(self.steps.len());
        for i in 0..self.steps.len() {
            visit(self, i, &mut visited, &mut order);
        }
        order
    }
}
