// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The named registry of input values, axes and vectors.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::graph::{SubscriptionId, ValueGraph, ValueId, VectorId};
use super::value::{ChordResolution, ValueEvent, VectorEvent};
use crate::error::{InputError, Result};
use crate::math::Vec2;

/// Which side of an axis a source drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Polarity {
    /// Drives the axis towards `+1`.
    Positive,
    /// Drives the axis towards `-1`.
    Negative,
}

/// Binds names to the nodes of a [`ValueGraph`] it owns.
///
/// Every `add_*` call is create-or-get: the first call under a name creates
/// the node, later calls return the same handle. Name lookups on the query
/// side are lenient and return neutral defaults (`0.0`, `false`,
/// [`Vec2::ZERO`]) for unknown names, except for the explicitly strict
/// [`get_vector2`](Self::get_vector2).
#[derive(Debug, Default)]
pub struct InputMap {
    graph: ValueGraph,
    values: HashMap<String, ValueId>,
    axes: HashMap<String, ValueId>,
    vectors: HashMap<String, VectorId>,
    /// Values registered by name but owned by someone else (device leaves).
    aliases: HashSet<ValueId>,
}

impl InputMap {
    /// Creates an empty map with its own graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// The graph holding every node of this map.
    pub fn graph(&self) -> &ValueGraph {
        &self.graph
    }

    /// Mutable access to the graph, for devices and direct wiring.
    pub fn graph_mut(&mut self) -> &mut ValueGraph {
        &mut self.graph
    }

    // --- Values ---

    /// Returns the value registered under `name`, creating a
    /// [`ChordResolution::Max`] virtual value if there is none.
    pub fn add_input_value(&mut self, name: &str) -> ValueId {
        self.add_input_value_with_mode(name, ChordResolution::Max)
    }

    /// Same as [`add_input_value`](Self::add_input_value) with an explicit
    /// chord policy. An existing value keeps the policy it was created with.
    pub fn add_input_value_with_mode(&mut self, name: &str, mode: ChordResolution) -> ValueId {
        if let Some(id) = self.values.get(name) {
            return *id;
        }
        let id = self.graph.create_virtual(mode);
        self.values.insert(name.to_string(), id);
        log::debug!("Registered input value '{name}' ({mode:?}).");
        id
    }

    /// Registers an existing node under `name` without taking ownership of
    /// it. Typically used to give a device leaf a readable name.
    ///
    /// # Errors
    /// Returns [`InputError::InvalidHandle`] if the node does not exist.
    pub fn register_value(&mut self, name: &str, id: ValueId) -> Result<()> {
        if !self.graph.contains(id) {
            return Err(InputError::InvalidHandle);
        }
        if let Some(previous) = self.values.insert(name.to_string(), id) {
            if previous != id {
                log::warn!("Input value '{name}' was rebound to another node.");
            }
        }
        self.aliases.insert(id);
        Ok(())
    }

    /// Makes the value `name` (created if needed) watch `source`.
    ///
    /// Returns `Ok(false)` if the mapping already existed.
    ///
    /// # Errors
    /// Fails with [`InputError::NotComposite`] if `name` refers to a node that
    /// cannot aggregate, such as a registered device leaf, and with the
    /// errors of [`ValueGraph::add_mapping`] otherwise.
    pub fn add_mapping(&mut self, name: &str, source: ValueId) -> Result<bool> {
        let target = self.add_input_value(name);
        self.graph.add_mapping(target, source)
    }

    /// The handle of the value registered under `name`.
    pub fn value_id(&self, name: &str) -> Option<ValueId> {
        self.values.get(name).copied()
    }

    // --- Axes ---

    /// Returns the axis registered under `name`, creating it if there is none.
    pub fn add_input_axis(&mut self, name: &str) -> ValueId {
        self.add_input_axis_with_mode(name, ChordResolution::Max)
    }

    /// Same as [`add_input_axis`](Self::add_input_axis) with an explicit
    /// chord policy for both sides. An existing axis keeps its policy.
    pub fn add_input_axis_with_mode(&mut self, name: &str, mode: ChordResolution) -> ValueId {
        if let Some(id) = self.axes.get(name) {
            return *id;
        }
        let id = self.graph.create_axis_with_mode(mode);
        self.axes.insert(name.to_string(), id);
        log::debug!("Registered input axis '{name}' ({mode:?}).");
        id
    }

    /// Makes one side of the axis `name` (created if needed) watch `source`.
    ///
    /// The same source may drive both sides; the two contributions cancel.
    ///
    /// # Errors
    /// See [`ValueGraph::add_mapping`].
    pub fn add_axis_mapping(
        &mut self,
        name: &str,
        polarity: Polarity,
        source: ValueId,
    ) -> Result<bool> {
        let axis = self.add_input_axis(name);
        let (positive, negative) = self
            .graph
            .axis_parts(axis)
            .ok_or(InputError::InvalidHandle)?;
        let side = match polarity {
            Polarity::Positive => positive,
            Polarity::Negative => negative,
        };
        self.graph.add_mapping(side, source)
    }

    /// The handle of the axis registered under `name`.
    pub fn axis_id(&self, name: &str) -> Option<ValueId> {
        self.axes.get(name).copied()
    }

    // --- Vectors ---

    /// Returns the vector registered under `name`, creating it from the axes
    /// `x_axis` and `y_axis` (themselves created if needed) if there is none.
    pub fn add_input_vector(&mut self, name: &str, x_axis: &str, y_axis: &str) -> Result<VectorId> {
        if let Some(id) = self.vectors.get(name) {
            return Ok(*id);
        }
        let x = self.add_input_axis(x_axis);
        let y = self.add_input_axis(y_axis);
        let id = self.graph.create_vector(x, y)?;
        self.vectors.insert(name.to_string(), id);
        log::debug!("Registered input vector '{name}' ({x_axis}, {y_axis}).");
        Ok(id)
    }

    /// The handle of the vector registered under `name`.
    pub fn vector_id(&self, name: &str) -> Option<VectorId> {
        self.vectors.get(name).copied()
    }

    /// Writes a vector, see [`ValueGraph::set_vector`].
    ///
    /// # Errors
    /// Returns [`InputError::UnknownVector`] if `name` is not registered.
    pub fn set_vector(&mut self, name: &str, value: Vec2) -> Result<()> {
        let id = self
            .vector_id(name)
            .ok_or_else(|| InputError::UnknownVector(name.to_string()))?;
        self.graph.set_vector(id, value)
    }

    // --- Queries ---

    /// Looks a name up among values first, then axes.
    fn lookup(&self, name: &str) -> Option<ValueId> {
        self.value_id(name).or_else(|| self.axis_id(name))
    }

    /// The current value of the value or axis `name`, `0.0` if unknown.
    pub fn get_value(&self, name: &str) -> f32 {
        match self.lookup(name).and_then(|id| self.graph.value(id)) {
            Some(value) => value,
            None => {
                log::trace!("Queried unknown input '{name}', defaulting to 0.0.");
                0.0
            }
        }
    }

    /// Builds a vector from two named axes.
    ///
    /// # Errors
    /// Returns [`InputError::UnknownAxis`] naming the first missing axis.
    pub fn get_vector2(&self, x_axis: &str, y_axis: &str) -> Result<Vec2> {
        let read = |name: &str| {
            self.axis_id(name)
                .and_then(|id| self.graph.value(id))
                .ok_or_else(|| InputError::UnknownAxis(name.to_string()))
        };
        Ok(Vec2::new(read(x_axis)?, read(y_axis)?))
    }

    /// Same as [`get_vector2`](Self::get_vector2), with missing axes read as `0.0`.
    pub fn get_vector2_or_zero(&self, x_axis: &str, y_axis: &str) -> Vec2 {
        self.get_vector2(x_axis, y_axis).unwrap_or_else(|e| {
            log::trace!("{e}, defaulting to a neutral vector.");
            Vec2::ZERO
        })
    }

    /// The current value of the vector `name`, [`Vec2::ZERO`] if unknown.
    pub fn get_vector(&self, name: &str) -> Vec2 {
        self.vector_id(name)
            .and_then(|id| self.graph.vector(id))
            .unwrap_or(Vec2::ZERO)
    }

    /// `false` for unknown names.
    pub fn is_down(&self, name: &str) -> bool {
        self.lookup(name).is_some_and(|id| self.graph.is_down(id))
    }

    /// `false` for unknown names.
    pub fn is_up(&self, name: &str) -> bool {
        self.lookup(name).is_some_and(|id| self.graph.is_up(id))
    }

    /// `false` for unknown names.
    pub fn was_just_pressed(&self, name: &str) -> bool {
        self.lookup(name)
            .is_some_and(|id| self.graph.was_just_pressed(id))
    }

    /// `false` for unknown names.
    pub fn was_just_released(&self, name: &str) -> bool {
        self.lookup(name)
            .is_some_and(|id| self.graph.was_just_released(id))
    }

    /// Subscribes to the value or axis `name`.
    ///
    /// # Errors
    /// Returns [`InputError::UnknownValue`] if `name` is not registered.
    pub fn subscribe(
        &mut self,
        name: &str,
        callback: impl FnMut(&ValueEvent) + 'static,
    ) -> Result<SubscriptionId> {
        let id = self
            .lookup(name)
            .ok_or_else(|| InputError::UnknownValue(name.to_string()))?;
        self.graph.subscribe(id, callback)
    }

    /// Subscribes to the vector `name`.
    ///
    /// # Errors
    /// Returns [`InputError::UnknownVector`] if `name` is not registered.
    pub fn subscribe_vector(
        &mut self,
        name: &str,
        callback: impl FnMut(&VectorEvent) + 'static,
    ) -> Result<SubscriptionId> {
        let id = self
            .vector_id(name)
            .ok_or_else(|| InputError::UnknownVector(name.to_string()))?;
        self.graph.subscribe_vector(id, callback)
    }

    // --- Removal ---

    /// Unregisters the value `name`, destroying it unless it is an alias.
    ///
    /// Returns `false` if the name was not registered.
    pub fn remove_value(&mut self, name: &str) -> bool {
        let Some(id) = self.values.remove(name) else {
            return false;
        };
        let still_named = self.values.values().any(|other| *other == id);
        if self.aliases.contains(&id) {
            if !still_named {
                self.aliases.remove(&id);
            }
        } else if !still_named {
            let _ = self.graph.remove(id);
        }
        true
    }

    /// Unregisters and destroys the axis `name`.
    ///
    /// Returns `false` if the name was not registered.
    pub fn remove_axis(&mut self, name: &str) -> bool {
        match self.axes.remove(name) {
            Some(id) => {
                let _ = self.graph.remove(id);
                true
            }
            None => false,
        }
    }

    /// Unregisters and destroys the vector `name`. Its axes stay registered.
    ///
    /// Returns `false` if the name was not registered.
    pub fn remove_vector(&mut self, name: &str) -> bool {
        match self.vectors.remove(name) {
            Some(id) => {
                let _ = self.graph.remove_vector(id);
                true
            }
            None => false,
        }
    }

    /// Destroys every value, axis and vector this map created.
    ///
    /// Aliased nodes are only unregistered; their owners keep them.
    pub fn clear(&mut self) {
        for id in std::mem::take(&mut self.vectors).into_values() {
            let _ = self.graph.remove_vector(id);
        }
        for id in std::mem::take(&mut self.axes).into_values() {
            let _ = self.graph.remove(id);
        }
        let mut destroyed = HashSet::new();
        for id in std::mem::take(&mut self.values).into_values() {
            if !self.aliases.contains(&id) && destroyed.insert(id) {
                let _ = self.graph.remove(id);
            }
        }
        self.aliases.clear();
        log::debug!("Input map cleared.");
    }

    /// Names of every registered value, axis and vector.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values
            .keys()
            .chain(self.axes.keys())
            .chain(self.vectors.keys())
            .map(String::as_str)
    }
}
