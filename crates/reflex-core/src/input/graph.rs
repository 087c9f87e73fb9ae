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

//! The arena-backed value graph.
//!
//! Every input value lives in a slot of the graph and is addressed by a
//! generational [`ValueId`]. Derived nodes keep the handles of the nodes they
//! watch, and every node keeps the handles of the nodes that watch it. A write
//! walks those dependent lists depth-first with an explicit work-list, so the
//! whole graph is settled by the time [`ValueGraph::set_value`] returns.

use std::collections::HashMap;

use super::value::{
    ChordResolution, Transition, ValueEvent, ValueEventKind, ValueState, VectorEvent,
};
use crate::error::{InputError, Result};
use crate::math::Vec2;

/// A stable index into one of the graph's arenas.
///
/// The generation is bumped every time a slot is recycled, so handles to a
/// removed node never alias the node that reuses its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Handle {
    index: u32,
    generation: u32,
}

/// A handle to a scalar node of a [`ValueGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueId(Handle);

/// A handle to a vector node of a [`ValueGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VectorId(Handle);

/// A handle to a registered notification callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Slot<T> {
    generation: u32,
    entry: Option<T>,
}

struct Arena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
}

impl<T> Arena<T> {
    fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    fn insert(&mut self, entry: T) -> Handle {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.entry = Some(entry);
            Handle {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                entry: Some(entry),
            });
            Handle {
                index,
                generation: 0,
            }
        }
    }

    fn get(&self, handle: Handle) -> Option<&T> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.entry.as_ref())
    }

    fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.entry.as_mut())
    }

    fn remove(&mut self, handle: Handle) -> Option<T> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        let entry = slot.entry.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        Some(entry)
    }

    fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }
}

/// How a scalar node obtains its value.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Written directly, typically by a device.
    Leaf,
    /// Resolved from the watched nodes with a chord policy.
    Virtual {
        /// The watched nodes, in mapping order.
        sources: Vec<ValueId>,
        /// The aggregation policy.
        mode: ChordResolution,
    },
    /// `positive - negative`, both sides being virtual sub-nodes.
    Axis {
        /// The sub-node driving the axis towards `+1`.
        positive: ValueId,
        /// The sub-node driving the axis towards `-1`.
        negative: ValueId,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dependent {
    Value(ValueId),
    Vector(VectorId),
}

type ValueCallback = Box<dyn FnMut(&ValueEvent)>;
type VectorCallback = Box<dyn FnMut(&VectorEvent)>;

struct ValueNode {
    state: ValueState,
    kind: NodeKind,
    dependents: Vec<Dependent>,
    subscribers: Vec<(SubscriptionId, ValueCallback)>,
}

impl ValueNode {
    fn new(kind: NodeKind) -> Self {
        Self {
            state: ValueState::default(),
            kind,
            dependents: Vec::new(),
            subscribers: Vec::new(),
        }
    }

    fn notify(&mut self, event: ValueEvent) {
        for (_, callback) in self.subscribers.iter_mut() {
            callback(&event);
        }
    }
}

struct VectorNode {
    x: ValueId,
    y: ValueId,
    current: Vec2,
    previous: Vec2,
    last_updated_frame: u64,
    subscribers: Vec<(SubscriptionId, VectorCallback)>,
}

#[derive(Debug, Clone, Copy)]
enum SubscriptionTarget {
    Value(ValueId),
    Vector(VectorId),
}

/// A pending step of a propagation pass.
#[derive(Debug, Clone, Copy)]
enum Work {
    Set(ValueId, f32),
    Recompute(ValueId),
    Vector(VectorId),
}

/// The graph of every input value known to an input map.
///
/// The graph is single-threaded: writes and the propagation they trigger run
/// to completion on the calling thread. Samples produced elsewhere must be
/// queued and applied here (see [`InputQueue`](super::InputQueue)).
pub struct ValueGraph {
    values: Arena<ValueNode>,
    vectors: Arena<VectorNode>,
    subscriptions: HashMap<SubscriptionId, SubscriptionTarget>,
    next_subscription: u64,
    frame: u64,
}

impl Default for ValueGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ValueGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValueGraph")
            .field("values", &self.values.len())
            .field("vectors", &self.vectors.len())
            .field("subscriptions", &self.subscriptions.len())
            .field("frame", &self.frame)
            .finish()
    }
}

impl ValueGraph {
    /// Creates an empty graph at frame zero.
    pub fn new() -> Self {
        Self {
            values: Arena::new(),
            vectors: Arena::new(),
            subscriptions: HashMap::new(),
            next_subscription: 0,
            frame: 0,
        }
    }

    /// The frame used to stamp changes and answer "just" queries.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Sets the frame used to stamp subsequent changes.
    pub fn set_frame(&mut self, frame: u64) {
        self.frame = frame;
    }

    /// Number of live scalar nodes, sub-nodes included.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the graph holds no scalar node.
    pub fn is_empty(&self) -> bool {
        self.values.len() == 0
    }

    // --- Construction ---

    /// Creates a node written directly by its owner.
    pub fn create_leaf(&mut self) -> ValueId {
        ValueId(self.values.insert(ValueNode::new(NodeKind::Leaf)))
    }

    /// Creates a node aggregating the nodes later mapped into it.
    pub fn create_virtual(&mut self, mode: ChordResolution) -> ValueId {
        ValueId(self.values.insert(ValueNode::new(NodeKind::Virtual {
            sources: Vec::new(),
            mode,
        })))
    }

    /// Creates an axis together with its positive and negative sub-nodes.
    ///
    /// Both sub-nodes use [`ChordResolution::Max`], so several keys bound to
    /// the same direction behave like a single key.
    pub fn create_axis(&mut self) -> ValueId {
        self.create_axis_with_mode(ChordResolution::Max)
    }

    /// Creates an axis whose two sides combine their sources with `mode`.
    ///
    /// Signed analog sources (mouse deltas, sticks) need a magnitude mode
    /// such as [`ChordResolution::MaxAbs`]; under `Max` a negative reading
    /// loses to the resting `0.0` of any other source on the same side.
    pub fn create_axis_with_mode(&mut self, mode: ChordResolution) -> ValueId {
        let positive = self.create_virtual(mode);
        let negative = self.create_virtual(mode);
        let axis = ValueId(
            self.values
                .insert(ValueNode::new(NodeKind::Axis { positive, negative })),
        );
        for side in [positive, negative] {
            if let Some(node) = self.values.get_mut(side.0) {
                node.dependents.push(Dependent::Value(axis));
            }
        }
        axis
    }

    /// Creates a vector combining two existing nodes, usually axes.
    ///
    /// # Errors
    /// Returns [`InputError::InvalidHandle`] if either node does not exist.
    pub fn create_vector(&mut self, x: ValueId, y: ValueId) -> Result<VectorId> {
        let current = Vec2::new(
            self.value(x).ok_or(InputError::InvalidHandle)?,
            self.value(y).ok_or(InputError::InvalidHandle)?,
        );
        let vector = VectorId(self.vectors.insert(VectorNode {
            x,
            y,
            current,
            previous: current,
            last_updated_frame: self.frame,
            subscribers: Vec::new(),
        }));
        for axis in [x, y] {
            if let Some(node) = self.values.get_mut(axis.0) {
                node.dependents.push(Dependent::Vector(vector));
            }
        }
        Ok(vector)
    }

    // --- Wiring ---

    /// Makes `target` watch `source`.
    ///
    /// Only virtual nodes accept mappings. Mapping the same source twice is a
    /// no-op and returns `Ok(false)`. The target is re-resolved right away.
    ///
    /// # Errors
    /// * [`InputError::InvalidHandle`] if either node does not exist.
    /// * [`InputError::NotComposite`] if `target` is a leaf or an axis.
    /// * [`InputError::CyclicMapping`] if `target` already feeds `source`.
    pub fn add_mapping(&mut self, target: ValueId, source: ValueId) -> Result<bool> {
        if self.values.get(source.0).is_none() {
            return Err(InputError::InvalidHandle);
        }
        let node = self.values.get(target.0).ok_or(InputError::InvalidHandle)?;
        let NodeKind::Virtual { sources, .. } = &node.kind else {
            return Err(InputError::NotComposite { node: target });
        };
        if sources.contains(&source) {
            log::debug!("Mapping {source:?} -> {target:?} already exists, skipping.");
            return Ok(false);
        }
        if source == target || self.feeds(target, source) {
            return Err(InputError::CyclicMapping {
                node: target,
                mapped: source,
            });
        }

        if let Some(NodeKind::Virtual { sources, .. }) =
            self.values.get_mut(target.0).map(|n| &mut n.kind)
        {
            sources.push(source);
        }
        if let Some(node) = self.values.get_mut(source.0) {
            node.dependents.push(Dependent::Value(target));
        }
        log::trace!("Mapped {source:?} -> {target:?}.");

        self.propagate(vec![Work::Recompute(target)], None);
        Ok(true)
    }

    /// Stops `target` from watching `source`.
    ///
    /// Returns `Ok(false)` if the mapping did not exist. The target keeps its
    /// current value when its last source goes away.
    ///
    /// # Errors
    /// Returns [`InputError::InvalidHandle`] if `target` does not exist.
    pub fn remove_mapping(&mut self, target: ValueId, source: ValueId) -> Result<bool> {
        let node = self
            .values
            .get_mut(target.0)
            .ok_or(InputError::InvalidHandle)?;
        let removed = match &mut node.kind {
            NodeKind::Virtual { sources, .. } => {
                let before = sources.len();
                sources.retain(|s| *s != source);
                before != sources.len()
            }
            _ => return Err(InputError::NotComposite { node: target }),
        };
        if removed {
            if let Some(node) = self.values.get_mut(source.0) {
                node.dependents.retain(|d| *d != Dependent::Value(target));
            }
            self.propagate(vec![Work::Recompute(target)], None);
        }
        Ok(removed)
    }

    /// Returns `true` if a change of `from` can reach `to`.
    fn feeds(&self, from: ValueId, to: ValueId) -> bool {
        let mut stack = vec![from];
        let mut visited = Vec::new();
        while let Some(id) = stack.pop() {
            if id == to {
                return true;
            }
            if visited.contains(&id) {
                continue;
            }
            visited.push(id);
            if let Some(node) = self.values.get(id.0) {
                stack.extend(node.dependents.iter().filter_map(|d| match d {
                    Dependent::Value(v) => Some(*v),
                    Dependent::Vector(_) => None,
                }));
            }
        }
        false
    }

    // --- Writes ---

    /// Writes `value` into a node and settles every node depending on it.
    ///
    /// Writing the exact current value does nothing.
    ///
    /// # Errors
    /// Returns [`InputError::InvalidHandle`] if the node does not exist.
    pub fn set_value(&mut self, id: ValueId, value: f32) -> Result<()> {
        if self.values.get(id.0).is_none() {
            return Err(InputError::InvalidHandle);
        }
        self.propagate(vec![Work::Set(id, value)], None);
        Ok(())
    }

    /// Writes both components of a vector, x before y, and notifies the
    /// vector's subscribers once.
    ///
    /// # Errors
    /// Returns [`InputError::InvalidHandle`] if the vector does not exist.
    pub fn set_vector(&mut self, id: VectorId, value: Vec2) -> Result<()> {
        let node = self.vectors.get(id.0).ok_or(InputError::InvalidHandle)?;
        if node.current == value {
            return Ok(());
        }
        let (x, y) = (node.x, node.y);
        self.propagate(vec![Work::Set(x, value.x)], Some(id));
        self.propagate(vec![Work::Set(y, value.y)], Some(id));
        self.refresh_vector(id);
        Ok(())
    }

    /// Re-resolves a derived node from the nodes it watches.
    ///
    /// # Errors
    /// * [`InputError::InvalidHandle`] if the node does not exist.
    /// * [`InputError::NotComposite`] for a leaf.
    /// * [`InputError::EmptyChord`] for a virtual node without sources.
    pub fn refresh(&mut self, id: ValueId) -> Result<f32> {
        let node = self.values.get(id.0).ok_or(InputError::InvalidHandle)?;
        let value = match &node.kind {
            NodeKind::Leaf => return Err(InputError::NotComposite { node: id }),
            NodeKind::Virtual { sources, mode } => mode.resolve(&self.source_values(sources))?,
            NodeKind::Axis { positive, negative } => self.axis_value(*positive, *negative),
        };
        self.propagate(vec![Work::Set(id, value)], None);
        Ok(value)
    }

    /// Changes the deadzone of a node. The current value is left untouched.
    ///
    /// # Errors
    /// Returns [`InputError::InvalidHandle`] if the node does not exist.
    pub fn set_deadzone(&mut self, id: ValueId, deadzone: f32) -> Result<()> {
        let node = self
            .values
            .get_mut(id.0)
            .ok_or(InputError::InvalidHandle)?;
        node.state.deadzone = deadzone;
        Ok(())
    }

    fn source_values(&self, sources: &[ValueId]) -> Vec<f32> {
        sources.iter().filter_map(|s| self.value(*s)).collect()
    }

    fn axis_value(&self, positive: ValueId, negative: ValueId) -> f32 {
        self.value(positive).unwrap_or(0.0) - self.value(negative).unwrap_or(0.0)
    }

    /// Computes the value a derived node should hold, `None` for leaves and
    /// for virtual nodes left without sources.
    fn resolve(&self, id: ValueId) -> Option<f32> {
        let node = self.values.get(id.0)?;
        match &node.kind {
            NodeKind::Leaf => None,
            NodeKind::Virtual { sources, mode } => {
                mode.resolve(&self.source_values(sources)).ok()
            }
            NodeKind::Axis { positive, negative } => Some(self.axis_value(*positive, *negative)),
        }
    }

    /// Runs a propagation pass until the work-list is empty.
    ///
    /// Dependents are pushed in reverse so the first registered dependent is
    /// settled first, giving a depth-first, registration-ordered walk.
    fn propagate(&mut self, mut work: Vec<Work>, muted_vector: Option<VectorId>) {
        let frame = self.frame;
        while let Some(step) = work.pop() {
            let (id, value) = match step {
                Work::Set(id, value) => (id, value),
                Work::Recompute(id) => match self.resolve(id) {
                    Some(value) => (id, value),
                    None => continue,
                },
                Work::Vector(vector) => {
                    if Some(vector) != muted_vector {
                        self.refresh_vector(vector);
                    }
                    continue;
                }
            };

            let Some(node) = self.values.get_mut(id.0) else {
                continue;
            };
            let Some(transition) = node.state.apply(value, frame) else {
                continue;
            };
            log::trace!("Input node {id:?} changed to {value}.");

            let mut event = ValueEvent {
                node: id,
                kind: ValueEventKind::Changed,
                previous: node.state.previous,
                current: node.state.current,
                frame,
            };
            node.notify(event);
            match transition {
                Transition::Pressed => {
                    event.kind = ValueEventKind::Pressed;
                    node.notify(event);
                }
                Transition::Released => {
                    event.kind = ValueEventKind::Released;
                    node.notify(event);
                }
                Transition::None => {}
            }

            work.extend(node.dependents.iter().rev().map(|dependent| match dependent {
                Dependent::Value(v) => Work::Recompute(*v),
                Dependent::Vector(v) => Work::Vector(*v),
            }));
        }
    }

    fn refresh_vector(&mut self, id: VectorId) {
        let Some(node) = self.vectors.get(id.0) else {
            return;
        };
        let value = Vec2::new(
            self.value(node.x).unwrap_or(0.0),
            self.value(node.y).unwrap_or(0.0),
        );
        let frame = self.frame;
        let Some(node) = self.vectors.get_mut(id.0) else {
            return;
        };
        if node.current == value {
            return;
        }
        node.previous = node.current;
        node.current = value;
        node.last_updated_frame = frame;
        let event = VectorEvent {
            node: id,
            previous: node.previous,
            current: node.current,
            frame,
        };
        for (_, callback) in node.subscribers.iter_mut() {
            callback(&event);
        }
    }

    // --- Removal ---

    /// Removes a node. Axes take their sub-nodes with them.
    ///
    /// Sources forget the node immediately, and nodes that watched it drop it
    /// from their source lists. Vectors built on a removed axis read `0.0`
    /// for that component.
    ///
    /// # Errors
    /// Returns [`InputError::InvalidHandle`] if the node does not exist.
    pub fn remove(&mut self, id: ValueId) -> Result<()> {
        let node = self.values.remove(id.0).ok_or(InputError::InvalidHandle)?;
        self.forget_subscriptions(node.subscribers.iter().map(|(s, _)| *s));

        match node.kind {
            NodeKind::Leaf => {}
            NodeKind::Virtual { sources, .. } => {
                for source in sources {
                    if let Some(source) = self.values.get_mut(source.0) {
                        source.dependents.retain(|d| *d != Dependent::Value(id));
                    }
                }
            }
            NodeKind::Axis { positive, negative } => {
                for side in [positive, negative] {
                    // Sub-nodes may already be gone if removed by handle.
                    let _ = self.remove(side);
                }
            }
        }

        for dependent in node.dependents {
            match dependent {
                Dependent::Value(dep) => {
                    if let Some(NodeKind::Virtual { sources, .. }) =
                        self.values.get_mut(dep.0).map(|n| &mut n.kind)
                    {
                        sources.retain(|s| *s != id);
                    }
                    self.propagate(vec![Work::Recompute(dep)], None);
                }
                Dependent::Vector(vector) => self.refresh_vector(vector),
            }
        }
        log::trace!("Removed input node {id:?}.");
        Ok(())
    }

    /// Removes a vector. Its axes are left in place.
    ///
    /// # Errors
    /// Returns [`InputError::InvalidHandle`] if the vector does not exist.
    pub fn remove_vector(&mut self, id: VectorId) -> Result<()> {
        let node = self.vectors.remove(id.0).ok_or(InputError::InvalidHandle)?;
        self.forget_subscriptions(node.subscribers.iter().map(|(s, _)| *s));
        for axis in [node.x, node.y] {
            if let Some(axis) = self.values.get_mut(axis.0) {
                axis.dependents.retain(|d| *d != Dependent::Vector(id));
            }
        }
        Ok(())
    }

    fn forget_subscriptions(&mut self, ids: impl Iterator<Item = SubscriptionId>) {
        for id in ids {
            self.subscriptions.remove(&id);
        }
    }

    // --- Subscriptions ---

    fn next_subscription_id(&mut self) -> SubscriptionId {
        self.next_subscription += 1;
        SubscriptionId(self.next_subscription)
    }

    /// Registers a callback receiving every event of a scalar node.
    ///
    /// Callbacks run synchronously during propagation and must not assume
    /// the rest of the graph is settled yet.
    ///
    /// # Errors
    /// Returns [`InputError::InvalidHandle`] if the node does not exist.
    pub fn subscribe(
        &mut self,
        id: ValueId,
        callback: impl FnMut(&ValueEvent) + 'static,
    ) -> Result<SubscriptionId> {
        if self.values.get(id.0).is_none() {
            return Err(InputError::InvalidHandle);
        }
        let subscription = self.next_subscription_id();
        if let Some(node) = self.values.get_mut(id.0) {
            node.subscribers.push((subscription, Box::new(callback)));
        }
        self.subscriptions
            .insert(subscription, SubscriptionTarget::Value(id));
        Ok(subscription)
    }

    /// Registers a callback receiving every change of a vector.
    ///
    /// # Errors
    /// Returns [`InputError::InvalidHandle`] if the vector does not exist.
    pub fn subscribe_vector(
        &mut self,
        id: VectorId,
        callback: impl FnMut(&VectorEvent) + 'static,
    ) -> Result<SubscriptionId> {
        if self.vectors.get(id.0).is_none() {
            return Err(InputError::InvalidHandle);
        }
        let subscription = self.next_subscription_id();
        if let Some(node) = self.vectors.get_mut(id.0) {
            node.subscribers.push((subscription, Box::new(callback)));
        }
        self.subscriptions
            .insert(subscription, SubscriptionTarget::Vector(id));
        Ok(subscription)
    }

    /// Revokes a subscription. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, subscription: SubscriptionId) -> bool {
        match self.subscriptions.remove(&subscription) {
            Some(SubscriptionTarget::Value(id)) => {
                if let Some(node) = self.values.get_mut(id.0) {
                    node.subscribers.retain(|(s, _)| *s != subscription);
                }
                true
            }
            Some(SubscriptionTarget::Vector(id)) => {
                if let Some(node) = self.vectors.get_mut(id.0) {
                    node.subscribers.retain(|(s, _)| *s != subscription);
                }
                true
            }
            None => false,
        }
    }

    // --- Queries ---

    /// Returns `true` if the handle refers to a live scalar node.
    pub fn contains(&self, id: ValueId) -> bool {
        self.values.get(id.0).is_some()
    }

    /// The current value of a node.
    pub fn value(&self, id: ValueId) -> Option<f32> {
        self.values.get(id.0).map(|n| n.state.current)
    }

    /// The value a node held before its last change.
    pub fn previous(&self, id: ValueId) -> Option<f32> {
        self.values.get(id.0).map(|n| n.state.previous)
    }

    /// The full state of a node.
    pub fn state(&self, id: ValueId) -> Option<&ValueState> {
        self.values.get(id.0).map(|n| &n.state)
    }

    /// How a node obtains its value.
    pub fn kind(&self, id: ValueId) -> Option<&NodeKind> {
        self.values.get(id.0).map(|n| &n.kind)
    }

    /// The positive and negative sub-nodes of an axis.
    pub fn axis_parts(&self, id: ValueId) -> Option<(ValueId, ValueId)> {
        match self.kind(id)? {
            NodeKind::Axis { positive, negative } => Some((*positive, *negative)),
            _ => None,
        }
    }

    /// The nodes watched by a virtual node, in mapping order.
    pub fn sources(&self, id: ValueId) -> Option<&[ValueId]> {
        match self.kind(id)? {
            NodeKind::Virtual { sources, .. } => Some(sources),
            _ => None,
        }
    }

    /// `false` for missing nodes.
    pub fn is_down(&self, id: ValueId) -> bool {
        self.state(id).is_some_and(ValueState::is_down)
    }

    /// `false` for missing nodes.
    pub fn is_up(&self, id: ValueId) -> bool {
        self.state(id).is_some_and(ValueState::is_up)
    }

    /// `true` if the node crossed into the down state during the current frame.
    pub fn was_just_pressed(&self, id: ValueId) -> bool {
        self.state(id)
            .is_some_and(|s| s.was_just_pressed(self.frame))
    }

    /// `true` if the node crossed into the up state during the current frame.
    pub fn was_just_released(&self, id: ValueId) -> bool {
        self.state(id)
            .is_some_and(|s| s.was_just_released(self.frame))
    }

    /// Returns `true` if the handle refers to a live vector.
    pub fn contains_vector(&self, id: VectorId) -> bool {
        self.vectors.get(id.0).is_some()
    }

    /// The current value of a vector.
    pub fn vector(&self, id: VectorId) -> Option<Vec2> {
        self.vectors.get(id.0).map(|n| n.current)
    }

    /// The value a vector held before its last change.
    pub fn previous_vector(&self, id: VectorId) -> Option<Vec2> {
        self.vectors.get(id.0).map(|n| n.previous)
    }

    /// The x and y nodes of a vector.
    pub fn vector_parts(&self, id: VectorId) -> Option<(ValueId, ValueId)> {
        self.vectors.get(id.0).map(|n| (n.x, n.y))
    }

    /// Frame on which the vector last changed.
    pub fn vector_updated_frame(&self, id: VectorId) -> Option<u64> {
        self.vectors.get(id.0).map(|n| n.last_updated_frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder() -> (Rc<RefCell<Vec<ValueEvent>>>, impl FnMut(&ValueEvent) + 'static) {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        (events, move |e: &ValueEvent| sink.borrow_mut().push(*e))
    }

    #[test]
    fn test_leaf_write_notifies_change_then_press() {
        let mut graph = ValueGraph::new();
        let leaf = graph.create_leaf();
        let (events, callback) = recorder();
        graph.subscribe(leaf, callback).unwrap();

        graph.set_value(leaf, 1.0).unwrap();
        graph.set_value(leaf, 1.0).unwrap();

        let kinds: Vec<_> = events.borrow().iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![ValueEventKind::Changed, ValueEventKind::Pressed]);
        assert_eq!(graph.previous(leaf), Some(0.0));
    }

    #[test]
    fn test_virtual_value_tracks_its_sources() {
        let mut graph = ValueGraph::new();
        let a = graph.create_leaf();
        let b = graph.create_leaf();
        let c = graph.create_leaf();
        let max = graph.create_virtual(ChordResolution::Max);
        let min = graph.create_virtual(ChordResolution::Min);
        for source in [a, b, c] {
            graph.add_mapping(max, source).unwrap();
            graph.add_mapping(min, source).unwrap();
        }

        graph.set_value(a, 0.2).unwrap();
        graph.set_value(b, 0.8).unwrap();
        graph.set_value(c, 0.5).unwrap();

        assert_eq!(graph.value(max), Some(0.8));
        assert_eq!(graph.value(min), Some(0.2));
    }

    #[test]
    fn test_axis_is_positive_minus_negative() {
        let mut graph = ValueGraph::new();
        let right = graph.create_leaf();
        let left = graph.create_leaf();
        let axis = graph.create_axis();
        let (positive, negative) = graph.axis_parts(axis).unwrap();
        graph.add_mapping(positive, right).unwrap();
        graph.add_mapping(negative, left).unwrap();

        graph.set_value(right, 1.0).unwrap();
        assert_eq!(graph.value(axis), Some(1.0));
        graph.set_value(left, 1.0).unwrap();
        assert_eq!(graph.value(axis), Some(0.0));
        graph.set_value(right, 0.0).unwrap();
        assert_eq!(graph.value(axis), Some(-1.0));
        graph.set_value(left, 0.25).unwrap();
        assert_eq!(
            graph.value(axis),
            Some(graph.value(positive).unwrap() - graph.value(negative).unwrap())
        );
    }

    #[test]
    fn test_magnitude_axis_passes_signed_sources_through() {
        let mut graph = ValueGraph::new();
        let key = graph.create_leaf();
        let stick = graph.create_leaf();
        let axis = graph.create_axis_with_mode(ChordResolution::MaxAbs);
        let (positive, _) = graph.axis_parts(axis).unwrap();
        graph.add_mapping(positive, key).unwrap();
        graph.add_mapping(positive, stick).unwrap();

        graph.set_value(stick, -0.75).unwrap();
        assert_eq!(graph.value(axis), Some(-0.75));
        graph.set_value(key, 1.0).unwrap();
        assert_eq!(graph.value(axis), Some(1.0));

        // A plain Max axis swallows the same reading.
        let clamped = graph.create_axis();
        let (positive, _) = graph.axis_parts(clamped).unwrap();
        let idle = graph.create_leaf();
        graph.add_mapping(positive, stick).unwrap();
        graph.add_mapping(positive, idle).unwrap();
        assert_eq!(graph.value(clamped), Some(0.0));
    }

    #[test]
    fn test_mapping_rules() {
        let mut graph = ValueGraph::new();
        let leaf = graph.create_leaf();
        let other = graph.create_leaf();
        let axis = graph.create_axis();
        let chord = graph.create_virtual(ChordResolution::Max);

        assert_eq!(
            graph.add_mapping(leaf, other),
            Err(InputError::NotComposite { node: leaf })
        );
        assert_eq!(
            graph.add_mapping(axis, other),
            Err(InputError::NotComposite { node: axis })
        );
        assert_eq!(graph.add_mapping(chord, other), Ok(true));
        assert_eq!(graph.add_mapping(chord, other), Ok(false));
        assert_eq!(graph.sources(chord), Some(&[other][..]));
    }

    #[test]
    fn test_cycles_are_rejected() {
        let mut graph = ValueGraph::new();
        let a = graph.create_virtual(ChordResolution::Max);
        let b = graph.create_virtual(ChordResolution::Max);
        graph.add_mapping(b, a).unwrap();

        assert_eq!(
            graph.add_mapping(a, b),
            Err(InputError::CyclicMapping { node: a, mapped: b })
        );
        assert_eq!(
            graph.add_mapping(a, a),
            Err(InputError::CyclicMapping { node: a, mapped: a })
        );
    }

    #[test]
    fn test_mapping_resolves_immediately() {
        let mut graph = ValueGraph::new();
        let key = graph.create_leaf();
        graph.set_value(key, 1.0).unwrap();
        let chord = graph.create_virtual(ChordResolution::Max);
        graph.add_mapping(chord, key).unwrap();
        assert_eq!(graph.value(chord), Some(1.0));
    }

    #[test]
    fn test_refresh_empty_chord_is_a_precondition_error() {
        let mut graph = ValueGraph::new();
        let chord = graph.create_virtual(ChordResolution::Max);
        let leaf = graph.create_leaf();
        assert_eq!(graph.refresh(chord), Err(InputError::EmptyChord));
        assert_eq!(
            graph.refresh(leaf),
            Err(InputError::NotComposite { node: leaf })
        );
    }

    #[test]
    fn test_vector_notifies_once_per_effective_write() {
        let mut graph = ValueGraph::new();
        let x = graph.create_axis();
        let y = graph.create_axis();
        let vector = graph.create_vector(x, y).unwrap();
        let count = Rc::new(RefCell::new(0));
        let sink = count.clone();
        graph
            .subscribe_vector(vector, move |_| *sink.borrow_mut() += 1)
            .unwrap();

        graph.set_vector(vector, Vec2::new(0.5, -0.5)).unwrap();
        graph.set_vector(vector, Vec2::new(0.5, -0.5)).unwrap();

        assert_eq!(*count.borrow(), 1);
        assert_eq!(graph.vector(vector), Some(Vec2::new(0.5, -0.5)));
        assert_eq!(graph.value(x), Some(0.5));
        assert_eq!(graph.value(y), Some(-0.5));
    }

    #[test]
    fn test_vector_follows_axis_changes() {
        let mut graph = ValueGraph::new();
        let up = graph.create_leaf();
        let x = graph.create_axis();
        let y = graph.create_axis();
        let (positive, _) = graph.axis_parts(y).unwrap();
        graph.add_mapping(positive, up).unwrap();
        let vector = graph.create_vector(x, y).unwrap();

        graph.set_value(up, 1.0).unwrap();
        assert_eq!(graph.vector(vector), Some(Vec2::new(0.0, 1.0)));
        assert_eq!(graph.previous_vector(vector), Some(Vec2::ZERO));
    }

    #[test]
    fn test_remove_prunes_references() {
        let mut graph = ValueGraph::new();
        let a = graph.create_leaf();
        let b = graph.create_leaf();
        let chord = graph.create_virtual(ChordResolution::Max);
        graph.add_mapping(chord, a).unwrap();
        graph.add_mapping(chord, b).unwrap();
        graph.set_value(a, 1.0).unwrap();
        graph.set_value(b, 0.5).unwrap();

        graph.remove(a).unwrap();
        assert_eq!(graph.sources(chord), Some(&[b][..]));
        assert_eq!(graph.value(chord), Some(0.5));
        assert!(!graph.contains(a));
        assert_eq!(graph.set_value(a, 1.0), Err(InputError::InvalidHandle));
    }

    #[test]
    fn test_removing_an_axis_removes_its_sub_nodes() {
        let mut graph = ValueGraph::new();
        let axis = graph.create_axis();
        let (positive, negative) = graph.axis_parts(axis).unwrap();
        assert_eq!(graph.len(), 3);
        graph.remove(axis).unwrap();
        assert!(!graph.contains(positive));
        assert!(!graph.contains(negative));
        assert!(graph.is_empty());
    }

    #[test]
    fn test_recycled_slots_do_not_alias_stale_handles() {
        let mut graph = ValueGraph::new();
        let old = graph.create_leaf();
        graph.remove(old).unwrap();
        let new = graph.create_leaf();
        assert_ne!(old, new);
        assert_eq!(graph.value(old), None);
        assert_eq!(graph.value(new), Some(0.0));
    }

    #[test]
    fn test_unsubscribe_and_removal_drop_callbacks() {
        let mut graph = ValueGraph::new();
        let leaf = graph.create_leaf();
        let (events, callback) = recorder();
        let subscription = graph.subscribe(leaf, callback).unwrap();
        assert!(graph.unsubscribe(subscription));
        assert!(!graph.unsubscribe(subscription));
        graph.set_value(leaf, 1.0).unwrap();
        assert!(events.borrow().is_empty());

        let (_, callback) = recorder();
        let subscription = graph.subscribe(leaf, callback).unwrap();
        graph.remove(leaf).unwrap();
        assert!(!graph.unsubscribe(subscription));
    }

    #[test]
    fn test_just_pressed_follows_the_graph_frame() {
        let mut graph = ValueGraph::new();
        let leaf = graph.create_leaf();
        graph.set_frame(4);
        graph.set_value(leaf, 1.0).unwrap();
        assert!(graph.was_just_pressed(leaf));
        graph.set_frame(5);
        assert!(!graph.was_just_pressed(leaf));
        assert!(graph.is_down(leaf));
    }
}
