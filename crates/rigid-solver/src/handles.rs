//! Handle groups: rigidly transformed sets of constrained vertices.
//!
//! Interactive hosts rarely move handle vertices one by one. They select a
//! group of vertices and drag it with a single rigid transform. A
//! [`HandleSet`] keeps those groups in insertion order and flattens them
//! into the constraint index list and the per-step target buffer.

use serde::{Deserialize, Serialize};

use rigid_math::{DAffine3, DVec3};
use rigid_types::{HandleGroupId, RigidError, RigidResult, VertexId};

/// A set of handle vertices moved by one rigid transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandleGroup {
    /// Identifier assigned by the owning [`HandleSet`].
    pub id: HandleGroupId,
    /// Member vertices, in the order their targets are emitted.
    pub vertices: Vec<VertexId>,
    /// Transform from rest positions to targets.
    pub transform: DAffine3,
}

impl HandleGroup {
    /// Target of every member: the transform applied to its rest position.
    pub fn targets(&self, rest: &[DVec3]) -> RigidResult<Vec<DVec3>> {
        self.vertices
            .iter()
            .map(|v| {
                rest.get(v.index())
                    .map(|&p| self.transform.transform_point3(p))
                    .ok_or_else(|| {
                        RigidError::constraint(
                            v.0,
                            format!("out of range (vertex count: {})", rest.len()),
                        )
                    })
            })
            .collect()
    }
}

/// Ordered collection of handle groups with no vertex shared between groups.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HandleSet {
    groups: Vec<HandleGroup>,
    next_id: u32,
}

impl HandleSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a group at the identity transform.
    ///
    /// Fails with [`RigidError::InvalidConstraintIndex`] if a vertex is
    /// listed twice or already belongs to another group.
    pub fn add_group(&mut self, vertices: &[u32]) -> RigidResult<HandleGroupId> {
        self.add_group_with_transform(vertices, DAffine3::IDENTITY)
    }

    /// Adds a group with an initial transform.
    pub fn add_group_with_transform(
        &mut self,
        vertices: &[u32],
        transform: DAffine3,
    ) -> RigidResult<HandleGroupId> {
        for (k, &v) in vertices.iter().enumerate() {
            if vertices[..k].contains(&v) {
                return Err(RigidError::constraint(v, "listed twice in the same group"));
            }
            if let Some(owner) = self.owner_of(VertexId(v)) {
                return Err(RigidError::constraint(
                    v,
                    format!("already a member of handle group {}", owner.0),
                ));
            }
        }

        let id = HandleGroupId(self.next_id);
        self.next_id += 1;
        self.groups.push(HandleGroup {
            id,
            vertices: vertices.iter().map(|&v| VertexId(v)).collect(),
            transform,
        });
        Ok(id)
    }

    /// Removes a group and returns it.
    pub fn remove_group(&mut self, id: HandleGroupId) -> RigidResult<HandleGroup> {
        let position = self.position(id)?;
        Ok(self.groups.remove(position))
    }

    /// Replaces a group's transform.
    pub fn set_transform(&mut self, id: HandleGroupId, transform: DAffine3) -> RigidResult<()> {
        let position = self.position(id)?;
        self.groups[position].transform = transform;
        Ok(())
    }

    /// Looks up a group.
    pub fn group(&self, id: HandleGroupId) -> Option<&HandleGroup> {
        self.groups.iter().find(|g| g.id == id)
    }

    /// Groups in insertion order.
    pub fn groups(&self) -> &[HandleGroup] {
        &self.groups
    }

    /// The group owning vertex `v`, if any.
    pub fn owner_of(&self, v: VertexId) -> Option<HandleGroupId> {
        self.groups
            .iter()
            .find(|g| g.vertices.contains(&v))
            .map(|g| g.id)
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Returns true if there are no groups.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of handle vertices.
    pub fn vertex_count(&self) -> usize {
        self.groups.iter().map(|g| g.vertices.len()).sum()
    }

    /// Removes every group. Identifiers are not reused.
    pub fn clear(&mut self) {
        self.groups.clear();
    }

    /// Flattened handle vertex list, group by group.
    pub fn constraint_indices(&self) -> Vec<usize> {
        self.groups
            .iter()
            .flat_map(|g| g.vertices.iter().map(|v| v.index()))
            .collect()
    }

    /// Flattened targets, aligned with [`HandleSet::constraint_indices`].
    pub fn targets(&self, rest: &[DVec3]) -> RigidResult<Vec<DVec3>> {
        let mut out = Vec::with_capacity(self.vertex_count());
        for group in &self.groups {
            out.extend(group.targets(rest)?);
        }
        Ok(out)
    }

    fn position(&self, id: HandleGroupId) -> RigidResult<usize> {
        self.groups
            .iter()
            .position(|g| g.id == id)
            .ok_or_else(|| RigidError::InvalidInput(format!("Unknown handle group {}", id.0)))
    }
}
