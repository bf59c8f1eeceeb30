//! Morph operations
//!
//! Membership changes keep two lists in step: the morph's member list and
//! the member's `morph_ids`. Records are never deleted here; an unlisted
//! relation or attribute stays in the registry for other morphs.

use crate::error::{GraphError, GraphResult};
use crate::model::{morph_id, MemberKind, Morph};
use crate::registry::Registry;

impl Registry {
    /// Create a morph on a node, optionally copying another morph's members
    ///
    /// # Errors
    /// - [`GraphError::UnknownNode`] if the node does not exist
    /// - [`GraphError::MorphExists`] if a morph with that name exists
    /// - [`GraphError::UnknownMorph`] if `copy_from` is not on the node
    pub fn create_morph(
        &mut self,
        node_id: &str,
        name: &str,
        copy_from: Option<&str>,
    ) -> GraphResult<String> {
        let node = self.require_node_mut(node_id)?;
        let new_id = morph_id(name, node_id)?;
        node.ensure_default_morph();
        if node.morph(&new_id).is_some() {
            return Err(GraphError::MorphExists {
                node_id: node_id.to_string(),
                morph_id: new_id,
            });
        }

        let mut morph = Morph::new(name, node_id)?;
        if let Some(reference) = copy_from {
            let source = node
                .morph(reference)
                .ok_or_else(|| GraphError::unknown_morph(node_id, reference))?;
            morph.relation_ids = source.relation_ids.clone();
            morph.attribute_ids = source.attribute_ids.clone();
        }
        node.morphs.push(morph.clone());

        for id in &morph.relation_ids {
            if let Some(relation) = self.relations.get_mut(id) {
                relation.morph_ids.insert(new_id.clone());
            }
        }
        for id in &morph.attribute_ids {
            if let Some(attribute) = self.attributes.get_mut(id) {
                attribute.morph_ids.insert(new_id.clone());
            }
        }

        tracing::info!(node = %node_id, morph = %new_id, copied_from = ?copy_from, "created morph");
        Ok(new_id)
    }

    /// Make `morph_id` the node's active morph
    ///
    /// # Errors
    /// Returns an error if the node or morph does not exist.
    pub fn set_active_morph(&mut self, node_id: &str, morph_id: &str) -> GraphResult<()> {
        let node = self.require_node_mut(node_id)?;
        if node.morph(morph_id).is_none() {
            return Err(GraphError::unknown_morph(node_id, morph_id));
        }
        node.active_morph = Some(morph_id.to_string());
        tracing::debug!(node = %node_id, morph = %morph_id, "activated morph");
        Ok(())
    }

    /// Also list a member in `to_morph`; the source morph keeps it
    ///
    /// # Errors
    /// Returns an error if the member, its source node or the morph on
    /// that node does not exist.
    pub fn copy_member(&mut self, kind: MemberKind, member_id: &str, to_morph: &str) -> GraphResult<()> {
        let node_id = self.member_source(kind, member_id)?.to_string();
        self.require_node_mut(&node_id)?
            .require_morph_mut(to_morph)?
            .members_mut(kind)
            .insert(member_id.to_string());
        self.member_morph_ids_mut(kind, member_id)?
            .insert(to_morph.to_string());

        tracing::debug!(%kind, member = %member_id, morph = %to_morph, "copied member");
        Ok(())
    }

    /// List a member in `to_morph` and drop it from `from_morph`
    ///
    /// # Errors
    /// Returns an error if the member or either morph does not exist.
    pub fn move_member(
        &mut self,
        kind: MemberKind,
        member_id: &str,
        from_morph: &str,
        to_morph: &str,
    ) -> GraphResult<()> {
        let node_id = self.member_source(kind, member_id)?.to_string();
        if self.require_node_mut(&node_id)?.morph(from_morph).is_none() {
            return Err(GraphError::unknown_morph(node_id, from_morph));
        }
        self.copy_member(kind, member_id, to_morph)?;
        if from_morph != to_morph {
            self.unlist_member(kind, member_id, from_morph)?;
        }
        Ok(())
    }

    /// Remove a member from one morph without deleting its record
    ///
    /// # Errors
    /// Returns an error if the member, its source node or the morph does
    /// not exist.
    pub fn unlist_member(&mut self, kind: MemberKind, member_id: &str, morph: &str) -> GraphResult<()> {
        let node_id = self.member_source(kind, member_id)?.to_string();
        self.require_node_mut(&node_id)?
            .require_morph_mut(morph)?
            .members_mut(kind)
            .shift_remove(member_id);
        self.member_morph_ids_mut(kind, member_id)?
            .shift_remove(morph);

        tracing::debug!(%kind, member = %member_id, morph = %morph, "unlisted member");
        Ok(())
    }

    /// Remove a non-default morph, unlisting all of its members
    ///
    /// The default morph becomes active if the removed morph was active.
    ///
    /// # Errors
    /// Returns [`GraphError::DefaultMorph`] for the default morph, or an
    /// error if the node or morph does not exist.
    pub fn delete_morph(&mut self, node_id: &str, morph: &str) -> GraphResult<()> {
        let node = self.require_node_mut(node_id)?;
        if morph == node_id {
            return Err(GraphError::DefaultMorph(node_id.to_string()));
        }
        let index = node
            .morphs
            .iter()
            .position(|m| m.morph_id == morph)
            .ok_or_else(|| GraphError::unknown_morph(node_id, morph))?;
        let removed = node.morphs.remove(index);
        if node.active_morph.as_deref() == Some(morph) {
            let default_id = node.ensure_default_morph().morph_id.clone();
            node.active_morph = Some(default_id);
        }

        for id in &removed.relation_ids {
            if let Some(relation) = self.relations.get_mut(id) {
                relation.morph_ids.shift_remove(morph);
            }
        }
        for id in &removed.attribute_ids {
            if let Some(attribute) = self.attributes.get_mut(id) {
                attribute.morph_ids.shift_remove(morph);
            }
        }

        tracing::info!(node = %node_id, morph = %morph, "deleted morph");
        Ok(())
    }
}
