//! Obstacle dependents lists.
//!
//! Every obstacle voxel owns a doubly-linked list threading through the
//! voxels that currently claim it as their closest occupied cell. The list
//! nodes live inside the voxel payloads themselves ([`EsdfVoxel::head_idx`],
//! [`EsdfVoxel::prev_idx`], [`EsdfVoxel::next_idx`]) and are addressed by
//! global index, so membership changes are O(1) with no allocation.
//!
//! An obstacle is a member of its own list: when it becomes an obstacle the
//! list is empty and the head points at the obstacle itself. Because later
//! members are always inserted at the head, the obstacle stays at the tail,
//! which is what lets deletion traverse the whole list by walking `prev`
//! links from the obstacle.
//!
//! Neither operation touches `coc_idx`, `distance`, or queue state; the
//! update engine composes those.

use esdf_types::{EsdfVoxel, GlobalIndex, Result};

use crate::layer::Layer;

/// Inserts `member` at the head of `obstacle`'s dependents list.
///
/// The member must not already be in any list (its `prev_idx`/`next_idx`
/// are undefined); the engine always unlinks before re-homing.
///
/// # Errors
///
/// Returns [`esdf_types::EsdfError::MissingVoxel`] if a touched voxel's
/// block is not allocated.
pub fn push_front(
    layer: &mut Layer<EsdfVoxel>,
    obstacle: GlobalIndex,
    member: GlobalIndex,
) -> Result<()> {
    let head = layer.try_voxel(obstacle)?.head_idx;
    if head.is_defined() {
        layer.try_voxel_mut(head)?.prev_idx = member;
        let member_vox = layer.try_voxel_mut(member)?;
        member_vox.next_idx = head;
        member_vox.prev_idx = GlobalIndex::UNDEF;
    }
    layer.try_voxel_mut(obstacle)?.head_idx = member;
    Ok(())
}

/// Removes `member` from `obstacle`'s dependents list and clears its links.
///
/// # Errors
///
/// Returns [`esdf_types::EsdfError::MissingVoxel`] if a touched voxel's
/// block is not allocated.
pub fn unlink(
    layer: &mut Layer<EsdfVoxel>,
    obstacle: GlobalIndex,
    member: GlobalIndex,
) -> Result<()> {
    let (prev, next) = {
        let vox = layer.try_voxel(member)?;
        (vox.prev_idx, vox.next_idx)
    };

    if prev.is_defined() {
        layer.try_voxel_mut(prev)?.next_idx = next;
    } else {
        // The member was the head.
        layer.try_voxel_mut(obstacle)?.head_idx = next;
    }
    if next.is_defined() {
        layer.try_voxel_mut(next)?.prev_idx = prev;
    }

    let vox = layer.try_voxel_mut(member)?;
    vox.prev_idx = GlobalIndex::UNDEF;
    vox.next_idx = GlobalIndex::UNDEF;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn layer_with_voxels(indices: &[GlobalIndex]) -> Layer<EsdfVoxel> {
        let mut layer: Layer<EsdfVoxel> = Layer::new(0.1, 8);
        for &idx in indices {
            let vox = layer.allocate_voxel_mut(idx);
            vox.self_idx = idx;
            vox.observed = true;
        }
        layer
    }

    /// Walks the list from the head, asserting link symmetry, and returns
    /// the member sequence.
    fn walk(layer: &Layer<EsdfVoxel>, obstacle: GlobalIndex) -> Vec<GlobalIndex> {
        let mut members = Vec::new();
        let mut cursor = layer.voxel(obstacle).unwrap().head_idx;
        let mut prev = GlobalIndex::UNDEF;
        while cursor.is_defined() {
            let vox = layer.voxel(cursor).unwrap();
            assert_eq!(vox.prev_idx, prev, "prev link mismatch at {cursor:?}");
            members.push(cursor);
            assert!(members.len() <= 1000, "cycle detected");
            prev = cursor;
            cursor = vox.next_idx;
        }
        members
    }

    #[test]
    fn push_front_builds_lifo_order() {
        let obstacle = GlobalIndex::new(0, 0, 0);
        let a = GlobalIndex::new(1, 0, 0);
        let b = GlobalIndex::new(2, 0, 0);
        let mut layer = layer_with_voxels(&[obstacle, a, b]);

        push_front(&mut layer, obstacle, obstacle).unwrap();
        push_front(&mut layer, obstacle, a).unwrap();
        push_front(&mut layer, obstacle, b).unwrap();

        // The obstacle inserted itself first, so it ends up at the tail.
        assert_eq!(walk(&layer, obstacle), vec![b, a, obstacle]);
    }

    #[test]
    fn unlink_head_middle_tail() {
        let obstacle = GlobalIndex::new(0, 0, 0);
        let members: Vec<GlobalIndex> = (1..=3).map(|x| GlobalIndex::new(x, 0, 0)).collect();
        let mut all = vec![obstacle];
        all.extend(&members);
        let mut layer = layer_with_voxels(&all);

        push_front(&mut layer, obstacle, obstacle).unwrap();
        for &m in &members {
            push_front(&mut layer, obstacle, m).unwrap();
        }
        // head = members[2], then members[1], members[0], obstacle.

        // middle
        unlink(&mut layer, obstacle, members[1]).unwrap();
        assert_eq!(walk(&layer, obstacle), vec![members[2], members[0], obstacle]);

        // head
        unlink(&mut layer, obstacle, members[2]).unwrap();
        assert_eq!(walk(&layer, obstacle), vec![members[0], obstacle]);

        // tail (the obstacle's own self-entry)
        unlink(&mut layer, obstacle, obstacle).unwrap();
        assert_eq!(walk(&layer, obstacle), vec![members[0]]);

        unlink(&mut layer, obstacle, members[0]).unwrap();
        assert!(walk(&layer, obstacle).is_empty());
    }

    #[test]
    fn unlink_clears_links() {
        let obstacle = GlobalIndex::new(0, 0, 0);
        let a = GlobalIndex::new(1, 0, 0);
        let mut layer = layer_with_voxels(&[obstacle, a]);

        push_front(&mut layer, obstacle, obstacle).unwrap();
        push_front(&mut layer, obstacle, a).unwrap();
        unlink(&mut layer, obstacle, a).unwrap();

        let vox = layer.voxel(a).unwrap();
        assert!(!vox.prev_idx.is_defined());
        assert!(!vox.next_idx.is_defined());
    }

    #[test]
    fn missing_voxel_is_an_error() {
        let obstacle = GlobalIndex::new(0, 0, 0);
        let mut layer = layer_with_voxels(&[obstacle]);
        let far = GlobalIndex::new(1000, 1000, 1000);
        assert!(push_front(&mut layer, obstacle, far).is_err());
    }

    proptest! {
        /// Random insert/unlink interleavings keep the list well-formed and
        /// matching a model vector.
        #[test]
        fn random_ops_stay_well_formed(ops in prop::collection::vec((0usize..8, prop::bool::ANY), 1..64)) {
            let obstacle = GlobalIndex::new(0, 0, 0);
            let candidates: Vec<GlobalIndex> =
                (1..=8).map(|x| GlobalIndex::new(x, 0, 0)).collect();
            let mut all = vec![obstacle];
            all.extend(&candidates);
            let mut layer = layer_with_voxels(&all);
            push_front(&mut layer, obstacle, obstacle).unwrap();

            // Model: front-of-vec is the head. The obstacle stays at the back.
            let mut model = vec![obstacle];
            for (slot, insert) in ops {
                let member = candidates[slot];
                let in_list = model.contains(&member);
                if insert && !in_list {
                    push_front(&mut layer, obstacle, member).unwrap();
                    model.insert(0, member);
                } else if !insert && in_list {
                    unlink(&mut layer, obstacle, member).unwrap();
                    model.retain(|m| *m != member);
                }
                prop_assert_eq!(&walk(&layer, obstacle), &model);
            }
        }
    }
}
