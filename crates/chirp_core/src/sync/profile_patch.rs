//! Follow patching for cached profiles.

use crate::model::relation::{FollowEdge, RelationObject, RelationState};
use crate::model::user::{User, UserProfile};

/// Applies a follow toggle to one cached profile.
///
/// `follower` and `target` are the two users of the toggle, as already known
/// to the client. Returns `None` when the profile is on neither side, when
/// `state` is not a follow, or when the users do not match `state`.
pub fn patch_profile_follow(
    profile: &UserProfile,
    state: &RelationState,
    follower: &User,
    target: &User,
) -> Option<UserProfile> {
    let RelationObject::User(target_id) = &state.object else {
        return None;
    };
    if follower.id != state.subject_id || &target.id != target_id {
        return None;
    }

    let is_follower_side = profile.user.id == follower.id;
    let is_target_side = profile.user.id == target.id;
    if !is_follower_side && !is_target_side {
        return None;
    }

    let mut patched = profile.clone();
    if is_follower_side {
        set_edge(&mut patched.following, target, state);
    }
    if is_target_side {
        set_edge(&mut patched.followers, follower, state);
    }
    Some(patched)
}

fn set_edge(edges: &mut Vec<FollowEdge>, other: &User, state: &RelationState) {
    edges.retain(|edge| edge.user.id != other.id);
    if state.active {
        edges.push(FollowEdge {
            id: state.record_id,
            user: other.clone(),
        });
    }
}
