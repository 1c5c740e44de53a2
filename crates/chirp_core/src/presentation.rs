//! Display defaults applied at the view boundary.
//!
//! Core records keep optional user fields as `Option`; views call these
//! helpers instead of substituting placeholders themselves.

use crate::model::user::User;

pub const MISSING_NAME_LABEL: &str = "no name";
const GENERATED_AVATAR_BASE: &str = "https://source.boringavatars.com/beam/120/";
const GENERATED_AVATAR_PALETTE: &str = "264653,2a9d8f,e9c46a,f4a261,e76f51";

/// Returns the user's name or the placeholder label.
pub fn display_name(user: &User) -> &str {
    user.name.as_deref().unwrap_or(MISSING_NAME_LABEL)
}

/// Returns the user's avatar or a generated avatar keyed by user id.
pub fn avatar_url(user: &User) -> String {
    match user.image.as_deref() {
        Some(image) => image.to_string(),
        None => format!(
            "{GENERATED_AVATAR_BASE}{}?colors={GENERATED_AVATAR_PALETTE}",
            user.id
        ),
    }
}

/// Returns the `@handle` shown under a display name.
pub fn handle(user: &User) -> String {
    format!("@{}", user.id)
}
