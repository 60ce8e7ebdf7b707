use url::Url;
use uuid::Uuid;

use crate::error::AppError;
use crate::recommendations::dto::CreateRecommendationRequest;
use crate::users::repo_types::{Role, User};

pub const TITLE_MAX: usize = 100;
pub const BLURB_MAX: usize = 280;
pub const LINK_MAX: usize = 2048;

/// Only plain web links are allowed; this keeps `javascript:` and friends
/// out of stored records entirely.
pub fn is_safe_url(link: &str) -> bool {
    match Url::parse(link) {
        Ok(url) => matches!(url.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

/// Field validation in fixed order (title, blurb, link), stopping at the
/// first failure so a submission surfaces exactly one code.
pub fn validate_recommendation(input: &CreateRecommendationRequest) -> Result<(), AppError> {
    if input.title.trim().is_empty() {
        return Err(AppError::TitleRequired);
    }
    if input.title.chars().count() > TITLE_MAX {
        return Err(AppError::TitleTooLong);
    }
    if input.blurb.trim().is_empty() {
        return Err(AppError::BlurbRequired);
    }
    if input.blurb.chars().count() > BLURB_MAX {
        return Err(AppError::BlurbTooLong);
    }
    if input.link.chars().count() > LINK_MAX {
        return Err(AppError::LinkTooLong);
    }
    if !is_safe_url(&input.link) {
        return Err(AppError::InvalidUrl);
    }
    Ok(())
}

/// Deletion is open to the owner and to admins; nobody else.
pub fn can_delete(caller: &User, owner_id: Uuid) -> bool {
    caller.id == owner_id || caller.role == Role::Admin
}

/// Exact-role gate. Ownership does not substitute for the role.
pub fn require_role(user: &User, role: Role) -> Result<(), AppError> {
    if user.role != role {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recommendations::repo_types::Genre;
    use time::OffsetDateTime;

    fn valid_input() -> CreateRecommendationRequest {
        CreateRecommendationRequest {
            title: "Dune".into(),
            genre: Genre::SciFi,
            link: "https://example.com".into(),
            blurb: "Great book".into(),
        }
    }

    fn user_with_role(role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            clerk_id: "user_1".into(),
            name: "Ada".into(),
            image_url: None,
            role,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn accepts_valid_input() {
        assert!(validate_recommendation(&valid_input()).is_ok());
    }

    #[test]
    fn rejects_empty_title() {
        let mut input = valid_input();
        input.title = "   ".into();
        assert!(matches!(
            validate_recommendation(&input),
            Err(AppError::TitleRequired)
        ));
    }

    #[test]
    fn rejects_over_length_title() {
        let mut input = valid_input();
        input.title = "x".repeat(TITLE_MAX + 1);
        assert!(matches!(
            validate_recommendation(&input),
            Err(AppError::TitleTooLong)
        ));
    }

    #[test]
    fn rejects_empty_and_over_length_blurb() {
        let mut input = valid_input();
        input.blurb = "".into();
        assert!(matches!(
            validate_recommendation(&input),
            Err(AppError::BlurbRequired)
        ));

        let mut input = valid_input();
        input.blurb = "x".repeat(BLURB_MAX + 1);
        assert!(matches!(
            validate_recommendation(&input),
            Err(AppError::BlurbTooLong)
        ));
    }

    #[test]
    fn rejects_over_length_link() {
        let mut input = valid_input();
        input.link = format!("https://example.com/{}", "x".repeat(LINK_MAX));
        assert!(matches!(
            validate_recommendation(&input),
            Err(AppError::LinkTooLong)
        ));
    }

    #[test]
    fn rejects_unsafe_links() {
        for link in ["javascript:alert(1)", "ftp://example.com/file", "not a url"] {
            let mut input = valid_input();
            input.link = link.into();
            assert!(
                matches!(validate_recommendation(&input), Err(AppError::InvalidUrl)),
                "expected INVALID_URL for {link}"
            );
        }
    }

    #[test]
    fn title_failure_wins_over_link_failure() {
        let mut input = valid_input();
        input.title = "".into();
        input.link = "javascript:alert(1)".into();
        // Fixed order: the title failure is the one surfaced.
        assert!(matches!(
            validate_recommendation(&input),
            Err(AppError::TitleRequired)
        ));
    }

    #[test]
    fn boundary_lengths_pass() {
        let mut input = valid_input();
        input.title = "x".repeat(TITLE_MAX);
        input.blurb = "x".repeat(BLURB_MAX);
        assert!(validate_recommendation(&input).is_ok());
    }

    #[test]
    fn owner_and_admin_can_delete() {
        let owner = user_with_role(Role::User);
        assert!(can_delete(&owner, owner.id));

        let admin = user_with_role(Role::Admin);
        assert!(can_delete(&admin, Uuid::new_v4()));
    }

    #[test]
    fn stranger_cannot_delete() {
        let stranger = user_with_role(Role::User);
        assert!(!can_delete(&stranger, Uuid::new_v4()));
    }

    #[test]
    fn require_role_is_exact() {
        let user = user_with_role(Role::User);
        assert!(matches!(
            require_role(&user, Role::Admin),
            Err(AppError::Forbidden)
        ));

        let admin = user_with_role(Role::Admin);
        assert!(require_role(&admin, Role::Admin).is_ok());
    }
}
