use crate::error::AppError;
use crate::utils::Identity;

/// Update and delete are allowed only for the identity that owns the
/// resource. There is no identity-0 bypass.
pub fn authorize_mutation(caller: Identity, owner: Identity) -> Result<(), AppError> {
    if caller == owner {
        Ok(())
    } else {
        tracing::warn!("identity {} attempted to mutate resource owned by {}", caller, owner);
        Err(AppError::Unauthorized)
    }
}

/// Creation additionally requires the body to name an author at all.
pub fn authorize_creation(caller: Identity, claimed_author: Identity) -> Result<(), AppError> {
    if claimed_author.is_missing() {
        return Err(AppError::MissingAuthor);
    }
    authorize_mutation(caller, claimed_author)
}
