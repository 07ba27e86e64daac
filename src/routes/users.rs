use crate::{
    auth::{AuthenticatedUser, MessageResponse, UpdateProfileRequest},
    error::AppError,
    models::UserSummary,
    state::AppState,
};
use actix_web::{get, put, web, HttpResponse};
use validator::Validate;

/// Current user
///
/// Returns `{id, email, name}` of the caller.
#[get("/me")]
pub async fn me(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let user = state.users.get(user.id).await?;
    Ok(HttpResponse::Ok().json(UserSummary::from(&user)))
}

/// Update profile
///
/// The name is always replaced. Username and password change only when a non-empty
/// value is sent.
#[put("/profile")]
pub async fn update_profile(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    payload: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse, AppError> {
    let request = payload.into_inner().normalized();
    request.validate()?;

    state.users.update_profile(user.id, request.into()).await?;
    Ok(HttpResponse::Ok().json(MessageResponse {
        success: true,
        message: "profile updated successfully".into(),
    }))
}
