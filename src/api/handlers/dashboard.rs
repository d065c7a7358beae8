use crate::api::pages;
use crate::models::CurrentUser;
use axum::{Extension, response::Html};

pub async fn dashboard(Extension(user): Extension<CurrentUser>) -> Html<String> {
    pages::dashboard(&user.username)
}
