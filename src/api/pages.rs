//! Server-rendered HTML pages. The templates are compiled into the binary and
//! filled by plain placeholder substitution.

use crate::utils::html::escape;
use axum::response::Html;

const LOGIN_TEMPLATE: &str = include_str!("../../templates/index.html");
const DASHBOARD_TEMPLATE: &str = include_str!("../../templates/dashboard.html");

pub fn login(flash: Option<&str>) -> Html<String> {
    Html(LOGIN_TEMPLATE.replace("{{flash}}", &escape(flash.unwrap_or_default())))
}

pub fn dashboard(username: &str) -> Html<String> {
    Html(DASHBOARD_TEMPLATE.replace("{{username}}", &escape(username)))
}
