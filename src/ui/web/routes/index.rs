use axum::http::{HeaderValue, header};
use axum::response::{Html, IntoResponse, Response};

use crate::ui::web::templates;

fn no_cache(mut resp: Response) -> Response {
    let h = resp.headers_mut();
    h.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-store, no-cache, must-revalidate"),
    );
    h.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    h.insert(header::EXPIRES, HeaderValue::from_static("0"));
    resp
}

pub(crate) async fn index() -> Response {
    no_cache(Html(templates::INDEX_HTML).into_response())
}

pub(crate) async fn asset_css() -> Response {
    no_cache(
        (
            [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
            templates::APP_CSS,
        )
            .into_response(),
    )
}

pub(crate) async fn asset_js() -> Response {
    no_cache(
        (
            [(
                header::CONTENT_TYPE,
                "application/javascript; charset=utf-8",
            )],
            templates::APP_JS,
        )
            .into_response(),
    )
}
