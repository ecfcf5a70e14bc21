//! Document shell: the HTML page hosting the browser client.

use std::sync::Arc;

use axum::{extract::State, response::Html};

use crate::config::DocumentConfig;
use crate::state::AppState;
use crate::util::{escape_html, fill_template};

/// Baseline reset so the page renders consistently before the client styles load.
const BASELINE_CSS: &str = "*,*::before,*::after{box-sizing:border-box}\
html,body{margin:0;padding:0;min-height:100%}\
body{font-family:'Open Sans',-apple-system,BlinkMacSystemFont,'Segoe UI',Roboto,sans-serif;\
-webkit-font-smoothing:antialiased;-moz-osx-font-smoothing:grayscale;line-height:1.5}\
img,svg{display:block;max-width:100%}\
button,input{font:inherit}";

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="{lang}">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style id="baseline">{css}</style>
{links}
</head>
<body>
<div id="__app"></div>
<script type="module" src="{script}"></script>
</body>
</html>
"#;

pub fn render_document(cfg: &DocumentConfig) -> String {
  let mut links = Vec::with_capacity(cfg.font_urls.len() + 1);
  if !cfg.font_preconnect.is_empty() {
    links.push(format!(r#"<link rel="preconnect" href="{}">"#, escape_html(&cfg.font_preconnect)));
  }
  for url in &cfg.font_urls {
    links.push(format!(r#"<link rel="stylesheet" href="{}">"#, escape_html(url)));
  }
  let links = links.join("\n");
  let lang = escape_html(&cfg.lang);
  let title = escape_html(&cfg.title);
  let script = escape_html(&cfg.script_src);

  // Title last: nothing is substituted after it.
  fill_template(
    TEMPLATE,
    &[
      ("css", BASELINE_CSS),
      ("links", links.as_str()),
      ("script", script.as_str()),
      ("lang", lang.as_str()),
      ("title", title.as_str()),
    ],
  )
}

/// Serves the shell for `/` and for client-side routes with no static file.
pub async fn serve_document(State(state): State<Arc<AppState>>) -> Html<String> {
  Html(render_document(&state.config.document))
}
