//! Server-rendered todo list page.
//!
//! The page is a plain HTML form posting back to the same URL, so it works
//! with scripting disabled.

use domain::TodoItem;

use crate::html_escape;

/// State of the submission form for one render.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormState {
    /// Value to put back into the input; empty after a successful add.
    pub value: String,
    /// Field-level error shown under the input.
    pub error: Option<String>,
}

impl FormState {
    /// Fresh form, also used after a successful submission.
    pub fn cleared() -> Self {
        Self::default()
    }

    /// Form rejected by validation; keeps what the user typed.
    pub fn rejected(value: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            error: Some(error.into()),
        }
    }
}

/// Render the full page for the given list and form state.
pub fn render_todo_page(items: &[TodoItem], form: &FormState) -> String {
    let list_html = if items.is_empty() {
        r#"<span class="empty">No items found</span>"#.to_string()
    } else {
        let rows: String = items
            .iter()
            .map(|item| format!("\n                <li>{}</li>", html_escape(item.text())))
            .collect();
        format!(
            "<ul class=\"list\">{rows}\n            </ul>",
            rows = rows
        )
    };

    let (error_html, invalid_attr) = match &form.error {
        Some(msg) => (
            format!(
                r#"<p class="error" id="text-error" role="alert">{}</p>"#,
                html_escape(msg)
            ),
            r#" aria-invalid="true" aria-describedby="text-error""#,
        ),
        None => (String::new(), ""),
    };

    layout(
        "Todo List",
        &format!(
            r##"<div class="container">
            <h1><span class="highlight">TODO</span> List</h1>
        </div>
        <div class="container">
            {list}
        </div>
        <div class="container">
            <form method="post" action="">
                <input type="text" name="text" value="{value}" required class="input"{invalid}>
                <button type="submit" class="button">Add item</button>
                {error}
            </form>
            <p class="hint">PS: This little app works even when JavaScript is disabled.</p>
        </div>"##,
            list = list_html,
            value = html_escape(&form.value),
            invalid = invalid_attr,
            error = error_html,
        ),
    )
}

/// Generic failure page. Never includes internal error detail.
pub fn render_error_page() -> String {
    layout(
        "Something went wrong",
        r##"<div class="container">
            <h1>Something went wrong</h1>
            <p class="hint">The todo list is unavailable right now. Please try again later.</p>
            <p><a href="">Reload</a></p>
        </div>"##,
    )
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>
        * {{ margin: 0; padding: 0; box-sizing: border-box; }}
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            background: #f8fafc;
            color: #1e293b;
            min-height: 100vh;
            padding: 40px 20px;
        }}
        .container {{
            max-width: 500px;
            margin: 0 auto 24px;
            text-align: center;
        }}
        h1 {{ font-size: 2rem; }}
        .highlight {{ color: #6366f1; }}
        .list {{
            list-style: none;
            background: white;
            border-radius: 8px;
            box-shadow: 0 1px 3px rgba(0,0,0,0.1);
            text-align: left;
        }}
        .list li {{
            padding: 12px 16px;
            border-bottom: 1px solid #f1f5f9;
            word-break: break-word;
        }}
        .list li:last-child {{ border-bottom: none; }}
        .empty {{ color: #64748b; }}
        .input {{
            padding: 10px 12px;
            border: 1px solid #cbd5e1;
            border-radius: 8px;
            width: 60%;
        }}
        .input[aria-invalid="true"] {{ border-color: #dc2626; }}
        .button {{
            padding: 10px 20px;
            background: #1e293b;
            color: white;
            border: none;
            border-radius: 8px;
            font-weight: 600;
            cursor: pointer;
        }}
        .error {{ color: #dc2626; margin-top: 8px; font-size: 0.875rem; }}
        .hint {{ color: #64748b; margin-top: 16px; font-size: 0.875rem; }}
    </style>
</head>
<body>
        {body}
</body>
</html>"##,
        title = html_escape(title),
        body = body,
    )
}
