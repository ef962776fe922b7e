//! Dashboard page
//!
//! Server-rendered listing of the five sections. Buttons call the JSON API
//! and reload; sync and add are asynchronous, so results show up on a later
//! reload.

use axum::{
    extract::State,
    response::{Html, IntoResponse},
    routing::get,
    Router,
};

use crate::{api::songs::SongsResponse, models::SongRecord, AppState};

/// GET /
pub async fn dashboard(State(state): State<AppState>) -> impl IntoResponse {
    let data: SongsResponse = state.crawler.snapshot().await.into();

    let sections = [
        ("general", "New", &data.general),
        ("video", "Video", &data.video),
        ("piano", "Piano", &data.piano),
        ("followed", "Followed", &data.followed),
        ("favorites", "Favorites", &data.favorites),
    ];

    let mut body = String::new();
    for (id, label, songs) in sections {
        body.push_str(&format!(
            r#"<section id="{id}"><h2>{label} <span class="count">{count}</span></h2><ul>"#,
            id = id,
            label = label,
            count = songs.len()
        ));
        for song in songs.iter() {
            body.push_str(&render_song(song, &data));
        }
        body.push_str("</ul></section>");
    }

    let html = format!(
        r#"<!DOCTYPE html>
<html lang="ja">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>tabwatch</title>
    <style>
        body {{ background: #121212; color: #f0f0f0; font-family: sans-serif; margin: 0; padding: 32px; }}
        section {{ margin-bottom: 32px; }}
        ul {{ list-style: none; padding: 0; }}
        li {{ padding: 6px 0; border-bottom: 1px solid #2c2c2e; }}
        li.followed .artist {{ color: #ff453a; }}
        .artist {{ color: #a1a1a6; margin-left: 8px; }}
        .tag {{ font-size: 0.8em; background: #2c2c2e; border-radius: 8px; padding: 1px 6px; margin-left: 4px; }}
        .count {{ color: #a1a1a6; font-size: 0.7em; }}
        button {{ background: #2c2c2e; color: #f0f0f0; border: 1px solid #444; border-radius: 6px; cursor: pointer; }}
        a {{ color: #2997ff; }}
    </style>
</head>
<body>
    <header>
        <h1>tabwatch</h1>
        <button onclick="post('/api/sync', {{}})">Sync now</button>
        <input id="add-url" placeholder="https://..." size="48">
        <button onclick="post('/api/add_url', {{url: document.getElementById('add-url').value}})">Add</button>
        <input id="follow" placeholder="artist">
        <button onclick="post('/api/follow', {{value: document.getElementById('follow').value}})">Follow</button>
        <span class="count">v{version}</span>
    </header>
    {body}
    <script>
        async function post(path, payload) {{
            await fetch(path, {{
                method: 'POST',
                headers: {{ 'Content-Type': 'application/json' }},
                body: JSON.stringify(payload)
            }});
            location.reload();
        }}
    </script>
</body>
</html>"#,
        version = env!("CARGO_PKG_VERSION"),
        body = body,
    );

    Html(html)
}

fn render_song(song: &SongRecord, data: &SongsResponse) -> String {
    let followed = crate::classifier::matches_followed(&data.followed_artists, &song.artist);
    let favorite = data.favorite_urls.iter().any(|u| u == &song.url);

    let tags: String = song
        .tags
        .iter()
        .map(|t| format!(r#"<span class="tag">{}</span>"#, escape_html(t)))
        .collect();

    format!(
        r#"<li class="{class}"><a href="{url}" target="_blank">{title}</a><span class="artist">{artist}</span>{tags}
<button onclick='post("/api/favorite", {{value: {url_js}}})'>{star}</button></li>"#,
        class = if followed { "followed" } else { "" },
        url = escape_html(&song.url),
        title = escape_html(&song.title),
        artist = escape_html(&song.artist),
        tags = tags,
        url_js = escape_html(&serde_json::Value::String(song.url.clone()).to_string()),
        star = if favorite { "★" } else { "☆" },
    )
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn ui_routes() -> Router<AppState> {
    Router::new().route("/", get(dashboard))
}
