//! Minimal server-rendered HTML. Every interpolated value goes through
//! [`escape`]; catalog text is shown as plain text, never as markup.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};

use shared::types::{GameDetail, GameSummary, RatingScore, RatingTally, ReviewedGame};

use crate::database::comments::CommentView;
use crate::database::users::UserRecord;

pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, signed_in: bool, body: &str) -> String {
    let account = if signed_in {
        r#"<a href="/account">Account</a>
<form method="post" action="/logout" class="inline"><button type="submit">Log out</button></form>"#
    } else {
        r#"<a href="/login">Log in</a> <a href="/register">Register</a>"#
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | GameReviews</title>
<link rel="stylesheet" href="/static/site.css">
</head>
<body>
<header>
<a href="/" class="brand">GameReviews</a>
<form method="get" action="/search"><input type="search" name="query" placeholder="Search games"></form>
<nav>{account}</nav>
</header>
<main>
{body}
</main>
</body>
</html>
"#,
        title = escape(title),
        account = account,
        body = body
    )
}

fn error_list(errors: &[String]) -> String {
    if errors.is_empty() {
        return String::new();
    }
    let mut out = String::from(r#"<ul class="errors">"#);
    for e in errors {
        let _ = write!(out, "<li>{}</li>", escape(e));
    }
    out.push_str("</ul>");
    out
}

pub fn message_page(title: &str, message: &str, signed_in: bool) -> String {
    layout(
        title,
        signed_in,
        &format!("<h1>{}</h1>\n<p>{}</p>", escape(title), escape(message)),
    )
}

fn game_card(game: &GameSummary) -> String {
    let mut card = format!(
        r#"<li class="game"><a href="/game/{id}">"#,
        id = game.id
    );
    if let Some(img) = &game.background_image {
        let _ = write!(card, r#"<img src="{}" alt="" loading="lazy">"#, escape(img));
    }
    let _ = write!(card, "<h2>{}</h2></a>", escape(&game.name));

    let platforms = game.platform_names().join(", ");
    if !platforms.is_empty() {
        let _ = write!(card, r#"<p class="platforms">{}</p>"#, escape(&platforms));
    }
    if let Some(score) = game.metacritic {
        let _ = write!(card, r#"<p class="metacritic">Metacritic {}</p>"#, score);
    }
    card.push_str("</li>");
    card
}

fn game_list(games: &[GameSummary]) -> String {
    if games.is_empty() {
        return "<p>No games found.</p>".to_string();
    }
    let mut out = String::from(r#"<ul class="games">"#);
    for g in games {
        out.push_str(&game_card(g));
    }
    out.push_str("</ul>");
    out
}

pub fn index_page(games: &[GameSummary], signed_in: bool) -> String {
    layout(
        "Trending",
        signed_in,
        &format!("<h1>Trending games</h1>\n{}", game_list(games)),
    )
}

pub fn search_page(query: &str, games: &[GameSummary], signed_in: bool) -> String {
    let heading = if query.trim().is_empty() {
        "<h1>Search</h1>".to_string()
    } else {
        format!("<h1>Results for &ldquo;{}&rdquo;</h1>", escape(query))
    };
    layout("Search", signed_in, &format!("{}\n{}", heading, game_list(games)))
}

pub fn game_page(
    game: &GameDetail,
    tally: &RatingTally,
    current: Option<RatingScore>,
    signed_in: bool,
) -> String {
    let mut body = format!("<h1>{}</h1>\n", escape(&game.name));

    if let Some(img) = &game.background_image {
        let _ = writeln!(body, r#"<img class="hero" src="{}" alt="">"#, escape(img));
    }
    if let Some(released) = &game.released {
        let _ = writeln!(body, "<p>Released {}</p>", escape(released));
    }
    let genres: Vec<&str> = game.genres.iter().map(|g| g.name.as_str()).collect();
    if !genres.is_empty() {
        let _ = writeln!(body, "<p>Genres: {}</p>", escape(&genres.join(", ")));
    }
    let publishers: Vec<&str> = game.publishers.iter().map(|p| p.name.as_str()).collect();
    if !publishers.is_empty() {
        let _ = writeln!(body, "<p>Publishers: {}</p>", escape(&publishers.join(", ")));
    }
    if let Some(desc) = &game.description_raw {
        let _ = writeln!(body, r#"<p class="description">{}</p>"#, escape(desc));
    }

    let _ = write!(
        body,
        r#"<section class="ratings"><h2>Ratings ({})</h2><ul>"#,
        tally.total()
    );
    for score in RatingScore::ALL {
        let _ = write!(
            body,
            "<li>{}: {}</li>",
            score.label(),
            tally.count(score)
        );
    }
    body.push_str("</ul>");

    if signed_in {
        let _ = write!(
            body,
            r#"<form method="post" action="/game/{id}"><input type="hidden" name="game_name" value="{name}">"#,
            id = escape(&game.id.to_string()),
            name = escape(&game.name)
        );
        for score in RatingScore::ALL {
            let checked = if current == Some(score) { " checked" } else { "" };
            let _ = write!(
                body,
                r#"<label><input type="radio" name="rating" value="{}"{}> {}</label>"#,
                score.as_str(),
                checked,
                score.label()
            );
        }
        body.push_str(r#"<button type="submit">Rate</button></form>"#);
    } else {
        body.push_str(r#"<p><a href="/login">Log in</a> to rate this game.</p>"#);
    }
    let _ = write!(
        body,
        r#"</section><p><a href="/game/{}/comments">Comments</a></p>"#,
        game.id
    );

    layout(&game.name, signed_in, &body)
}

/// `more` is the limit the "Load more" link asks for, if any.
pub fn comments_page(
    game_id: &str,
    comments: &[CommentView],
    more: Option<i64>,
    signed_in: bool,
) -> String {
    let id = escape(game_id);
    let mut body = format!(
        r#"<h1>Comments</h1><p><a href="/game/{id}">Back to game</a></p>"#,
        id = id
    );

    if signed_in {
        let _ = write!(
            body,
            r#"<form method="post" action="/game/{id}/comments"><textarea name="comment" required></textarea><button type="submit">Post</button></form>"#,
            id = id
        );
    }

    if comments.is_empty() {
        body.push_str("<p>No comments yet.</p>");
    } else {
        body.push_str(r#"<ul class="comments">"#);
        for c in comments {
            let _ = write!(
                body,
                r#"<li><strong>{}</strong> <time datetime="{}">{}</time><p>{}</p></li>"#,
                escape(&c.username),
                c.created_at.to_rfc3339(),
                c.created_at.format("%Y-%m-%d %H:%M"),
                escape(&c.body)
            );
        }
        body.push_str("</ul>");
    }

    if let Some(next) = more {
        let _ = write!(
            body,
            r#"<p><a href="/game/{id}/comments?limit={next}">Load more</a></p>"#,
            id = id,
            next = next
        );
    }

    layout("Comments", signed_in, &body)
}

pub fn login_page(error: Option<&str>) -> String {
    let errors: Vec<String> = error.map(str::to_string).into_iter().collect();
    layout(
        "Log in",
        false,
        &format!(
            r#"<h1>Log in</h1>
{errors}
<form method="post" action="/login">
<label>Email <input type="email" name="email" required></label>
<label>Password <input type="password" name="password" required></label>
<button type="submit">Log in</button>
</form>
<p>No account? <a href="/register">Register</a></p>"#,
            errors = error_list(&errors)
        ),
    )
}

pub fn register_page(errors: &[String], username: &str, email: &str) -> String {
    layout(
        "Register",
        false,
        &format!(
            r#"<h1>Register</h1>
{errors}
<form method="post" action="/register">
<label>Username <input name="username" value="{username}" required></label>
<label>Email <input type="email" name="email" value="{email}" required></label>
<label>Password <input type="password" name="password" required></label>
<label>Confirm password <input type="password" name="confirm_password" required></label>
<button type="submit">Create account</button>
</form>"#,
            errors = error_list(errors),
            username = escape(username),
            email = escape(email)
        ),
    )
}

pub fn account_page(user: &UserRecord, session_expires: Option<DateTime<Utc>>) -> String {
    let session = session_expires
        .map(|at| format!("<p>Signed in until {}</p>\n", at.format("%Y-%m-%d %H:%M UTC")))
        .unwrap_or_default();

    layout(
        "Account",
        true,
        &format!(
            r#"<h1>{username}</h1>
<p>{email}</p>
<p>Member since {since}</p>
{session}<ul>
<li><a href="/account/username">Change username</a></li>
<li><a href="/account/password">Change password</a></li>
<li><a href="/account/reviewed">Games you rated</a></li>
</ul>"#,
            username = escape(&user.username),
            email = escape(&user.email),
            since = user.created_at.format("%Y-%m-%d"),
            session = session
        ),
    )
}

pub fn username_page(current: &str, errors: &[String]) -> String {
    layout(
        "Change username",
        true,
        &format!(
            r#"<h1>Change username</h1>
<p>Current: {current}</p>
{errors}
<form method="post" action="/account/username">
<label>New username <input name="username" required></label>
<button type="submit">Save</button>
</form>"#,
            current = escape(current),
            errors = error_list(errors)
        ),
    )
}

pub fn password_page(errors: &[String]) -> String {
    layout(
        "Change password",
        true,
        &format!(
            r#"<h1>Change password</h1>
{errors}
<form method="post" action="/account/password">
<label>New password <input type="password" name="password" required></label>
<label>Confirm <input type="password" name="confirm_password" required></label>
<button type="submit">Save</button>
</form>"#,
            errors = error_list(errors)
        ),
    )
}

pub fn reviewed_page(reviewed: &[ReviewedGame]) -> String {
    let mut body = String::from("<h1>Games you rated</h1>");
    if reviewed.is_empty() {
        body.push_str("<p>You have not rated any games yet.</p>");
    } else {
        body.push_str(r#"<ul class="reviewed">"#);
        for r in reviewed {
            let _ = write!(
                body,
                r#"<li><a href="/game/{id}">{name}</a>: {score} <time>{at}</time></li>"#,
                id = escape(&r.game_id),
                name = escape(&r.game_name),
                score = r.score.label(),
                at = r.rated_at.format("%Y-%m-%d")
            );
        }
        body.push_str("</ul>");
    }
    layout("Reviewed", true, &body)
}
