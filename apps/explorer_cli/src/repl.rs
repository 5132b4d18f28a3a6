//! Line-oriented front end: each input line becomes one explorer command.

use std::{fmt::Write as _, sync::Arc};

use client_core::{Explorer, ExplorerSnapshot, SearchPhase, SelectionPhase};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplInput {
    Search(String),
    Page(u32),
    Next,
    Prev,
    Open(usize),
    Clear,
    Theme,
    Help,
    Quit,
    Unknown(String),
}

pub fn parse_line(line: &str) -> ReplInput {
    let line = line.trim();
    let Some(rest) = line.strip_prefix('/') else {
        return ReplInput::Search(line.to_string());
    };

    let mut parts = rest.split_whitespace();
    let command = parts.next().unwrap_or_default();
    let arg = parts.next();
    match (command, arg) {
        ("next" | "n", None) => ReplInput::Next,
        ("prev" | "p", None) => ReplInput::Prev,
        ("page", Some(n)) => match n.parse::<u32>() {
            Ok(page) if page >= 1 => ReplInput::Page(page),
            _ => ReplInput::Unknown(line.to_string()),
        },
        // Result numbers are shown 1-based.
        ("open" | "o", Some(n)) => match n.parse::<usize>() {
            Ok(idx) if idx >= 1 => ReplInput::Open(idx - 1),
            _ => ReplInput::Unknown(line.to_string()),
        },
        ("clear", None) => ReplInput::Clear,
        ("theme", None) => ReplInput::Theme,
        ("help" | "h" | "?", None) => ReplInput::Help,
        ("quit" | "q" | "exit", None) => ReplInput::Quit,
        _ => ReplInput::Unknown(line.to_string()),
    }
}

pub const HELP: &str = "\
<text>      search accounts (empty line clears the search)
/next /prev move between result pages
/page N     jump to page N
/open N     list repositories of result N
/clear      drop the current selection
/theme      toggle light/dark theme
/quit       exit";

pub fn render_snapshot(snapshot: &ExplorerSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "[theme: {}]", snapshot.theme.as_str());

    if let Some(error) = &snapshot.error {
        let _ = writeln!(out, "error: {error}");
    }

    match (&snapshot.active_query, snapshot.search_phase) {
        (None, _) => {
            let _ = writeln!(out, "no active search");
        }
        (Some(query), SearchPhase::Searching) => {
            let _ = writeln!(out, "searching for \"{query}\"...");
        }
        (Some(query), _) if snapshot.is_empty_result() => {
            let _ = writeln!(out, "no accounts match \"{query}\"");
        }
        (Some(query), _) => {
            let _ = writeln!(out, "\"{query}\": {}", snapshot.range_label);
            for (idx, entity) in snapshot.entities.iter().enumerate() {
                let repos = entity
                    .public_repos
                    .map(|n| format!(" ({n} repos)"))
                    .unwrap_or_default();
                let _ = writeln!(
                    out,
                    "  {:>3}. {}{} {}",
                    idx + 1,
                    entity.login,
                    repos,
                    entity.html_url
                );
            }
            let mut nav = Vec::new();
            if snapshot.page.has_prev_page {
                nav.push("/prev");
            }
            if snapshot.page.has_next_page {
                nav.push("/next");
            }
            if !nav.is_empty() {
                let _ = writeln!(out, "  page {} ({})", snapshot.page.current_page, nav.join(" "));
            }
        }
    }

    if let Some(selected) = &snapshot.selected {
        match snapshot.selection_phase {
            SelectionPhase::Loading => {
                let _ = writeln!(out, "loading repositories for {}...", selected.login);
            }
            SelectionPhase::Failed => {
                let _ = writeln!(out, "repositories for {} unavailable", selected.login);
            }
            _ if snapshot.secondary.is_empty() => {
                let _ = writeln!(out, "{} has no public repositories", selected.login);
            }
            _ => {
                let _ = writeln!(
                    out,
                    "{} repositories of {}:",
                    snapshot.secondary.len(),
                    selected.login
                );
                for repo in &snapshot.secondary {
                    let language = repo.language.as_deref().unwrap_or("-");
                    let _ = writeln!(
                        out,
                        "  * {} [{language}] ★{} updated {}",
                        repo.full_name,
                        repo.stargazers_count,
                        repo.updated_at.format("%Y-%m-%d")
                    );
                    if let Some(description) = &repo.description {
                        let _ = writeln!(out, "      {description}");
                    }
                }
            }
        }
    }

    out
}

pub async fn run(explorer: Arc<Explorer>) -> anyhow::Result<()> {
    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        match parse_line(&line) {
            ReplInput::Search(text) => {
                explorer.set_query(&text).await;
                explorer.trigger_search(1).await;
            }
            ReplInput::Page(page) => explorer.trigger_search(page).await,
            ReplInput::Next => explorer.next_page().await,
            ReplInput::Prev => explorer.prev_page().await,
            ReplInput::Open(idx) => {
                if !explorer.select_by_index(idx).await {
                    println!("no result #{}", idx + 1);
                    continue;
                }
            }
            ReplInput::Clear => explorer.clear_selection().await,
            ReplInput::Theme => {
                if let Err(err) = explorer.toggle_theme().await {
                    tracing::warn!(error = %err, "theme preference not persisted");
                }
            }
            ReplInput::Help => {
                println!("{HELP}");
                continue;
            }
            ReplInput::Quit => break,
            ReplInput::Unknown(raw) => {
                println!("unrecognized command '{raw}'; /help lists commands");
                continue;
            }
        }
        print!("{}", render_snapshot(&explorer.snapshot().await));
    }

    Ok(())
}
