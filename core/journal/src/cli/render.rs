//! 端末への表示（画面の代わりに行単位のテキストを組み立てる）

use crate::domain::{
    AccessState, Dream, FilterState, Memory, MemoryDraft, PlaceCandidate, PlaceEntry, RouteDecision,
};
use crate::usecase::home::{HomeSummary, PinKind};
use crate::usecase::post_detail::MemoryDetail;

fn or_dash(v: Option<&str>) -> &str {
    v.filter(|s| !s.trim().is_empty()).unwrap_or("-")
}

fn count(v: Option<u64>) -> String {
    v.map(|n| n.to_string()).unwrap_or_else(|| "?".to_string())
}

pub fn status(state: &AccessState, path: &str, decision: &RouteDecision) -> String {
    let who = match state {
        AccessState::Denied(uid) | AccessState::Allowed(uid) => format!(" ({})", uid),
        _ => String::new(),
    };
    let route = match decision {
        RouteDecision::Loading => "loading".to_string(),
        RouteDecision::Proceed => "proceed".to_string(),
        RouteDecision::Redirect(r) => format!("redirect to {}", r.path),
    };
    format!("access: {}{}\n{}: {}", state.label(), who, path, route)
}

pub fn memory_line(m: &Memory) -> String {
    let mut line = format!(
        "{}  {}  {}",
        m.id,
        or_dash(m.visited_at.as_deref()),
        if m.title.is_empty() { m.name() } else { m.title.as_str() }
    );
    if let Some(place) = m.place_name.as_deref().filter(|p| *p != m.title) {
        line.push_str(&format!(" @ {}", place));
    }
    if let Some(k) = m.keyword.as_deref().filter(|k| !k.trim().is_empty()) {
        line.push_str(&format!("  #{}", k.trim()));
    }
    line
}

pub fn dream_line(d: &Dream) -> String {
    let mut line = format!("{}  {}", d.id, d.name());
    if let Some(a) = d.address() {
        line.push_str(&format!(" ({})", a));
    }
    if let Some(k) = d.keyword().filter(|k| !k.trim().is_empty()) {
        line.push_str(&format!("  #{}", k.trim()));
    }
    line
}

/// 絞り込み中なら条件を 1 行で示す
pub fn filter_header(f: &FilterState) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(k) = &f.selected_keyword {
        parts.push(format!("#{}", k));
    }
    if !f.search_query.trim().is_empty() {
        parts.push(format!("\"{}\"", f.search_query.trim()));
    }
    if parts.is_empty() {
        None
    } else {
        Some(format!("filter: {}", parts.join(" ")))
    }
}

pub fn lines<T>(items: &[T], empty: &str, f: impl Fn(&T) -> String) -> String {
    if items.is_empty() {
        return empty.to_string();
    }
    items.iter().map(f).collect::<Vec<_>>().join("\n")
}

pub fn home(summary: &HomeSummary) -> String {
    let mut out = vec![format!(
        "memories: {}  dreams: {}",
        count(summary.memory_count),
        count(summary.dream_count)
    )];
    out.push("recent:".to_string());
    out.extend(summary.recent.iter().map(|m| format!("  {}", memory_line(m))));
    if !summary.pins.is_empty() {
        out.push("map:".to_string());
        out.extend(summary.pins.iter().map(|p| {
            let mark = match p.kind {
                PinKind::Memory => "memory",
                PinKind::Dream => "dream",
            };
            format!("  [{}] {} {}", mark, p.coordinate, p.label)
        }));
    }
    if !summary.keyword_suggestions.is_empty() {
        out.push(format!("keywords: {}", summary.keyword_suggestions.join(", ")));
    }
    out.join("\n")
}

pub fn detail(d: &MemoryDetail) -> String {
    let m = &d.memory;
    let mut out = vec![
        format!("{}  {}", m.id, m.title),
        format!("visited: {}", or_dash(m.visited_at.as_deref())),
        format!("place: {}", or_dash(m.place_name.as_deref())),
        format!("address: {}", or_dash(m.address.as_deref())),
        format!("keyword: {}", or_dash(m.keyword.as_deref())),
    ];
    if let Some(link) = &d.maps_link {
        out.push(format!("map: {}", link));
    }
    if let Some(cover) = &d.cover_url {
        out.push(format!("cover: {}", cover));
    }
    out.extend(d.photos.iter().map(|p| format!("photo: {}", p.url)));
    if let Some(body) = m.body.as_deref().filter(|b| !b.trim().is_empty()) {
        out.push(String::new());
        out.push(body.to_string());
    }
    out.join("\n")
}

pub fn draft(d: &MemoryDraft) -> String {
    let mut out = vec![format!("title: {}", d.title)];
    let rows = [
        ("date", &d.visited_at),
        ("place", &d.place_name),
        ("address", &d.address),
        ("lat", &d.lat),
        ("lng", &d.lng),
        ("keyword", &d.keyword),
        ("body", &d.body),
    ];
    out.extend(
        rows.iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, v)| format!("{}: {}", k, v)),
    );
    out.join("\n")
}

fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "'\\''"))
}

/// 下書きをそのまま保存するコマンド行
pub fn save_hint(d: &MemoryDraft) -> String {
    let mut cmd = vec!["journal save".to_string()];
    if let Some(id) = &d.id {
        cmd.push(format!("--id {}", shell_quote(id)));
    }
    let rows = [
        ("title", &d.title),
        ("date", &d.visited_at),
        ("place", &d.place_name),
        ("address", &d.address),
        ("lat", &d.lat),
        ("lng", &d.lng),
        ("keyword", &d.keyword),
        ("body", &d.body),
    ];
    cmd.extend(
        rows.iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, v)| format!("--{} {}", k, shell_quote(v))),
    );
    cmd.join(" ")
}

pub fn candidate_line(c: &PlaceCandidate) -> String {
    let mut line = c.name.clone();
    if let Some(a) = &c.formatted_address {
        line.push_str(&format!(" ({})", a));
    }
    if let (Some(lat), Some(lng)) = (c.lat, c.lng) {
        line.push_str(&format!("  {},{}", lat, lng));
    }
    line
}
