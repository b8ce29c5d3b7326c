use std::fmt::{self, Write as _};

use super::RowView;
use crate::store::StoreSnapshot;

pub(crate) const LOADING_MESSAGE: &str = "Loading users...";
pub(crate) const NO_USERS_MESSAGE: &str = "🤷 No users found";
pub(crate) const RECENTLY_UPDATED_MARKER: &str = "Recently Updated";

pub(crate) fn render(snapshot: &StoreSnapshot, rows: &[RowView]) -> String {
    let mut out = String::new();
    if let Err(e) = write_view(&mut out, snapshot, rows) {
        tracing::error!("Rendering the roster failed: {e}");
    }
    out
}

fn write_view(out: &mut String, snapshot: &StoreSnapshot, rows: &[RowView]) -> fmt::Result {
    if snapshot.loading {
        return writeln!(out, "{LOADING_MESSAGE}");
    }

    if let Some(error) = &snapshot.error {
        writeln!(out, "⚠️ Error: {error}")?;
    }

    if snapshot.user_count == 0 {
        return writeln!(out, "{NO_USERS_MESSAGE}");
    }

    write!(out, "Total Users: {}", snapshot.user_count)?;
    if !snapshot.search_query.trim().is_empty() {
        write!(
            out,
            " | Matching \"{}\": {}",
            snapshot.search_query.trim(),
            snapshot.filtered_count
        )?;
    }
    if let Some(fetched_at) = snapshot.last_fetched_at {
        write!(out, " | Synced {}", fetched_at.format("%H:%M:%S UTC"))?;
    }
    out.push('\n');

    writeln!(
        out,
        "{:>4}  {:>4}  {:<20}  {:<24}  {:>6}",
        "RANK", "ID", "NAME", "EMAIL", "SCORE"
    )?;
    for row in rows {
        let rank = row.rank.map_or_else(|| "-".to_string(), |rank| rank.to_string());
        let score = match &row.editing {
            Some(input) => format!("[{input}]"),
            None => row.score.to_string(),
        };
        write!(
            out,
            "{:>4}  {:>4}  {:<20}  {:<24}  {:>6}",
            rank, row.id, row.name, row.email, score
        )?;
        if row.recently_updated {
            write!(out, "  {RECENTLY_UPDATED_MARKER}")?;
        }
        out.push('\n');
    }

    writeln!(
        out,
        "Page {} of {}",
        snapshot.current_page, snapshot.total_pages
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> StoreSnapshot {
        StoreSnapshot {
            loading: false,
            error: None,
            user_count: 0,
            filtered_count: 0,
            display_users: Vec::new(),
            current_page: 1,
            total_pages: 1,
            page_size: 20,
            search_query: String::new(),
            last_updated_user_ids: Vec::new(),
            last_fetched_at: None,
        }
    }

    fn row(id: u32, rank: u32, score: i64) -> RowView {
        RowView {
            rank: Some(rank),
            id,
            name: format!("Test User {id}"),
            email: format!("test{id}@example.com"),
            score,
            editing: None,
            recently_updated: false,
        }
    }

    #[test]
    fn test_render_loading_hides_everything_else() {
        let state = StoreSnapshot {
            loading: true,
            error: Some("Network Failed".to_string()),
            ..snapshot()
        };

        let out = render(&state, &[]);

        assert_eq!(out.trim(), LOADING_MESSAGE);
    }

    #[test]
    fn test_render_error() {
        let state = StoreSnapshot {
            error: Some("Network Failed".to_string()),
            ..snapshot()
        };

        let out = render(&state, &[]);

        assert!(out.contains("⚠️ Error: Network Failed"));
        assert!(out.contains(NO_USERS_MESSAGE));
    }

    #[test]
    fn test_render_no_users() {
        let out = render(&snapshot(), &[]);

        assert!(out.contains(NO_USERS_MESSAGE));
        assert!(!out.contains("Total Users"));
    }

    #[test]
    fn test_render_table() {
        let state = StoreSnapshot {
            user_count: 2,
            filtered_count: 2,
            ..snapshot()
        };
        let mut second = row(1, 2, 50);
        second.recently_updated = true;
        let mut first = row(2, 1, 55);
        first.editing = Some("88".to_string());

        let out = render(&state, &[first, second]);
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines[0], "Total Users: 2");
        assert!(lines[2].contains("Test User 2"));
        assert!(lines[2].contains("[88]"));
        assert!(!lines[2].contains(RECENTLY_UPDATED_MARKER));
        assert!(lines[3].contains("Test User 1"));
        assert!(lines[3].trim_end().ends_with(RECENTLY_UPDATED_MARKER));
        assert_eq!(lines[4], "Page 1 of 1");
    }

    #[test]
    fn test_render_search_summary() {
        let state = StoreSnapshot {
            user_count: 150,
            filtered_count: 11,
            search_query: " user 1 ".to_string(),
            ..snapshot()
        };

        let out = render(&state, &[]);

        assert!(out.starts_with("Total Users: 150 | Matching \"user 1\": 11"));
    }

    #[test]
    fn test_render_unranked_row_and_trailing_newline() {
        let state = StoreSnapshot {
            user_count: 1,
            filtered_count: 1,
            ..snapshot()
        };
        let unranked = RowView {
            rank: None,
            ..row(3, 1, 40)
        };

        let out = render(&state, &[unranked]);
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[2].trim_start().starts_with("-  "));
        assert!(lines[2].ends_with("    40"));
        assert!(out.ends_with("Page 1 of 1\n"));
    }
}
