use std::path::Path;

use rusqlite::Connection;

use super::*;
use crate::cli::SplitMode;
use crate::pipeline;

const DOCUMENT: &str = "\
Dune (Frank Herbert)\r
- Your Highlight on Location 120-125 | Added on Monday, 1 January 2024 10:00:00\r
\r
Fear is the mind-killer.\r
==========\r
Dune (Frank Herbert)\r
- Your Note on Location 123 | Added on Monday, 1 January 2024 10:05:00\r
\r
key theme\r
==========\r
Dune (Frank Herbert)\r
- Your Note on Location 200 | Added on Monday, 1 January 2024 10:06:00\r
\r
later\r
==========\r
\r
- Your Highlight on Location 1-2 | Added on Monday, 1 January 2024 10:07:00\r
\r
untitled\r
==========\r
";

fn fixture_groups() -> Vec<TitleGroup> {
    pipeline::process(DOCUMENT, SplitMode::Auto)
        .expect("fixture should process")
        .groups
}

#[test]
fn markdown_lists_highlights_with_their_notes_then_loose_notes() {
    let groups = fixture_groups();
    let selected = select_export_groups(&groups, Some("Dune (Frank Herbert)"))
        .expect("title should be exported");

    let rendered = render_markdown(&selected);

    assert_eq!(
        rendered,
        "# Dune\n\n_Frank Herbert_\n\n\
         > Fear is the mind-killer.\n>\n> -- location 120-125, Monday, 1 January 2024 10:00:00\n\n\
         - key theme (location 123, Monday, 1 January 2024 10:05:00)\n\n\
         ## Notes\n\n\
         - later (location 200, Monday, 1 January 2024 10:06:00)\n\n"
    );
}

#[test]
fn exporting_every_title_skips_the_untitled_group() {
    let groups = fixture_groups();
    assert_eq!(groups.len(), 2);

    let selected = select_export_groups(&groups, None).expect("titled groups exist");
    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0].title, "Dune (Frank Herbert)");
}

#[test]
fn unknown_title_is_an_export_error() {
    let groups = fixture_groups();

    let error = select_export_groups(&groups, Some("Dune"))
        .expect_err("title match is exact");
    assert!(error.to_string().contains("no clippings found for title: Dune"));
}

#[test]
fn default_output_path_is_derived_from_title_and_format() {
    let dir = Path::new("exports");

    assert_eq!(
        default_output_path(dir, Some("Dune (Frank Herbert)"), ExportFormat::Markdown),
        dir.join("dune-frank-herbert.md")
    );
    assert_eq!(
        default_output_path(dir, None, ExportFormat::Sqlite),
        dir.join("clippings.sqlite")
    );
    assert_eq!(
        default_output_path(dir, Some("!!!"), ExportFormat::Json),
        dir.join("clippings.json")
    );
}

#[test]
fn sqlite_export_links_attached_notes_to_their_highlight() {
    let groups = fixture_groups();
    let selected = select_export_groups(&groups, None).expect("titled groups exist");
    let mut connection = Connection::open_in_memory().expect("in-memory sqlite");

    let counts =
        populate_export(&mut connection, &selected, "fixture.txt").expect("export populates");
    assert_eq!(
        counts,
        SqliteExportCounts {
            titles: 1,
            entries: 3
        }
    );

    let (author, highlight_count, loose_note_count): (Option<String>, i64, i64) = connection
        .query_row(
            "SELECT author, highlight_count, loose_note_count FROM titles WHERE title_id = 1",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .expect("title row");
    assert_eq!(author.as_deref(), Some("Frank Herbert"));
    assert_eq!(highlight_count, 1);
    assert_eq!(loose_note_count, 1);

    let highlight_id = &selected[0].highlights[0].entry_id;
    let (location_min, location_max): (i64, i64) = connection
        .query_row(
            "SELECT location_min, location_max FROM entries WHERE entry_id = ?1",
            [highlight_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .expect("highlight row");
    assert_eq!((location_min, location_max), (120, 125));

    let attached: Vec<String> = {
        let mut statement = connection
            .prepare("SELECT content FROM entries WHERE highlight_entry_id = ?1 ORDER BY order_index")
            .expect("prepare attached query");
        statement
            .query_map([highlight_id], |row| row.get(0))
            .expect("query attached notes")
            .collect::<rusqlite::Result<Vec<String>>>()
            .expect("read attached notes")
    };
    assert_eq!(attached, vec!["key theme".to_string()]);

    let source: String = connection
        .query_row("SELECT value FROM metadata WHERE key = 'source'", [], |row| {
            row.get(0)
        })
        .expect("source metadata");
    assert_eq!(source, "fixture.txt");
}
