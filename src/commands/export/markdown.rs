use crate::model::{ClippingEntry, TitleGroup};

pub(super) fn render_markdown(groups: &[&TitleGroup]) -> String {
    let mut out = String::new();

    for (index, group) in groups.iter().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        render_group(&mut out, group);
    }

    out
}

fn render_group(out: &mut String, group: &TitleGroup) {
    out.push_str(&format!("# {}\n\n", group.display_title()));
    if let Some(author) = group.author() {
        out.push_str(&format!("_{author}_\n\n"));
    }

    for highlight in &group.highlights {
        out.push_str(&format!("> {}\n", highlight.content));
        let citation = highlight.citation();
        if !citation.is_empty() {
            out.push_str(&format!(">\n> -- {citation}\n"));
        }
        out.push('\n');

        for note in &highlight.notes {
            out.push_str(&note_line(note));
        }
        if !highlight.notes.is_empty() {
            out.push('\n');
        }
    }

    if !group.notes.is_empty() {
        out.push_str("## Notes\n\n");
        for note in &group.notes {
            out.push_str(&note_line(note));
        }
        out.push('\n');
    }
}

fn note_line(note: &ClippingEntry) -> String {
    let citation = note.citation();
    if citation.is_empty() {
        return format!("- {}\n", note.content);
    }
    format!("- {} ({citation})\n", note.content)
}
