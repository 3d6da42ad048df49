use std::collections::HashMap;

use crate::model::{ClippingEntry, EntryKind, TitleGroup};

/// Stable partition by exact title; groups keep first-appearance order.
pub(crate) fn group_by_title(entries: Vec<ClippingEntry>) -> Vec<TitleGroup> {
    let mut groups = Vec::<TitleGroup>::new();
    let mut index_by_title = HashMap::<String, usize>::new();

    for entry in entries {
        let index = *index_by_title
            .entry(entry.title.clone())
            .or_insert_with(|| {
                groups.push(TitleGroup::new(&entry.title));
                groups.len() - 1
            });

        let group = &mut groups[index];
        match entry.kind {
            EntryKind::Highlight => group.highlights.push(entry),
            EntryKind::Note => group.notes.push(entry),
        }
    }

    groups
}
