use crate::model::{ClippingEntry, TitleGroup};

/// First-fit assignment of each note to the earliest highlight whose range holds it.
pub(crate) fn match_notes(highlights: &[ClippingEntry], notes: &[ClippingEntry]) -> Vec<Option<usize>> {
    notes
        .iter()
        .map(|note| {
            let point = note.location.as_ref()?;
            highlights.iter().position(|highlight| {
                highlight
                    .location
                    .as_ref()
                    .is_some_and(|range| range.contains(point))
            })
        })
        .collect()
}

pub(crate) fn associate_group(group: TitleGroup) -> TitleGroup {
    let assignment = match_notes(&group.highlights, &group.notes);
    let TitleGroup {
        title,
        mut highlights,
        notes,
    } = group;

    let mut loose = Vec::<ClippingEntry>::new();
    for (note, slot) in notes.into_iter().zip(assignment) {
        match slot {
            Some(index) => highlights[index].notes.push(note),
            None => loose.push(note),
        }
    }

    TitleGroup {
        title,
        highlights,
        notes: loose,
    }
}

pub(crate) fn associate(groups: Vec<TitleGroup>) -> Vec<TitleGroup> {
    groups.into_iter().map(associate_group).collect()
}
