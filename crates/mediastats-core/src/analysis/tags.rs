/// Tag frequency aggregation over the analyzed subset.
use crate::index::TagRef;
use crate::model::TagCount;
use std::collections::HashMap;

/// Ranked tags returned per folder.
pub const TOP_TAGS: usize = 20;

/// Count tag occurrences across per-image tag lists and rank them.
///
/// Each list holds one image's distinct tags, so a tag's count is the number
/// of images carrying it. Name, type, and display name are carried from the
/// first occurrence. Ordering is count descending with `tag_id` ascending as
/// the tie-break, capped at [`TOP_TAGS`]. `tagged_images` is the percentage
/// denominator.
pub fn aggregate_tags<'a, I>(tag_lists: I, tagged_images: u64) -> Vec<TagCount>
where
    I: IntoIterator<Item = &'a [TagRef]>,
{
    let mut counts: HashMap<i64, (u64, &'a TagRef)> = HashMap::new();
    for tags in tag_lists {
        for tag in tags {
            counts
                .entry(tag.id)
                .and_modify(|(count, _)| *count += 1)
                .or_insert((1, tag));
        }
    }

    let mut ranked: Vec<(u64, &TagRef)> = counts.into_values().collect();
    ranked.sort_unstable_by(|a, b| b.0.cmp(&a.0).then(a.1.id.cmp(&b.1.id)));
    ranked.truncate(TOP_TAGS);

    ranked
        .into_iter()
        .map(|(count, tag)| TagCount {
            tag_id: tag.id,
            tag_name: tag.name.clone(),
            tag_type: tag.tag_type.clone(),
            display_name: tag.display_name.clone(),
            count,
            percentage: percentage(count, tagged_images),
        })
        .collect()
}

/// One-decimal-place share of `count` in `total`, 0.0 when `total` is zero.
pub(crate) fn percentage(count: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (count as f64 / total as f64 * 1000.0).round() / 10.0
}
