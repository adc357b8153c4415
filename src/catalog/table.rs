use super::{Stage, WidgetDescriptor};
use std::borrow::Cow;

macro_rules! widgets {
    ( $( ($id:expr, $description:expr, $hint:expr) ),* $(,)? ) => {
        &[ $( WidgetDescriptor {
            id: Cow::Borrowed($id),
            description: Cow::Borrowed($description),
            config_hint: Cow::Borrowed($hint),
        }, )* ]
    };
}

/// Every widget kind the generator may design, in catalog order.
pub(super) const WIDGETS: &[WidgetDescriptor] = widgets![
    (
        "idea_cards",
        "Free-form cards for capturing many ideas quickly",
        "{ maxCards?: number, prompt?: string }"
    ),
    (
        "mind_map",
        "Radial map that branches one concern into related themes",
        "{ rootLabel: string, maxDepth?: number }"
    ),
    (
        "perspective_shift",
        "Prompts the user to restate the concern from other viewpoints",
        "{ perspectives: string[] }"
    ),
    (
        "free_writing",
        "Timed free-writing area for unfiltered thoughts",
        "{ minutes?: number, placeholder?: string }"
    ),
    (
        "affinity_board",
        "Drag ideas into named clusters",
        "{ clusters: string[], allowNewClusters?: boolean }"
    ),
    (
        "priority_matrix",
        "Two-axis matrix for placing items by impact and effort",
        "{ xAxis: string, yAxis: string }"
    ),
    (
        "category_tree",
        "Nested outline for grouping items hierarchically",
        "{ levels?: number }"
    ),
    (
        "pros_cons",
        "Side-by-side pro and con lists for one option",
        "{ option: string }"
    ),
    (
        "ranking_list",
        "Ordered list the user reorders by preference",
        "{ items: string[], topN?: number }"
    ),
    (
        "decision_matrix",
        "Weighted criteria scoring across options",
        "{ options: string[], criteria: { name: string, weight: number }[] }"
    ),
    (
        "structured_summary",
        "Sectioned recap of what the session produced",
        "{ sections: string[] }"
    ),
];

/// Widget ids eligible at each stage, in catalog order.
pub(super) fn stage_widgets(stage: Stage) -> &'static [&'static str] {
    match stage {
        Stage::Diverge => &["idea_cards", "mind_map", "perspective_shift", "free_writing"],
        Stage::Organize => &["affinity_board", "priority_matrix", "category_tree"],
        Stage::Converge => &["pros_cons", "ranking_list", "decision_matrix"],
        Stage::Summary => &["structured_summary"],
    }
}

/// Widget kinds the rendering layer can actually display today.
pub(super) const IMPLEMENTED: &[&str] = &[
    "idea_cards",
    "mind_map",
    "free_writing",
    "affinity_board",
    "priority_matrix",
    "pros_cons",
    "ranking_list",
    "structured_summary",
];
