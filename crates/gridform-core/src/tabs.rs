//! Tab labels of the planned editors.

use indexmap::{IndexMap, IndexSet};

use crate::column::ColumnDescriptor;
use crate::planner::EditorDescriptor;

/// Returns the distinct tab labels of columns that produced an editor.
///
/// Labels keep the order in which they are first seen. A column tagged with
/// a tab but without an editor does not open that tab.
pub fn partition(
    columns: &[ColumnDescriptor],
    editors: &IndexMap<String, EditorDescriptor>,
) -> Vec<String> {
    let tabs: IndexSet<&str> = columns
        .iter()
        .filter(|column| editors.contains_key(&column.name))
        .filter_map(ColumnDescriptor::tab)
        .collect();

    tabs.into_iter().map(str::to_string).collect()
}
