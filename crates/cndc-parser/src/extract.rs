use crate::model::RawTable;

/// Headers containing `fragment`, in table order.
pub fn metric_columns(table: &RawTable, fragment: &str) -> Vec<String> {
    table
        .headers()
        .iter()
        .filter(|header| header.contains(fragment))
        .cloned()
        .collect()
}

/// Narrows a wide table to the identifier columns plus every column whose name
/// contains `fragment`, keeping the original column order.
///
/// No matching metric column is not an error: the result then holds only the
/// identifiers and reshapes to an empty long-form dataset.
pub fn extract(table: &RawTable, fragment: &str, identifier_columns: &[String]) -> RawTable {
    let indices: Vec<usize> = table
        .headers()
        .iter()
        .enumerate()
        .filter(|(_, header)| {
            header.contains(fragment) || identifier_columns.iter().any(|id| id == *header)
        })
        .map(|(idx, _)| idx)
        .collect();
    table.select_indices(&indices)
}
