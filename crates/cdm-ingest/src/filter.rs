use cdm_model::SourceRecord;

/// True when a record carries nothing to load.
///
/// On forms where `"0"` is a clinical answer only empty cells count as
/// blank; elsewhere `"0"` is the untouched default and counts as blank too.
pub fn is_blank_record(record: &SourceRecord) -> bool {
    let zero_is_answer = record.form.zero_is_answer();
    record.cells().all(|(_, value)| {
        let value = value.trim();
        value.is_empty() || (!zero_is_answer && value == "0")
    })
}

/// Drop blank records, keeping order.
pub fn retain_loadable(records: Vec<SourceRecord>) -> Vec<SourceRecord> {
    records
        .into_iter()
        .filter(|record| !is_blank_record(record))
        .collect()
}
