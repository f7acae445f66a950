pub mod csv_table;
pub mod filter;
pub mod reports;
pub mod source;

pub use csv_table::{CsvTable, is_bookkeeping_column, read_csv_table};
pub use filter::{is_blank_record, retain_loadable};
pub use reports::{load_care_sites, load_invalid_fields};
pub use source::{CsvRecordSource, RecordSource, SubjectGroup, group_by_subject};
