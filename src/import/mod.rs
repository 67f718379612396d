mod csv_export;
mod csv_import;

pub(crate) use csv_export::export_file;
pub(crate) use csv_import::import_file;

/// Column order written on export. Import needs every column except `id`.
pub(crate) const CSV_COLUMNS: &[&str] = &["id", "dt", "category", "description", "amount", "payment"];
