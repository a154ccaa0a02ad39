use rusqlite::Row;
use serde::Serialize;

/// One row of the track table: a single assay / cell type / file provenance
/// observation. Every field is required text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackRecord {
    // Classification
    pub cell_type_category: String,
    pub cell_type: String,
    pub cell_type_track_name: String,
    pub cell_type_short: String,
    pub assay_category: String,
    pub assay: String,
    pub assay_track_name: String,
    pub assay_short: String,

    // Biological context
    pub donor: String,
    pub time_point: String,
    pub view: String,

    // Provenance and storage
    pub track_name: String,
    pub track_type: String,
    pub track_density: String,
    pub provider_institution: String,
    pub source_server: String,
    pub source_path_to_file: String,
    pub server: String,
    pub path_to_file: String,
    pub new_file_name: String,
}

impl TrackRecord {
    /// Number of fields in a record (and columns in the table).
    pub const FIELD_COUNT: usize = 20;

    /// Column names in table / input-file order.
    pub const COLUMNS: [&'static str; Self::FIELD_COUNT] = [
        "cell_type_category",
        "cell_type",
        "cell_type_track_name",
        "cell_type_short",
        "assay_category",
        "assay",
        "assay_track_name",
        "assay_short",
        "donor",
        "time_point",
        "view",
        "track_name",
        "track_type",
        "track_density",
        "provider_institution",
        "source_server",
        "source_path_to_file",
        "server",
        "path_to_file",
        "new_file_name",
    ];

    /// Build a record from exactly 20 values in column order.
    /// Returns `None` for any other length.
    pub fn from_fields(fields: &[&str]) -> Option<Self> {
        let [
            cell_type_category,
            cell_type,
            cell_type_track_name,
            cell_type_short,
            assay_category,
            assay,
            assay_track_name,
            assay_short,
            donor,
            time_point,
            view,
            track_name,
            track_type,
            track_density,
            provider_institution,
            source_server,
            source_path_to_file,
            server,
            path_to_file,
            new_file_name,
        ] = fields
        else {
            return None;
        };

        Some(Self {
            cell_type_category: cell_type_category.to_string(),
            cell_type: cell_type.to_string(),
            cell_type_track_name: cell_type_track_name.to_string(),
            cell_type_short: cell_type_short.to_string(),
            assay_category: assay_category.to_string(),
            assay: assay.to_string(),
            assay_track_name: assay_track_name.to_string(),
            assay_short: assay_short.to_string(),
            donor: donor.to_string(),
            time_point: time_point.to_string(),
            view: view.to_string(),
            track_name: track_name.to_string(),
            track_type: track_type.to_string(),
            track_density: track_density.to_string(),
            provider_institution: provider_institution.to_string(),
            source_server: source_server.to_string(),
            source_path_to_file: source_path_to_file.to_string(),
            server: server.to_string(),
            path_to_file: path_to_file.to_string(),
            new_file_name: new_file_name.to_string(),
        })
    }

    /// Field values in column order.
    pub fn values(&self) -> [&str; Self::FIELD_COUNT] {
        [
            &self.cell_type_category,
            &self.cell_type,
            &self.cell_type_track_name,
            &self.cell_type_short,
            &self.assay_category,
            &self.assay,
            &self.assay_track_name,
            &self.assay_short,
            &self.donor,
            &self.time_point,
            &self.view,
            &self.track_name,
            &self.track_type,
            &self.track_density,
            &self.provider_institution,
            &self.source_server,
            &self.source_path_to_file,
            &self.server,
            &self.path_to_file,
            &self.new_file_name,
        ]
    }

    /// Map a row selected with all columns in `COLUMNS` order.
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            cell_type_category: row.get(0)?,
            cell_type: row.get(1)?,
            cell_type_track_name: row.get(2)?,
            cell_type_short: row.get(3)?,
            assay_category: row.get(4)?,
            assay: row.get(5)?,
            assay_track_name: row.get(6)?,
            assay_short: row.get(7)?,
            donor: row.get(8)?,
            time_point: row.get(9)?,
            view: row.get(10)?,
            track_name: row.get(11)?,
            track_type: row.get(12)?,
            track_density: row.get(13)?,
            provider_institution: row.get(14)?,
            source_server: row.get(15)?,
            source_path_to_file: row.get(16)?,
            server: row.get(17)?,
            path_to_file: row.get(18)?,
            new_file_name: row.get(19)?,
        })
    }
}

/// The file-level fields of a track, as listed per assay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackSummary {
    pub track_name: String,
    pub track_type: String,
    pub track_density: String,
}
