use super::models::{TrackRecord, TrackSummary};
use super::{Database, DbError, Result};
use rusqlite::{Params, Row, named_params};

const CREATE_TABLE_SQL: &str = "
    CREATE TABLE IF NOT EXISTS ChipSeqTable (
        cell_type_category      TEXT NOT NULL,
        cell_type               TEXT NOT NULL,
        cell_type_track_name    TEXT NOT NULL,
        cell_type_short         TEXT NOT NULL,
        assay_category          TEXT NOT NULL,
        assay                   TEXT NOT NULL,
        assay_track_name        TEXT NOT NULL,
        assay_short             TEXT NOT NULL,
        donor                   TEXT NOT NULL,
        time_point              TEXT NOT NULL,
        view                    TEXT NOT NULL,
        track_name              TEXT NOT NULL,
        track_type              TEXT NOT NULL,
        track_density           TEXT NOT NULL,
        provider_institution    TEXT NOT NULL,
        source_server           TEXT NOT NULL,
        source_path_to_file     TEXT NOT NULL,
        server                  TEXT NOT NULL,
        path_to_file            TEXT NOT NULL,
        new_file_name           TEXT NOT NULL
    )";

const INSERT_SQL: &str = "
    INSERT INTO ChipSeqTable VALUES (
        :cell_type_category, :cell_type, :cell_type_track_name, :cell_type_short,
        :assay_category, :assay, :assay_track_name, :assay_short,
        :donor, :time_point, :view,
        :track_name, :track_type, :track_density, :provider_institution,
        :source_server, :source_path_to_file, :server, :path_to_file, :new_file_name
    )";

impl Database {
    /// Create the track table. A no-op when it already exists.
    pub fn create_table(&self) -> Result<()> {
        self.conn
            .execute_batch(CREATE_TABLE_SQL)
            .map_err(DbError::Schema)
            .inspect_err(|e| log::error!("Table ChipSeqTable could not be created: {e}"))?;
        log::info!("Table ChipSeqTable is ready");
        Ok(())
    }

    /// Insert every record in a single transaction. Either all rows land or,
    /// on the first failure, none do. Returns the number of rows inserted.
    pub fn insert_records(&self, records: &[TrackRecord]) -> Result<usize> {
        let insert_all = || -> rusqlite::Result<usize> {
            let tx = self.conn.unchecked_transaction()?;
            {
                let mut stmt = tx.prepare_cached(INSERT_SQL)?;
                for r in records {
                    stmt.execute(named_params! {
                        ":cell_type_category": r.cell_type_category,
                        ":cell_type": r.cell_type,
                        ":cell_type_track_name": r.cell_type_track_name,
                        ":cell_type_short": r.cell_type_short,
                        ":assay_category": r.assay_category,
                        ":assay": r.assay,
                        ":assay_track_name": r.assay_track_name,
                        ":assay_short": r.assay_short,
                        ":donor": r.donor,
                        ":time_point": r.time_point,
                        ":view": r.view,
                        ":track_name": r.track_name,
                        ":track_type": r.track_type,
                        ":track_density": r.track_density,
                        ":provider_institution": r.provider_institution,
                        ":source_server": r.source_server,
                        ":source_path_to_file": r.source_path_to_file,
                        ":server": r.server,
                        ":path_to_file": r.path_to_file,
                        ":new_file_name": r.new_file_name,
                    })?;
                }
            }
            tx.commit()?;
            Ok(records.len())
        };

        let inserted = insert_all()
            .map_err(DbError::Write)
            .inspect_err(|e| log::error!("Data could not be inserted, batch rolled back: {e}"))?;
        log::info!("Inserted {inserted} records");
        Ok(inserted)
    }

    /// Distinct cell types, optionally limited to rows of one assay.
    pub fn select_cell_types(&self, assay: Option<&str>) -> Result<Vec<String>> {
        let cell_types: Vec<String> = match assay {
            None => self.query_rows(
                "SELECT DISTINCT cell_type FROM ChipSeqTable ORDER BY cell_type",
                [],
                |row| row.get(0),
            ),
            Some(assay) => self.query_rows(
                "SELECT DISTINCT cell_type FROM ChipSeqTable
                 WHERE assay = :assay
                 ORDER BY cell_type",
                named_params! { ":assay": assay },
                |row| row.get(0),
            ),
        }
        .map_err(DbError::Read)
        .inspect_err(|e| {
            log::error!("Could not select cell types. Check if the table exists: {e}")
        })?;

        match assay {
            None => log::info!("Selected {} cell types", cell_types.len()),
            Some(a) => log::info!(
                "Selected {} cell types associated with assay: {a}",
                cell_types.len()
            ),
        }
        Ok(cell_types)
    }

    /// Distinct (track_name, track_type, track_density) for one assay.
    pub fn select_tracks(&self, assay: &str) -> Result<Vec<TrackSummary>> {
        let tracks = self
            .query_rows(
                "SELECT DISTINCT track_name, track_type, track_density
                 FROM ChipSeqTable
                 WHERE assay = :assay
                 ORDER BY track_name, track_type, track_density",
                named_params! { ":assay": assay },
                |row| {
                    Ok(TrackSummary {
                        track_name: row.get(0)?,
                        track_type: row.get(1)?,
                        track_density: row.get(2)?,
                    })
                },
            )
            .map_err(DbError::Read)
            .inspect_err(|e| {
                log::error!("Could not select tracks for assay {assay}. Check if the table exists: {e}")
            })?;

        log::info!("Selected {} tracks from assay: {assay}", tracks.len());
        Ok(tracks)
    }

    /// Distinct track names for one assay_track_name.
    pub fn select_track_names(&self, assay_track_name: &str) -> Result<Vec<String>> {
        let names: Vec<String> = self
            .query_rows(
                "SELECT DISTINCT track_name FROM ChipSeqTable
                 WHERE assay_track_name = :assay_track_name
                 ORDER BY track_name",
                named_params! { ":assay_track_name": assay_track_name },
                |row| row.get(0),
            )
            .map_err(DbError::Read)
            .inspect_err(|e| {
                log::error!(
                    "Could not select track names for {assay_track_name}. Check if the table exists: {e}"
                )
            })?;

        log::info!(
            "Selected {} track names associated with assay track name: {assay_track_name}",
            names.len()
        );
        Ok(names)
    }

    /// Full records for a track name, in insertion order.
    pub fn select_records(&self, track_name: &str) -> Result<Vec<TrackRecord>> {
        let records = self
            .query_rows(
                "SELECT * FROM ChipSeqTable WHERE track_name = :track_name ORDER BY rowid",
                named_params! { ":track_name": track_name },
                TrackRecord::from_row,
            )
            .map_err(DbError::Read)
            .inspect_err(|e| log::error!("Could not select records for {track_name}: {e}"))?;

        log::info!("Selected {} records with track name: {track_name}", records.len());
        Ok(records)
    }

    pub fn count_rows(&self) -> Result<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM ChipSeqTable", [], |row| row.get(0))
            .map_err(DbError::Read)
            .inspect_err(|e| log::error!("Could not count rows: {e}"))
    }

    /// Rename an assay on every row that carries it. Returns rows changed.
    pub fn update_assay(&self, assay: &str, assay_new: &str) -> Result<usize> {
        let changed = self
            .conn
            .execute(
                "UPDATE ChipSeqTable SET assay = :assay_new WHERE assay = :assay",
                named_params! { ":assay_new": assay_new, ":assay": assay },
            )
            .map_err(DbError::Write)
            .inspect_err(|e| log::error!("Could not update assay {assay} to {assay_new}: {e}"))?;

        log::info!("Assay {assay} was updated to {assay_new} on {changed} rows");
        Ok(changed)
    }

    /// Rename a donor on every row that carries the old name. Returns rows changed.
    pub fn update_donor(&self, donor: &str, donor_new: &str) -> Result<usize> {
        let changed = self
            .conn
            .execute(
                "UPDATE ChipSeqTable SET donor = :donor_new WHERE donor = :donor",
                named_params! { ":donor_new": donor_new, ":donor": donor },
            )
            .map_err(DbError::Write)
            .inspect_err(|e| log::error!("Could not update donor {donor} to {donor_new}: {e}"))?;

        log::info!("Donor {donor} was updated to {donor_new} on {changed} rows");
        Ok(changed)
    }

    /// Delete every row with this track name. Returns rows deleted.
    pub fn delete_track_name(&self, track_name: &str) -> Result<usize> {
        let deleted = self
            .conn
            .execute(
                "DELETE FROM ChipSeqTable WHERE track_name = :track_name",
                named_params! { ":track_name": track_name },
            )
            .map_err(DbError::Write)
            .inspect_err(|e| log::error!("Could not delete {track_name}: {e}"))?;

        log::info!("Deleted {deleted} rows where track name is \"{track_name}\"");
        Ok(deleted)
    }

    fn query_rows<T, P, F>(&self, sql: &str, params: P, f: F) -> rusqlite::Result<Vec<T>>
    where
        P: Params,
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map(params, f)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}
