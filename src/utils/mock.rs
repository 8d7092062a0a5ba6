use std::{
    fs,
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};

use tempfile::env::temp_dir;

use crate::storage::database::Database;

pub fn get_unix_timestamp_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis()
}

pub fn create_temp_db_path() -> PathBuf {
    let mut temp_path = temp_dir();
    temp_path.push(format!("kopi_test_{}.db", get_unix_timestamp_millis()));
    temp_path
}

pub fn create_temp_db_path_with_prefix(prefix: &str) -> PathBuf {
    let mut temp_path = temp_dir();
    temp_path.push(format!("{}_{}.db", prefix, get_unix_timestamp_millis()));
    temp_path
}

/// A database file under the system temp directory, removed on drop.
pub struct TempDatabase {
    pub path: PathBuf,
    pub database: Option<Database>,
}

impl TempDatabase {
    pub fn new() -> Self {
        Self {
            path: create_temp_db_path(),
            database: None,
        }
    }

    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            path: create_temp_db_path_with_prefix(prefix),
            database: None,
        }
    }

    pub fn open_database(&mut self) -> Result<&mut Database, Box<dyn std::error::Error>> {
        let db = Database::open(&self.path)?;
        self.database = Some(db);
        Ok(self.database.as_mut().unwrap())
    }

    pub fn get_database(&mut self) -> Option<&mut Database> {
        self.database.as_mut()
    }
}

impl Default for TempDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TempDatabase {
    fn drop(&mut self) {
        self.database = None;
        if self.path.exists() {
            let _ = fs::remove_file(&self.path);
        }
    }
}
