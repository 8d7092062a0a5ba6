use std::{
    collections::HashMap,
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    planner::{
        parser::SqlParser,
        statement::{Projection, Statement},
    },
    storage::{BYTE_ORDER_LITTLE, DATABASE_FORMAT_VERSION, DATABASE_MAGIC, schema::TableSchema},
    types::{
        error::{DatabaseError, Result},
        row::Row,
        value::Value,
    },
};

const DB_HEADER_SIZE: usize = 20;

/// One general-path table: its schema plus variable-length row storage in
/// insertion order. Persisted as one bincode payload per table.
#[derive(Serialize, Deserialize)]
struct TableStore {
    schema: TableSchema,
    rows: Vec<Row>,
}

/// General-path database handle: named tables created via SQL DDL, persisted
/// as a single catalog file. All mutation goes through `exec`, all reads
/// through `query`.
///
/// Mutating calls must be serialized by the caller; opening the same file
/// from two handles concurrently is undefined behavior and is the caller's
/// responsibility to avoid.
pub struct Database {
    path: PathBuf,
    tables: HashMap<String, TableStore>,
    parser: SqlParser,
    dirty: bool,
    open: bool,
}

impl Database {
    /// Open a database file, loading its catalog, or create a fresh one if
    /// the path does not exist yet.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut db = Self {
            path,
            tables: HashMap::new(),
            parser: SqlParser::new(),
            dirty: false,
            open: true,
        };
        if db.path.exists() && std::fs::metadata(&db.path)?.len() > 0 {
            db.load()?;
        } else {
            db.save()?;
        }
        Ok(db)
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Execute a DDL/DML statement. CREATE and INSERT are atomic with respect
    /// to their own failure paths: either the table/rows exist afterwards or
    /// nothing changed.
    pub fn exec(&mut self, sql: &str) -> Result<()> {
        if !self.open {
            return Err(DatabaseError::HandleClosed);
        }
        match self.parser.parse(sql)? {
            Statement::CreateTable { schema } => self.create_table(schema),
            Statement::Insert { table_name, rows } => self.insert_rows(&table_name, rows),
            // Original engine semantics: a SELECT through exec runs the scan
            // with no consumer attached.
            select @ Statement::Select { .. } => self.execute_select(&select, &mut |_, _| {}),
        }
    }

    /// Execute a SELECT, delivering each matching row to the consumer as
    /// `(column_names, stringified_values)` in storage (insertion) order.
    pub fn query<F>(&self, sql: &str, mut consumer: F) -> Result<()>
    where
        F: FnMut(&[String], &[String]),
    {
        if !self.open {
            return Err(DatabaseError::HandleClosed);
        }
        let statement = self.parser.parse(sql)?;
        match statement {
            select @ Statement::Select { .. } => self.execute_select(&select, &mut consumer),
            _ => Err(DatabaseError::UnsupportedStatement {
                details: "query() accepts SELECT statements only".to_string(),
            }),
        }
    }

    /// Names of all tables in the catalog, sorted.
    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn table_exists(&self, table_name: &str) -> bool {
        self.tables.contains_key(table_name)
    }

    /// Persist dirty state to the backing file.
    pub fn flush(&mut self) -> Result<()> {
        if !self.open {
            return Err(DatabaseError::HandleClosed);
        }
        if self.dirty {
            self.save()?;
            self.dirty = false;
        }
        Ok(())
    }

    /// Flush all dirty state and close the handle. Idempotent; any further
    /// operation on the handle fails.
    pub fn close(&mut self) -> Result<()> {
        if self.open {
            if self.dirty {
                self.save()?;
                self.dirty = false;
            }
            self.open = false;
        }
        Ok(())
    }

    fn create_table(&mut self, schema: TableSchema) -> Result<()> {
        if self.tables.contains_key(&schema.table_name) {
            return Err(DatabaseError::DuplicateTable {
                name: schema.table_name,
            });
        }
        self.tables.insert(
            schema.table_name.clone(),
            TableStore {
                schema,
                rows: Vec::new(),
            },
        );
        self.dirty = true;
        Ok(())
    }

    fn insert_rows(&mut self, table_name: &str, rows: Vec<Vec<Value>>) -> Result<()> {
        let store =
            self.tables
                .get_mut(table_name)
                .ok_or_else(|| DatabaseError::TableNotFound {
                    name: table_name.to_string(),
                })?;
        // Validate every row before storing any, so a failure mutates nothing.
        for values in &rows {
            store.schema.validate_values(values)?;
        }
        for values in rows {
            store.rows.push(Row::new(values));
        }
        self.dirty = true;
        Ok(())
    }

    fn execute_select<F>(&self, statement: &Statement, consumer: &mut F) -> Result<()>
    where
        F: FnMut(&[String], &[String]),
    {
        let Statement::Select {
            table_name,
            projection,
            predicate,
        } = statement
        else {
            return Err(DatabaseError::UnsupportedStatement {
                details: "expected SELECT".to_string(),
            });
        };
        let store = self
            .tables
            .get(table_name)
            .ok_or_else(|| DatabaseError::TableNotFound {
                name: table_name.clone(),
            })?;

        let column_indices = self.resolve_projection(&store.schema, projection)?;
        if let Some(predicate) = predicate {
            predicate.validate_against_schema(&store.schema)?;
        }

        let column_names: Vec<String> = column_indices
            .iter()
            .map(|&i| store.schema.columns[i].name.clone())
            .collect();

        for row in &store.rows {
            let matches = match predicate {
                Some(predicate) => predicate.evaluate(row, &store.schema)?,
                None => true,
            };
            if !matches {
                continue;
            }
            let values: Vec<String> = column_indices
                .iter()
                .map(|&i| row.values[i].to_string())
                .collect();
            consumer(&column_names, &values);
        }
        Ok(())
    }

    fn resolve_projection(
        &self,
        schema: &TableSchema,
        projection: &Projection,
    ) -> Result<Vec<usize>> {
        match projection {
            Projection::All => Ok((0..schema.columns.len()).collect()),
            Projection::Columns(names) => names
                .iter()
                .map(|name| {
                    schema
                        .column_index(name)
                        .ok_or_else(|| DatabaseError::ColumnNotFound {
                            name: name.clone(),
                            table: schema.table_name.clone(),
                        })
                })
                .collect(),
        }
    }

    fn save(&self) -> Result<()> {
        let mut buffer = Vec::new();
        buffer.extend_from_slice(DATABASE_MAGIC);
        buffer.extend_from_slice(&DATABASE_FORMAT_VERSION.to_le_bytes());
        buffer.push(BYTE_ORDER_LITTLE);
        buffer.extend_from_slice(&[0u8; 3]);
        buffer.extend_from_slice(&(self.tables.len() as u32).to_le_bytes());

        for name in self.table_names() {
            let store = &self.tables[&name];
            let payload = bincode::serde::encode_to_vec(store, bincode::config::standard())
                .map_err(|err| DatabaseError::SerializationError {
                    details: err.to_string(),
                })?;
            buffer.extend_from_slice(&(payload.len() as u32).to_le_bytes());
            buffer.extend_from_slice(&payload);
        }

        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)?;
        file.write_all(&buffer)?;
        file.sync_all()?;
        Ok(())
    }

    fn load(&mut self) -> Result<()> {
        let bytes = std::fs::read(&self.path)?;
        if bytes.len() < DB_HEADER_SIZE {
            return Err(DatabaseError::InvalidHeader {
                reason: "database file smaller than header".to_string(),
            });
        }
        if &bytes[0..8] != DATABASE_MAGIC {
            return Err(DatabaseError::InvalidHeader {
                reason: "unrecognized database magic tag".to_string(),
            });
        }
        let version = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
        if version != DATABASE_FORMAT_VERSION {
            return Err(DatabaseError::InvalidHeader {
                reason: format!("unsupported database format version {}", version),
            });
        }
        if bytes[12] != BYTE_ORDER_LITTLE {
            return Err(DatabaseError::InvalidHeader {
                reason: "database catalog must be little-endian".to_string(),
            });
        }
        let table_count = u32::from_le_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]);

        let mut cursor = DB_HEADER_SIZE;
        for _ in 0..table_count {
            let length = read_u32(&bytes, &mut cursor)? as usize;
            let end = cursor + length;
            let payload = bytes.get(cursor..end).ok_or_else(truncated)?;
            let (store, _): (TableStore, usize) =
                bincode::serde::decode_from_slice(payload, bincode::config::standard())
                    .map_err(|err| DatabaseError::SerializationError {
                        details: err.to_string(),
                    })?;
            cursor = end;
            self.tables.insert(store.schema.table_name.clone(), store);
        }
        Ok(())
    }
}

impl Drop for Database {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

fn read_u32(bytes: &[u8], cursor: &mut usize) -> Result<u32> {
    let end = *cursor + 4;
    let slice = bytes.get(*cursor..end).ok_or_else(truncated)?;
    let mut raw = [0u8; 4];
    raw.copy_from_slice(slice);
    *cursor = end;
    Ok(u32::from_le_bytes(raw))
}

fn truncated() -> DatabaseError {
    DatabaseError::SerializationError {
        details: "truncated database file".to_string(),
    }
}
