use std::fs::{File, OpenOptions};
use std::path::Path;

use memmap2::{MmapMut, MmapOptions};

use crate::{
    storage::{
        GROWTH_FACTOR, INITIAL_FILE_SIZE, SYNC_INTERVAL_ROWS, TABLE_HEADER_SIZE, codec,
        header::{ROW_COUNT_OFFSET, TableHeader},
        schema::{self, TableSchema},
    },
    types::{
        error::{DatabaseError, Result},
        value::Value,
    },
};

/// Append-only, fixed-width-row, memory-mapped table. Rows are never updated
/// or deleted in place; the only mutations are appends and growth of the
/// backing mapping.
///
/// A `Table` is logically single-writer. Two handles opening the same file
/// concurrently is undefined behavior; serializing that is the caller's
/// responsibility. Read-only operations on a table that is not being
/// appended to are safe to share.
#[derive(Debug)]
pub struct Table {
    file: File,
    mmap: Option<MmapMut>,
    schema: TableSchema,
    mapped_size: usize,
    write_offset: usize,
    row_count: u64,
    rows_since_sync: u64,
}

impl Table {
    /// Create a fresh table file from DDL. Refuses to overwrite: fails if a
    /// file already exists at `path` with any content.
    pub fn create<P: AsRef<Path>>(path: P, ddl: &str) -> Result<Self> {
        let path = path.as_ref();
        let table_schema = schema::parse_create_table(ddl)?;
        let header = TableHeader::new(table_schema)?;

        if path.exists() && std::fs::metadata(path)?.len() > 0 {
            return Err(DatabaseError::FileExists {
                name: header.schema.table_name.clone(),
            });
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)?;
        let initial_size = INITIAL_FILE_SIZE.max(TABLE_HEADER_SIZE + header.schema.row_width);
        file.set_len(initial_size as u64)?;
        let mut mmap = unsafe { MmapOptions::new().map_mut(&file)? };

        mmap[..TABLE_HEADER_SIZE].copy_from_slice(&header.to_bytes());
        mmap.flush_range(0, TABLE_HEADER_SIZE)?;

        Ok(Self {
            file,
            mmap: Some(mmap),
            schema: header.schema,
            mapped_size: initial_size,
            write_offset: TABLE_HEADER_SIZE,
            row_count: 0,
            rows_since_sync: 0,
        })
    }

    /// Open an existing table file, reconstructing its schema from the
    /// header. The reconstructed schema is identical to the one the file was
    /// created with (round-trip invariant).
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        let file_size = file.metadata()?.len() as usize;
        if file_size < TABLE_HEADER_SIZE {
            return Err(DatabaseError::InvalidHeader {
                reason: "file smaller than table header".to_string(),
            });
        }
        let mmap = unsafe { MmapOptions::new().map_mut(&file)? };
        let header = TableHeader::from_bytes(&mmap[..TABLE_HEADER_SIZE])?;

        // The row count lives outside the checksummed header region, so it
        // must be range-checked like any other untrusted input.
        let write_offset = (header.row_count as usize)
            .checked_mul(header.schema.row_width)
            .and_then(|data_bytes| data_bytes.checked_add(TABLE_HEADER_SIZE))
            .ok_or_else(|| DatabaseError::InvalidHeader {
                reason: format!("row count {} overflows addressable size", header.row_count),
            })?;
        if write_offset > file_size {
            return Err(DatabaseError::InvalidHeader {
                reason: format!(
                    "row count {} overstates file size {}",
                    header.row_count, file_size
                ),
            });
        }

        Ok(Self {
            file,
            mmap: Some(mmap),
            schema: header.schema,
            mapped_size: file_size,
            write_offset,
            row_count: header.row_count,
            rows_since_sync: 0,
        })
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    pub fn is_open(&self) -> bool {
        self.mmap.is_some()
    }

    /// Append one row. All-or-nothing: a codec or growth failure leaves the
    /// row count and stored bytes unchanged. The row bytes are written before
    /// the persisted count is bumped, so a crash in between understates the
    /// appended data rather than exposing a half-written row.
    pub fn append_row(&mut self, values: &[Value]) -> Result<()> {
        if self.mmap.is_none() {
            return Err(DatabaseError::HandleClosed);
        }
        let encoded = codec::encode_row(&self.schema, values)?;
        self.ensure_capacity(encoded.len())?;

        let Some(mmap) = self.mmap.as_mut() else {
            return Err(DatabaseError::HandleClosed);
        };
        mmap[self.write_offset..self.write_offset + encoded.len()].copy_from_slice(&encoded);

        self.row_count += 1;
        mmap[ROW_COUNT_OFFSET..ROW_COUNT_OFFSET + 8]
            .copy_from_slice(&self.row_count.to_le_bytes());
        self.write_offset += self.schema.row_width;

        self.rows_since_sync += 1;
        if self.rows_since_sync >= SYNC_INTERVAL_ROWS {
            mmap.flush_async()?;
            self.rows_since_sync = 0;
        }
        Ok(())
    }

    /// Persisted row count, O(1).
    pub fn row_count(&self) -> Result<u64> {
        if self.mmap.is_none() {
            return Err(DatabaseError::HandleClosed);
        }
        Ok(self.row_count)
    }

    /// Full sequential scan in storage order, decoding each row and handing
    /// it to the consumer.
    pub fn scan<F>(&self, mut consumer: F) -> Result<()>
    where
        F: FnMut(&[Value]),
    {
        let Some(mmap) = self.mmap.as_ref() else {
            return Err(DatabaseError::HandleClosed);
        };
        for i in 0..self.row_count as usize {
            let offset = TABLE_HEADER_SIZE + i * self.schema.row_width;
            let values = codec::decode_row(&self.schema, &mmap[offset..offset + self.schema.row_width])?;
            consumer(&values);
        }
        Ok(())
    }

    /// Force dirty pages of the mapping out to the backing file.
    pub fn flush(&mut self) -> Result<()> {
        let Some(mmap) = self.mmap.as_mut() else {
            return Err(DatabaseError::HandleClosed);
        };
        mmap.flush()?;
        self.rows_since_sync = 0;
        Ok(())
    }

    /// Flush and release the mapping. Idempotent: closing an already-closed
    /// table is a no-op. Data appended before a successful close is durable.
    pub fn close(&mut self) -> Result<()> {
        if let Some(mmap) = self.mmap.take() {
            mmap.flush()?;
            self.file.sync_all()?;
        }
        Ok(())
    }

    /// Grow the mapping so the next `needed` bytes fit, doubling the mapped
    /// extent to amortize remap cost. A failed growth is retried once at the
    /// minimal size actually required before surfacing NOMEM.
    fn ensure_capacity(&mut self, needed: usize) -> Result<()> {
        if self.mmap.is_none() {
            return Err(DatabaseError::HandleClosed);
        }
        if self.write_offset + needed <= self.mapped_size {
            return Ok(());
        }
        let doubled = (self.mapped_size * GROWTH_FACTOR).max(self.write_offset + needed);
        if self.remap(doubled).is_ok() {
            return Ok(());
        }
        let minimal = round_to_page(self.write_offset + needed);
        self.remap(minimal).map_err(|err| DatabaseError::OutOfMemory {
            details: format!("failed to grow mapping to {} bytes: {}", minimal, err),
        })
    }

    fn remap(&mut self, new_size: usize) -> Result<()> {
        if let Some(mmap) = self.mmap.as_mut() {
            mmap.flush()?;
        }
        self.file.set_len(new_size as u64)?;
        let mmap = unsafe { MmapOptions::new().map_mut(&self.file)? };
        self.mmap = Some(mmap);
        self.mapped_size = new_size;
        Ok(())
    }
}

impl Drop for Table {
    fn drop(&mut self) {
        // Best-effort close; errors cannot surface from Drop.
        let _ = self.close();
    }
}

fn round_to_page(size: usize) -> usize {
    const PAGE: usize = 4096;
    size.div_ceil(PAGE) * PAGE
}
