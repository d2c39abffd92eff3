//!  Storage is organized through [record_store::RecordStore].
//!  The basic idea is:
//!   - Every persisted value is an opaque json blob under a key, see [storage::KeyValueStorage].
//!   - Records are stored as one list under a single key, with one record per UTC day.
//!   - Expired records are dropped whenever entries are read.

pub mod entities;
pub mod record_store;
pub mod storage;
