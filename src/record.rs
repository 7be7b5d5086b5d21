//! Fixed-width binary position records.
//!
//! Every record is 30 little-endian bytes:
//!
//! | bytes     | field         | encoding                         |
//! |-----------|---------------|----------------------------------|
//! | `[0,4)`   | position id   | `u32`                            |
//! | `[4,14)`  | registration  | 10 bytes, NUL padded             |
//! | `[14,18)` | latitude      | `f32`                            |
//! | `[18,22)` | longitude     | `f32`                            |
//! | `[22,30)` | timestamp     | `u64` seconds since unix epoch   |
//!
//! Range checks are not done here; the grid rejects bad coordinates.

use crate::error::{FleetError, Result};
use bytes::{Buf, BufMut, BytesMut};
use fleetgrid_types::location::Location;
use fleetgrid_types::track::Track;
use serde::{Deserialize, Serialize};
use std::io::{ErrorKind, Read, Write};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Size of one encoded record in bytes.
pub const RECORD_SIZE: usize = 30;

/// Width of the registration field in bytes.
pub const REGISTRATION_LEN: usize = 10;

/// One decoded position record.
///
/// In direct mode this is the vehicle itself: every record is indexed on its
/// own and records sharing a registration are never merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionRecord {
    #[serde(rename = "positionId")]
    pub position_id: u32,
    pub registration: String,
    pub location: Location,
    pub timestamp: SystemTime,
}

impl PositionRecord {
    pub fn new(
        position_id: u32,
        registration: impl Into<String>,
        location: Location,
        timestamp: SystemTime,
    ) -> Self {
        Self {
            position_id,
            registration: registration.into(),
            location,
            timestamp,
        }
    }

    /// Decode the first 30 bytes of `buf`.
    ///
    /// Fails with `MalformedRecord` when fewer than 30 bytes are available.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < RECORD_SIZE {
            return Err(FleetError::MalformedRecord { len: buf.len() });
        }
        let mut buf = &buf[..RECORD_SIZE];

        let position_id = buf.get_u32_le();

        let mut registration = [0u8; REGISTRATION_LEN];
        buf.copy_to_slice(&mut registration);
        let end = registration
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(REGISTRATION_LEN);
        let registration = String::from_utf8_lossy(&registration[..end]).into_owned();

        let lat = f64::from(buf.get_f32_le());
        let lon = f64::from(buf.get_f32_le());
        let timestamp = UNIX_EPOCH + Duration::from_secs(buf.get_u64_le());

        Ok(Self {
            position_id,
            registration,
            location: Location::new(lat, lon),
            timestamp,
        })
    }

    /// Append the 30-byte encoding of this record to `buf`.
    ///
    /// Coordinates are narrowed to `f32`.
    pub fn encode_into(&self, buf: &mut BytesMut) -> Result<()> {
        let reg = self.registration.as_bytes();
        if reg.len() > REGISTRATION_LEN {
            return Err(FleetError::InvalidRegistration(self.registration.clone()));
        }
        let secs = self
            .timestamp
            .duration_since(UNIX_EPOCH)
            .map_err(|_| FleetError::InvalidTimestamp)?
            .as_secs();

        buf.reserve(RECORD_SIZE);
        buf.put_u32_le(self.position_id);
        buf.put_slice(reg);
        buf.put_bytes(0, REGISTRATION_LEN - reg.len());
        buf.put_f32_le(self.location.lat as f32);
        buf.put_f32_le(self.location.lon as f32);
        buf.put_u64_le(secs);
        Ok(())
    }

    pub fn encode(&self) -> Result<[u8; RECORD_SIZE]> {
        let mut buf = BytesMut::with_capacity(RECORD_SIZE);
        self.encode_into(&mut buf)?;
        let mut out = [0u8; RECORD_SIZE];
        out.copy_from_slice(&buf);
        Ok(out)
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.encode()?)?;
        Ok(())
    }

    /// The track sample carried by this record.
    pub fn to_track(&self) -> Track {
        Track::new(self.position_id, self.location, self.timestamp)
    }
}

/// Streams records out of a byte source one at a time.
pub struct RecordReader<R> {
    reader: R,
    buf: [u8; RECORD_SIZE],
    offset: u64,
}

impl<R: Read> RecordReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: [0u8; RECORD_SIZE],
            offset: 0,
        }
    }

    /// Byte offset of the next record.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Read the next record.
    ///
    /// Returns `Ok(None)` at a clean end of input and `MalformedRecord` when
    /// the input ends partway through a record.
    pub fn read_record(&mut self) -> Result<Option<PositionRecord>> {
        let mut filled = 0;
        while filled < RECORD_SIZE {
            match self.reader.read(&mut self.buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        if filled == 0 {
            return Ok(None);
        }

        let record = PositionRecord::decode(&self.buf[..filled])?;
        self.offset += RECORD_SIZE as u64;
        Ok(Some(record))
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = Result<PositionRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_record().transpose()
    }
}
