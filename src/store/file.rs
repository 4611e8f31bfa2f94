use crate::core::LogEvent;
use crate::store::EventLogStore;
use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

/// Sync word opening every record
const SYNC_WORD: u32 = 0xEDA1_DA01;

/// Upper bound on channel name length, to catch corrupt headers early
const MAX_CHANNEL_LEN: u32 = 1024;

/// Upper bound on payload length (128 MiB)
const MAX_PAYLOAD_LEN: u32 = 128 * 1024 * 1024;

/// File-backed event log reader
///
/// Records are framed as: a 4-byte sync word, big-endian event number (i64),
/// timestamp in microseconds (i64), channel length (u32) and payload length
/// (u32), followed by the channel name (UTF-8) and the payload bytes.
///
/// End-of-file exactly at a record boundary is a clean end-of-log; a bad sync
/// word, a short read, or an implausible header is an error.
pub struct FileLogStore {
    reader: BufReader<File>,
}

impl FileLogStore {
    /// Open a log file for reading
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = File::open(path)?;
        Ok(Self {
            reader: BufReader::new(file),
        })
    }

    fn read_u32(&mut self) -> io::Result<u32> {
        let mut buf = [0u8; 4];
        self.reader.read_exact(&mut buf)?;
        Ok(u32::from_be_bytes(buf))
    }

    fn read_i64(&mut self) -> io::Result<i64> {
        let mut buf = [0u8; 8];
        self.reader.read_exact(&mut buf)?;
        Ok(i64::from_be_bytes(buf))
    }
}

impl EventLogStore for FileLogStore {
    fn tell(&mut self) -> io::Result<u64> {
        self.reader.stream_position()
    }

    fn read_next_event(&mut self) -> io::Result<Option<LogEvent>> {
        // EOF before the first sync byte is a clean end-of-log; EOF anywhere
        // inside a record is a truncated log.
        let mut sync = [0u8; 4];
        let mut filled = 0;
        while filled < sync.len() {
            let n = self.reader.read(&mut sync[filled..])?;
            if n == 0 {
                if filled == 0 {
                    return Ok(None);
                }
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "log ends inside a record header",
                ));
            }
            filled += n;
        }

        if u32::from_be_bytes(sync) != SYNC_WORD {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "bad sync word in log record",
            ));
        }

        let _event_number = self.read_i64()?;
        let timestamp = self.read_i64()?;
        let channel_len = self.read_u32()?;
        let payload_len = self.read_u32()?;

        if channel_len > MAX_CHANNEL_LEN || payload_len > MAX_PAYLOAD_LEN {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "implausible record header: {} channel bytes, {} payload bytes",
                    channel_len, payload_len
                ),
            ));
        }

        let mut channel = vec![0u8; channel_len as usize];
        self.reader.read_exact(&mut channel)?;
        let channel = String::from_utf8(channel)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let mut payload = vec![0u8; payload_len as usize];
        self.reader.read_exact(&mut payload)?;

        Ok(Some(LogEvent {
            channel,
            timestamp,
            payload,
        }))
    }

    fn seek(&mut self, position: u64) -> io::Result<()> {
        self.reader.seek(SeekFrom::Start(position)).map(|_| ())
    }
}
