use async_trait::async_trait;
use std::io::{ErrorKind, SeekFrom};
use std::path::{Path, PathBuf};
use tether_core::{ChatMessage, PersistenceError, SessionId, TranscriptStore};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

const EXTENSION: &str = "jsonl";

/// Transcript store keeping one JSON Lines file per session.
///
/// Each line is one `{role, content, timestamp}` record. Appends go through
/// `O_APPEND` and are synced before returning. A crash mid-append can at worst
/// leave an unterminated final line. If it parses it is kept and the next
/// append terminates it; otherwise `load` skips it and the next append
/// truncates it.
pub struct FileTranscriptStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl FileTranscriptStore {
    pub async fn new(dir: PathBuf) -> Result<Self, PersistenceError> {
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| PersistenceError::io(&dir, e))?;

        info!("Transcript directory: {}", dir.display());
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn transcript_path(&self, session_id: &SessionId) -> PathBuf {
        self.dir
            .join(format!("{}.{EXTENSION}", encode_file_stem(session_id.as_str())))
    }

    /// Sessions that have a transcript on disk, sorted by id.
    pub async fn list_sessions(&self) -> Result<Vec<SessionId>, PersistenceError> {
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .map_err(|e| PersistenceError::io(&self.dir, e))?;

        let mut sessions = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| PersistenceError::io(&self.dir, e))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(id) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(decode_file_stem)
            {
                sessions.push(SessionId::new(id));
            }
        }

        sessions.sort();
        Ok(sessions)
    }
}

const TAIL_CHUNK: usize = 4096;

/// Length of the file up to and including its last newline.
async fn complete_len(file: &mut File) -> std::io::Result<u64> {
    let mut end = file.metadata().await?.len();
    let mut buf = vec![0_u8; TAIL_CHUNK];
    while end > 0 {
        let start = end.saturating_sub(TAIL_CHUNK as u64);
        let chunk = usize::try_from(end - start).unwrap_or(TAIL_CHUNK);
        file.seek(SeekFrom::Start(start)).await?;
        file.read_exact(&mut buf[..chunk]).await?;
        if let Some(pos) = buf[..chunk].iter().rposition(|&b| b == b'\n') {
            return Ok(start + pos as u64 + 1);
        }
        end = start;
    }
    Ok(0)
}

/// Make the file end on a line boundary before appending.
///
/// A final line missing only its newline is kept and terminated; an
/// unparseable one is the remnant of an interrupted append and is cut off.
async fn repair_tail(file: &mut File, path: &Path) -> Result<(), PersistenceError> {
    let len = file
        .metadata()
        .await
        .map_err(|e| PersistenceError::io(path, e))?
        .len();
    let complete = complete_len(file)
        .await
        .map_err(|e| PersistenceError::io(path, e))?;
    if complete == len {
        return Ok(());
    }

    let mut tail = Vec::new();
    file.seek(SeekFrom::Start(complete))
        .await
        .map_err(|e| PersistenceError::io(path, e))?;
    file.read_to_end(&mut tail)
        .await
        .map_err(|e| PersistenceError::io(path, e))?;

    if serde_json::from_slice::<ChatMessage>(&tail).is_ok() {
        debug!("Terminating unfinished final line of {}", path.display());
        file.write_all(b"\n")
            .await
            .map_err(|e| PersistenceError::io(path, e))?;
    } else {
        warn!(
            "Truncating {} torn bytes at the end of {}",
            len - complete,
            path.display()
        );
        file.set_len(complete)
            .await
            .map_err(|e| PersistenceError::io(path, e))?;
    }
    Ok(())
}

#[async_trait]
impl TranscriptStore for FileTranscriptStore {
    async fn append(
        &self,
        session_id: &SessionId,
        message: &ChatMessage,
    ) -> Result<(), PersistenceError> {
        let path = self.transcript_path(session_id);
        let mut line = serde_json::to_string(message)?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| PersistenceError::io(&path, e))?;

        repair_tail(&mut file, &path).await?;

        file.write_all(line.as_bytes())
            .await
            .map_err(|e| PersistenceError::io(&path, e))?;
        file.flush()
            .await
            .map_err(|e| PersistenceError::io(&path, e))?;
        file.sync_data()
            .await
            .map_err(|e| PersistenceError::io(&path, e))?;

        debug!("Appended {} message to transcript {session_id}", message.role);
        Ok(())
    }

    async fn load(&self, session_id: &SessionId) -> Result<Vec<ChatMessage>, PersistenceError> {
        let path = self.transcript_path(session_id);
        let data = match tokio::fs::read_to_string(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(PersistenceError::io(&path, e)),
        };

        parse_transcript(&path, &data)
    }
}

fn parse_transcript(path: &Path, data: &str) -> Result<Vec<ChatMessage>, PersistenceError> {
    let complete = data.ends_with('\n');
    let lines: Vec<(usize, &str)> = data
        .lines()
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty())
        .collect();
    let last = lines.len().saturating_sub(1);

    let mut messages = Vec::with_capacity(lines.len());
    for (pos, (index, line)) in lines.into_iter().enumerate() {
        match serde_json::from_str::<ChatMessage>(line) {
            Ok(message) => messages.push(message),
            Err(e) if pos == last && !complete => {
                warn!(
                    "Skipping torn final line {} of {}: {e}",
                    index + 1,
                    path.display()
                );
            }
            Err(source) => {
                return Err(PersistenceError::Corrupt {
                    path: path.to_path_buf(),
                    line: index + 1,
                    source,
                });
            }
        }
    }

    Ok(messages)
}

const fn is_plain(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_')
}

/// Percent-encodes everything except `[A-Za-z0-9_-]` so any session id maps
/// to a distinct, portable file name.
fn encode_file_stem(id: &str) -> String {
    let mut out = String::with_capacity(id.len());
    for byte in id.bytes() {
        if is_plain(byte) {
            out.push(char::from(byte));
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}

fn decode_file_stem(stem: &str) -> Option<String> {
    let bytes = stem.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = stem.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}
