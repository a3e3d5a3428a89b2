use crate::domain::model::Port;
use crate::utils::error::{PortError, Result};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

pub const DEFAULT_MAX_RECORD_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Envelope,
    FirstEntry,
    NextEntry,
    Done,
}

/// 以 pull 方式逐筆讀取 `{ "UNLOC": { ...port... }, ... }`。
///
/// 一次只在記憶體中保留一筆 port 的原始位元組，讀到最外層的 `}` 就停止，
/// 之後的內容不會被讀取。
pub struct PortStream<R> {
    reader: BufReader<R>,
    state: State,
    max_record_bytes: usize,
}

impl<R: AsyncRead + Unpin> PortStream<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            state: State::Envelope,
            max_record_bytes: DEFAULT_MAX_RECORD_BYTES,
        }
    }

    pub fn with_max_record_bytes(mut self, max_record_bytes: usize) -> Self {
        self.max_record_bytes = max_record_bytes;
        self
    }

    /// 讀取最外層物件的 `{`。空白輸入與非物件輸入都屬於呼叫端錯誤。
    pub async fn open(&mut self) -> Result<()> {
        if self.state != State::Envelope {
            return Ok(());
        }

        match self.skip_whitespace().await? {
            None => Err(PortError::EmptyInput),
            Some(b'{') => {
                self.reader.consume(1);
                self.state = State::FirstEntry;
                Ok(())
            }
            Some(other) => Err(PortError::InvalidEnvelope {
                reason: format!("expected '{{', found {}", describe(other)),
            }),
        }
    }

    /// 取得下一組 `(unloc, port)`；物件結束時回傳 `None`
    pub async fn next_entry(&mut self) -> Result<Option<(String, Port)>> {
        match self.state {
            State::Envelope => self.open().await?,
            State::Done => return Ok(None),
            State::FirstEntry | State::NextEntry => {}
        }

        let next = self.skip_whitespace().await?;
        let key_start = match (self.state, next) {
            (_, None) => return Err(truncated()),
            (_, Some(b'}')) => {
                self.reader.consume(1);
                self.state = State::Done;
                return Ok(None);
            }
            (State::FirstEntry, Some(byte)) => byte,
            (State::NextEntry, Some(b',')) => {
                self.reader.consume(1);
                self.skip_whitespace().await?.ok_or_else(truncated)?
            }
            (_, Some(byte)) => {
                return Err(PortError::MalformedKey {
                    reason: format!("expected ',' or '}}' after port, found {}", describe(byte)),
                })
            }
        };

        let unloc = self.read_key(key_start).await?;

        match self.skip_whitespace().await? {
            Some(b':') => self.reader.consume(1),
            Some(byte) => {
                return Err(PortError::MalformedKey {
                    reason: format!("expected ':' after {}, found {}", unloc, describe(byte)),
                })
            }
            None => return Err(truncated()),
        }

        self.skip_whitespace().await?;
        let raw = match self.read_raw().await? {
            Some(raw) => raw,
            None => {
                return Err(PortError::RecordTooLarge {
                    unloc,
                    limit: self.max_record_bytes,
                })
            }
        };

        let port = serde_json::from_slice::<Port>(&raw).map_err(|e| PortError::InvalidRecord {
            unloc: unloc.clone(),
            reason: e.to_string(),
        })?;

        self.state = State::NextEntry;
        Ok(Some((unloc, port)))
    }

    async fn read_key(&mut self, first: u8) -> Result<String> {
        if first != b'"' {
            return Err(PortError::MalformedKey {
                reason: format!("expected string key, found {}", describe(first)),
            });
        }

        let raw = self.read_raw().await?.ok_or_else(|| PortError::MalformedKey {
            reason: format!("key exceeds {} bytes", self.max_record_bytes),
        })?;

        serde_json::from_slice::<String>(&raw).map_err(|e| PortError::MalformedKey {
            reason: e.to_string(),
        })
    }

    /// 回傳下一個非空白字元但不消耗它
    async fn skip_whitespace(&mut self) -> Result<Option<u8>> {
        loop {
            let buf = self.reader.fill_buf().await?;
            if buf.is_empty() {
                return Ok(None);
            }

            let skipped = buf.iter().take_while(|b| is_whitespace(**b)).count();
            if skipped < buf.len() {
                let next = buf[skipped];
                self.reader.consume(skipped);
                return Ok(Some(next));
            }

            let len = buf.len();
            self.reader.consume(len);
        }
    }

    /// 擷取一個完整的 JSON 值（字串、物件、陣列或純量）的原始位元組。
    /// 超過 `max_record_bytes` 時回傳 `None`；提早遇到 EOF 時回傳已讀取的部分，交給 serde_json 報錯。
    async fn read_raw(&mut self) -> Result<Option<Vec<u8>>> {
        let mut scanner = ValueScanner::default();
        let mut raw = Vec::new();

        loop {
            let chunk = self.reader.fill_buf().await?;
            if chunk.is_empty() {
                return Ok(Some(raw));
            }

            let mut used = 0;
            let mut finished = false;
            for &byte in chunk {
                match scanner.feed(byte) {
                    Step::Take => used += 1,
                    Step::Last => {
                        used += 1;
                        finished = true;
                        break;
                    }
                    Step::Stop => {
                        finished = true;
                        break;
                    }
                }
            }

            if raw.len() + used > self.max_record_bytes {
                return Ok(None);
            }

            raw.extend_from_slice(&chunk[..used]);
            self.reader.consume(used);

            if finished {
                return Ok(Some(raw));
            }
        }
    }
}

enum Step {
    Take,
    Last,
    Stop,
}

/// 追蹤括號深度與字串跳脫，找出單一 JSON 值的結尾
#[derive(Default)]
struct ValueScanner {
    depth: usize,
    in_string: bool,
    escaped: bool,
}

impl ValueScanner {
    fn feed(&mut self, byte: u8) -> Step {
        if self.in_string {
            if self.escaped {
                self.escaped = false;
            } else if byte == b'\\' {
                self.escaped = true;
            } else if byte == b'"' {
                self.in_string = false;
                if self.depth == 0 {
                    return Step::Last;
                }
            }
            return Step::Take;
        }

        match byte {
            b'"' => {
                self.in_string = true;
                Step::Take
            }
            b'{' | b'[' => {
                self.depth += 1;
                Step::Take
            }
            b'}' | b']' => {
                if self.depth == 0 {
                    return Step::Stop;
                }
                self.depth -= 1;
                if self.depth == 0 {
                    Step::Last
                } else {
                    Step::Take
                }
            }
            b',' if self.depth == 0 => Step::Stop,
            byte if self.depth == 0 && is_whitespace(byte) => Step::Stop,
            _ => Step::Take,
        }
    }
}

fn is_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r')
}

fn describe(byte: u8) -> String {
    if byte.is_ascii() {
        format!("{:?}", byte as char)
    } else {
        format!("0x{:02x}", byte)
    }
}

fn truncated() -> PortError {
    PortError::MalformedKey {
        reason: "unexpected end of input before closing '}'".to_string(),
    }
}
