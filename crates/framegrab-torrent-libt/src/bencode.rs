//! Minimal bencode decoder used for metainfo parsing.

use std::collections::BTreeMap;
use std::ops::Range;

use crate::error::MetainfoError;

/// Deepest list or dictionary nesting accepted in a document.
const MAX_DEPTH: usize = 64;

/// Decoded bencode value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Bencode {
    Int(i64),
    Bytes(Vec<u8>),
    List(Vec<Bencode>),
    Dict(BTreeMap<Vec<u8>, Bencode>),
}

impl Bencode {
    pub(crate) fn get(&self, key: &[u8]) -> Option<&Self> {
        match self {
            Self::Dict(entries) => entries.get(key),
            _ => None,
        }
    }

    pub(crate) const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub(crate) fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub(crate) fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

/// Root value plus the raw byte range of the top-level `info` entry.
pub(crate) struct Document {
    pub(crate) root: Bencode,
    pub(crate) info_span: Option<Range<usize>>,
}

/// Decode a complete bencoded document; trailing bytes are rejected.
pub(crate) fn decode_document(input: &[u8]) -> Result<Document, MetainfoError> {
    let mut decoder = Decoder {
        input,
        pos: 0,
        depth: 0,
        info_span: None,
    };
    let root = decoder.value()?;
    if decoder.pos != input.len() {
        return Err(MetainfoError::Malformed {
            offset: decoder.pos,
            reason: "trailing data after root value",
        });
    }
    Ok(Document {
        root,
        info_span: decoder.info_span,
    })
}

struct Decoder<'a> {
    input: &'a [u8],
    pos: usize,
    depth: usize,
    info_span: Option<Range<usize>>,
}

impl Decoder<'_> {
    fn peek(&self) -> Result<u8, MetainfoError> {
        self.input
            .get(self.pos)
            .copied()
            .ok_or(MetainfoError::UnexpectedEof { offset: self.pos })
    }

    fn value(&mut self) -> Result<Bencode, MetainfoError> {
        match self.peek()? {
            b'i' => self.int(),
            b'l' => self.list(),
            b'd' => self.dict(),
            b'0'..=b'9' => self.bytes().map(Bencode::Bytes),
            _ => Err(MetainfoError::Malformed {
                offset: self.pos,
                reason: "unexpected token",
            }),
        }
    }

    fn read_until(&mut self, terminator: u8) -> Result<&[u8], MetainfoError> {
        let start = self.pos;
        let relative = self.input[start..]
            .iter()
            .position(|byte| *byte == terminator)
            .ok_or(MetainfoError::UnexpectedEof {
                offset: self.input.len(),
            })?;
        self.pos = start + relative + 1;
        Ok(&self.input[start..start + relative])
    }

    fn int(&mut self) -> Result<Bencode, MetainfoError> {
        let offset = self.pos;
        self.pos += 1;
        let digits = self.read_until(b'e')?;
        let value = std::str::from_utf8(digits)
            .ok()
            .and_then(|text| text.parse::<i64>().ok())
            .ok_or(MetainfoError::Malformed {
                offset,
                reason: "invalid integer",
            })?;
        Ok(Bencode::Int(value))
    }

    fn bytes(&mut self) -> Result<Vec<u8>, MetainfoError> {
        let offset = self.pos;
        let digits = self.read_until(b':')?;
        let len = std::str::from_utf8(digits)
            .ok()
            .and_then(|text| text.parse::<usize>().ok())
            .ok_or(MetainfoError::Malformed {
                offset,
                reason: "invalid string length",
            })?;
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.input.len())
            .ok_or(MetainfoError::UnexpectedEof {
                offset: self.input.len(),
            })?;
        let bytes = self.input[self.pos..end].to_vec();
        self.pos = end;
        Ok(bytes)
    }

    fn enter(&mut self) -> Result<(), MetainfoError> {
        if self.depth >= MAX_DEPTH {
            return Err(MetainfoError::Malformed {
                offset: self.pos,
                reason: "nesting too deep",
            });
        }
        self.pos += 1;
        self.depth += 1;
        Ok(())
    }

    fn list(&mut self) -> Result<Bencode, MetainfoError> {
        self.enter()?;
        let mut items = Vec::new();
        while self.peek()? != b'e' {
            items.push(self.value()?);
        }
        self.pos += 1;
        self.depth -= 1;
        Ok(Bencode::List(items))
    }

    fn dict(&mut self) -> Result<Bencode, MetainfoError> {
        self.enter()?;
        let mut entries = BTreeMap::new();
        while self.peek()? != b'e' {
            if !self.peek()?.is_ascii_digit() {
                return Err(MetainfoError::Malformed {
                    offset: self.pos,
                    reason: "dictionary key must be a byte string",
                });
            }
            let key = self.bytes()?;
            let value_start = self.pos;
            let value = self.value()?;
            if self.depth == 1 && key == b"info" {
                self.info_span = Some(value_start..self.pos);
            }
            entries.insert(key, value);
        }
        self.pos += 1;
        self.depth -= 1;
        Ok(Bencode::Dict(entries))
    }
}
