//! Binary layout of registry accounts and instruction arguments.
//!
//! All integers are little-endian, strings are a `u32` byte length followed
//! by raw UTF-8, and there is no padding or alignment between fields. Every
//! persisted record starts with the 8-byte account discriminator.
//!
//! Reads go through [`ByteReader`], which advances by known field widths and
//! returns `MalformedAccount` on any out-of-range read instead of panicking.

use solana_sdk::pubkey::Pubkey;

use crate::{
    constants::{
        CLIENT_ENTRY_SIZE, DISCRIMINATOR_LEN, NODE_ENTRY_MIN_SIZE, NODE_ENTRY_SIZE, PUBKEY_LEN,
    },
    models::{AccountKind, ClientEntry, ClientInfo, NodeEntry, NodeInfo, RegistryError},
};

/// Forward-only cursor over account or return data.
#[derive(Debug)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn read_bytes(&mut self, len: usize, field: &str) -> Result<&'a [u8], RegistryError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| {
                RegistryError::MalformedAccount(format!(
                    "{field} needs {len} bytes at offset {}, only {} left",
                    self.pos,
                    self.remaining()
                ))
            })?;
        let data = self.data;
        let bytes = &data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    pub fn read_array<const N: usize>(&mut self, field: &str) -> Result<[u8; N], RegistryError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N, field)?);
        Ok(out)
    }

    pub fn read_pubkey(&mut self, field: &str) -> Result<Pubkey, RegistryError> {
        Ok(Pubkey::new_from_array(self.read_array::<PUBKEY_LEN>(field)?))
    }

    pub fn read_u8(&mut self, field: &str) -> Result<u8, RegistryError> {
        Ok(self.read_array::<1>(field)?[0])
    }

    /// Reads a one-byte flag: `1` is true, any other value is false.
    pub fn read_bool(&mut self, field: &str) -> Result<bool, RegistryError> {
        Ok(self.read_u8(field)? == 1)
    }

    pub fn read_u32(&mut self, field: &str) -> Result<u32, RegistryError> {
        Ok(u32::from_le_bytes(self.read_array(field)?))
    }

    pub fn read_i32(&mut self, field: &str) -> Result<i32, RegistryError> {
        Ok(i32::from_le_bytes(self.read_array(field)?))
    }

    pub fn read_i64(&mut self, field: &str) -> Result<i64, RegistryError> {
        Ok(i64::from_le_bytes(self.read_array(field)?))
    }

    /// Reads a `u32` length prefix followed by that many UTF-8 bytes.
    pub fn read_string(&mut self, field: &str) -> Result<String, RegistryError> {
        let len = self.read_u32(field)? as usize;
        let bytes = self.read_bytes(len, field)?;
        String::from_utf8(bytes.to_vec()).map_err(|e| {
            RegistryError::MalformedAccount(format!("{field} is not valid UTF-8: {e}"))
        })
    }

    /// Consumes the account discriminator and checks it belongs to `kind`.
    pub fn expect_discriminator(&mut self, kind: AccountKind) -> Result<(), RegistryError> {
        let found = self.read_array::<DISCRIMINATOR_LEN>("discriminator")?;
        if found != kind.discriminator() {
            return Err(RegistryError::MalformedAccount(format!(
                "discriminator {found:?} does not identify a {kind} account"
            )));
        }
        Ok(())
    }
}

/// Append-only writer for instruction payloads and account images.
#[derive(Debug, Default)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    /// Starts a buffer with the given 8-byte discriminator.
    pub fn with_discriminator(discriminator: [u8; 8]) -> Self {
        let mut writer = Self::default();
        writer.buf.extend_from_slice(&discriminator);
        writer
    }

    pub fn put_pubkey(&mut self, key: &Pubkey) -> &mut Self {
        self.buf.extend_from_slice(key.as_ref());
        self
    }

    pub fn put_bool(&mut self, value: bool) -> &mut Self {
        self.buf.push(u8::from(value));
        self
    }

    pub fn put_u32(&mut self, value: u32) -> &mut Self {
        self.buf.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn put_i32(&mut self, value: i32) -> &mut Self {
        self.buf.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn put_i64(&mut self, value: i64) -> &mut Self {
        self.buf.extend_from_slice(&value.to_le_bytes());
        self
    }

    /// Writes a `u32` byte length and the raw UTF-8 bytes.
    ///
    /// Callers bound the length first; strings here never approach `u32::MAX`.
    pub fn put_string(&mut self, value: &str) -> &mut Self {
        self.put_u32(value.len() as u32);
        self.buf.extend_from_slice(value.as_bytes());
        self
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

/// Decodes a client entry account.
///
/// Empty data means the entry does not exist and yields `Ok(None)`.
pub fn decode_client_entry(data: &[u8]) -> Result<Option<ClientEntry>, RegistryError> {
    if data.is_empty() {
        return Ok(None);
    }
    if data.len() != CLIENT_ENTRY_SIZE {
        return Err(RegistryError::MalformedAccount(format!(
            "client entry must be {CLIENT_ENTRY_SIZE} bytes, got {}",
            data.len()
        )));
    }

    let mut reader = ByteReader::new(data);
    reader.expect_discriminator(AccountKind::ClientEntry)?;
    Ok(Some(ClientEntry {
        parent: reader.read_pubkey("parent")?,
        registered: reader.read_pubkey("registered")?,
        until: reader.read_i64("until")?,
        limit: reader.read_u32("limit")?,
    }))
}

/// Decodes a node entry account.
///
/// The program allocates a fixed amount of space, so bytes past the `active`
/// flag are padding and are ignored. A domain length that would run past the
/// end of the data is `MalformedAccount`.
pub fn decode_node_entry(data: &[u8]) -> Result<Option<NodeEntry>, RegistryError> {
    if data.is_empty() {
        return Ok(None);
    }
    if data.len() < NODE_ENTRY_MIN_SIZE {
        return Err(RegistryError::MalformedAccount(format!(
            "node entry needs at least {NODE_ENTRY_MIN_SIZE} bytes, got {}",
            data.len()
        )));
    }

    let mut reader = ByteReader::new(data);
    reader.expect_discriminator(AccountKind::NodeEntry)?;
    Ok(Some(NodeEntry {
        parent: reader.read_pubkey("parent")?,
        registered: reader.read_pubkey("registered")?,
        domain: reader.read_string("domain")?,
        online: reader.read_i32("online")?,
        active: reader.read_bool("active")?,
    }))
}

/// Serializes a client entry exactly as the program stores it.
pub fn encode_client_entry(entry: &ClientEntry) -> Vec<u8> {
    let mut writer = ByteWriter::with_discriminator(AccountKind::ClientEntry.discriminator());
    writer
        .put_pubkey(&entry.parent)
        .put_pubkey(&entry.registered)
        .put_i64(entry.until)
        .put_u32(entry.limit);
    writer.into_inner()
}

/// Serializes a node entry, zero-padded to the space the program allocates.
pub fn encode_node_entry(entry: &NodeEntry) -> Vec<u8> {
    let mut writer = ByteWriter::with_discriminator(AccountKind::NodeEntry.discriminator());
    writer
        .put_pubkey(&entry.parent)
        .put_pubkey(&entry.registered)
        .put_string(&entry.domain)
        .put_i32(entry.online)
        .put_bool(entry.active);
    let mut data = writer.into_inner();
    if data.len() < NODE_ENTRY_SIZE {
        data.resize(NODE_ENTRY_SIZE, 0);
    }
    data
}

/// Decodes the return data of the `check_client` view.
pub fn decode_client_info(data: &[u8]) -> Result<ClientInfo, RegistryError> {
    let mut reader = ByteReader::new(data);
    Ok(ClientInfo {
        until: reader.read_i64("until")?,
        limit: reader.read_u32("limit")?,
    })
}

/// Decodes the return data of the `check_node` view.
pub fn decode_node_info(data: &[u8]) -> Result<NodeInfo, RegistryError> {
    let mut reader = ByteReader::new(data);
    Ok(NodeInfo {
        domain: reader.read_string("domain")?,
        active: reader.read_bool("active")?,
    })
}
