use std::borrow::Cow;

/// A string-table section: NUL-terminated names addressed by byte offset.
#[derive(Debug, Clone, Copy)]
pub struct StringTable<'a> {
    bytes: &'a [u8],
}

impl<'a> StringTable<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// Returns the string starting at `offset`, up to the next NUL or the
    /// end of the table. `None` if `offset` lies outside the table.
    ///
    /// Invalid UTF-8 is replaced rather than rejected.
    pub fn get(&self, offset: u32) -> Option<Cow<'a, str>> {
        let start = offset as usize;
        let tail = self.bytes.get(start..).filter(|tail| !tail.is_empty())?;
        let end = tail.iter().position(|&b| b == 0).unwrap_or(tail.len());
        Some(String::from_utf8_lossy(&tail[..end]))
    }

    /// Like [`StringTable::get`], copying the name out and falling back to
    /// an empty string.
    pub fn name_at(&self, offset: u32) -> String {
        self.get(offset).map(Cow::into_owned).unwrap_or_default()
    }
}
