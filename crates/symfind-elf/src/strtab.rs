use crate::section::SectionHeader;

/// String table section: a blob of NUL-terminated names referenced by offset.
#[derive(Debug, Clone, Copy)]
pub struct StringTable<'a> {
    name: &'static str,
    bytes: &'a [u8],
}

impl<'a> StringTable<'a> {
    /// Borrows the content of the string table section `shdr` from `image`.
    pub fn from_section(
        image: &'a [u8],
        shdr: &SectionHeader,
        name: &'static str,
    ) -> crate::Result<Self> {
        let bytes = shdr
            .file_range()
            .and_then(|range| image.get(range))
            .ok_or(crate::Error::SectionOutOfBounds {
                name,
                offset: shdr.offset(),
                size: shdr.size(),
            })?;

        Ok(Self { name, bytes })
    }

    /// Wraps raw string table content.
    pub fn new(bytes: &'a [u8], name: &'static str) -> Self {
        Self { name, bytes }
    }

    /// Name of the section holding this table.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the NUL-terminated string starting at `offset`, without its
    /// terminator.
    ///
    /// The string must terminate within the table.
    pub fn get(&self, offset: u64) -> crate::Result<&'a [u8]> {
        let invalid = || crate::Error::InvalidString {
            table: self.name,
            offset,
        };

        let tail = usize::try_from(offset)
            .ok()
            .and_then(|offset| self.bytes.get(offset..))
            .ok_or_else(invalid)?;

        let end = tail.iter().position(|&b| b == 0).ok_or_else(invalid)?;

        Ok(&tail[..end])
    }
}
