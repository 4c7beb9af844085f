use goblin::container::{Container, Ctx};
use goblin::elf::header::{
    EI_CLASS, EI_DATA, ELFCLASS32, ELFCLASS64, ELFDATA2LSB, ELFDATA2MSB, ELFMAG, SELFMAG,
};
use goblin::elf::{Elf, Header};
use goblin::{elf32, elf64};
use scroll::Endian;

/// ELF file header, along with the decoding context it declares.
///
/// Fields of 32-bit headers are widened to their 64-bit counterpart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FileHeader {
    header: Header,
    ctx: Ctx,
}

impl FileHeader {
    /// Decodes the file header at the start of `image`.
    pub fn parse(image: &[u8]) -> crate::Result<Self> {
        let len = image.len();

        // the identification is only trusted once the smallest header fits
        if len < elf32::header::SIZEOF_EHDR || image[..SELFMAG] != ELFMAG[..] {
            return Err(crate::Error::MalformedHeader { len });
        }

        let container = match image[EI_CLASS] {
            ELFCLASS32 => Container::Little,
            ELFCLASS64 => Container::Big,
            other => return Err(crate::Error::UnsupportedClass(other)),
        };

        if !matches!(image[EI_DATA], ELFDATA2LSB | ELFDATA2MSB) {
            return Err(crate::Error::MalformedHeader { len });
        }

        let needed = header_size(container);
        if len < needed {
            return Err(crate::Error::TruncatedFile { needed, len });
        }

        let header = Elf::parse_header(image)?;
        let ctx = Ctx::new(container, header.endianness()?);

        tracing::debug!(
            ?container,
            endianness = ?ctx.le,
            shoff = format_args!("{:#x}", header.e_shoff),
            shnum = header.e_shnum,
            shstrndx = header.e_shstrndx,
            "decoded elf header"
        );

        Ok(Self { header, ctx })
    }

    /// Raw header, as decoded by [goblin].
    pub fn raw(&self) -> &Header {
        &self.header
    }

    /// Decoding context for the records of this image.
    pub fn ctx(&self) -> Ctx {
        self.ctx
    }

    /// Word size of the image: [Container::Little] for 32-bit images,
    /// [Container::Big] for 64-bit ones.
    pub fn container(&self) -> Container {
        self.ctx.container
    }

    /// Byte order of the image, from `EI_DATA`.
    pub fn endian(&self) -> Endian {
        self.ctx.le
    }

    /// Object file type (`e_type`).
    pub fn file_type(&self) -> u16 {
        self.header.e_type
    }

    /// Target architecture (`e_machine`).
    pub fn machine(&self) -> u16 {
        self.header.e_machine
    }

    /// Entry point virtual address.
    pub fn entry(&self) -> u64 {
        self.header.e_entry
    }

    /// File offset of the section header table.
    pub fn shoff(&self) -> u64 {
        self.header.e_shoff
    }

    /// Size of a section header table entry.
    pub fn shentsize(&self) -> u16 {
        self.header.e_shentsize
    }

    /// Number of section header table entries.
    pub fn shnum(&self) -> u16 {
        self.header.e_shnum
    }

    /// Section header table index of the section name string table.
    pub fn shstrndx(&self) -> u16 {
        self.header.e_shstrndx
    }
}

/// Size of the file header for the given word size.
pub fn header_size(container: Container) -> usize {
    match container {
        Container::Little => elf32::header::SIZEOF_EHDR,
        Container::Big => elf64::header::SIZEOF_EHDR,
    }
}
