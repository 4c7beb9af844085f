//! Synthesizes minimal ELF images for tests.

#![allow(dead_code)]

use byteorder::{BigEndian, LittleEndian, WriteBytesExt};
use goblin::elf::section_header::{SHT_DYNSYM, SHT_STRTAB, SHT_SYMTAB};
use goblin::elf::sym::{STB_GLOBAL, STB_LOCAL, STT_FUNC, STT_OBJECT};

/// Offset of `e_shentsize` in the file header.
pub fn shentsize_offset(is_64bit: bool) -> usize {
    if is_64bit { 58 } else { 46 }
}

/// Offset of `e_shnum` in the file header.
pub fn shnum_offset(is_64bit: bool) -> usize {
    shentsize_offset(is_64bit) + 2
}

/// Offset of `e_shstrndx` in the file header.
pub fn shstrndx_offset(is_64bit: bool) -> usize {
    shentsize_offset(is_64bit) + 4
}

/// File offset of the section header at `index`, in a little-endian image.
pub fn section_header_offset(image: &[u8], is_64bit: bool, index: usize) -> usize {
    let (shoff, shdr_size) = if is_64bit {
        (u64::from_le_bytes(image[40..48].try_into().unwrap()), 64)
    } else {
        (u64::from(u32::from_le_bytes(image[32..36].try_into().unwrap())), 40)
    };

    shoff as usize + index * shdr_size
}

/// Overwrites `sh_offset` of the section at `index`, in a little-endian image.
pub fn set_section_offset(image: &mut [u8], is_64bit: bool, index: usize, value: u64) {
    let field = section_header_offset(image, is_64bit, index) + if is_64bit { 24 } else { 16 };
    put_word(image, is_64bit, field, value);
}

/// Overwrites `sh_size` of the section at `index`, in a little-endian image.
pub fn set_section_size(image: &mut [u8], is_64bit: bool, index: usize, value: u64) {
    let field = section_header_offset(image, is_64bit, index) + if is_64bit { 32 } else { 20 };
    put_word(image, is_64bit, field, value);
}

fn put_word(image: &mut [u8], is_64bit: bool, offset: usize, value: u64) {
    if is_64bit {
        image[offset..offset + 8].copy_from_slice(&value.to_le_bytes());
    } else {
        image[offset..offset + 4].copy_from_slice(&(value as u32).to_le_bytes());
    }
}

#[derive(Clone)]
pub struct TestSymbol {
    pub name: &'static str,
    pub value: u64,
    pub size: u64,
    pub info: u8,
    pub shndx: u16,
}

impl TestSymbol {
    pub fn func(name: &'static str, value: u64) -> Self {
        Self {
            name,
            value,
            size: 0x10,
            info: (STB_GLOBAL << 4) | STT_FUNC,
            shndx: 1,
        }
    }

    pub fn local_func(name: &'static str, value: u64) -> Self {
        Self {
            info: (STB_LOCAL << 4) | STT_FUNC,
            ..Self::func(name, value)
        }
    }

    pub fn object(name: &'static str, value: u64) -> Self {
        Self {
            info: (STB_GLOBAL << 4) | STT_OBJECT,
            ..Self::func(name, value)
        }
    }
}

enum Content {
    Raw(Vec<u8>),
    Names(Vec<TestSymbol>),
    Symbols(Vec<TestSymbol>),
}

struct TestSection {
    name: String,
    sh_type: u32,
    content: Content,
    entsize: Option<u64>,
}

pub struct ElfBuilder {
    is_64bit: bool,
    big_endian: bool,
    sections: Vec<TestSection>,
}

impl ElfBuilder {
    pub fn new(is_64bit: bool) -> Self {
        Self {
            is_64bit,
            big_endian: false,
            sections: Vec::new(),
        }
    }

    pub fn big_endian(mut self) -> Self {
        self.big_endian = true;
        self
    }

    /// Adds a section with arbitrary content.
    pub fn section(mut self, name: &str, sh_type: u32, data: Vec<u8>) -> Self {
        self.sections.push(TestSection {
            name: name.to_owned(),
            sh_type,
            content: Content::Raw(data),
            entsize: None,
        });
        self
    }

    /// Adds a string table holding the names of `symbols`.
    pub fn strings(mut self, name: &str, symbols: &[TestSymbol]) -> Self {
        self.sections.push(TestSection {
            name: name.to_owned(),
            sh_type: SHT_STRTAB,
            content: Content::Names(symbols.to_vec()),
            entsize: None,
        });
        self
    }

    /// Adds a symbol table whose names are laid out as by [Self::strings].
    ///
    /// A null symbol is always emitted first.
    pub fn symbols(mut self, name: &str, symbols: &[TestSymbol]) -> Self {
        let sh_type = if name == ".dynsym" {
            SHT_DYNSYM
        } else {
            SHT_SYMTAB
        };

        self.sections.push(TestSection {
            name: name.to_owned(),
            sh_type,
            content: Content::Symbols(symbols.to_vec()),
            entsize: None,
        });
        self
    }

    /// Adds `.symtab` and `.strtab`.
    pub fn static_symbols(self, symbols: &[TestSymbol]) -> Self {
        self.symbols(".symtab", symbols).strings(".strtab", symbols)
    }

    /// Adds `.dynsym` and `.dynstr`.
    pub fn dynamic_symbols(self, symbols: &[TestSymbol]) -> Self {
        self.symbols(".dynsym", symbols).strings(".dynstr", symbols)
    }

    /// Overrides the entry size of the last added section.
    pub fn entsize(mut self, entsize: u64) -> Self {
        if let Some(section) = self.sections.last_mut() {
            section.entsize = Some(entsize);
        }
        self
    }

    /// Size of the file header.
    pub fn header_size(&self) -> usize {
        if self.is_64bit { 64 } else { 52 }
    }

    /// Index of `.shstrtab`, always the last section.
    pub fn shstrndx(&self) -> u16 {
        self.sections.len() as u16 + 1
    }

    pub fn build(&self) -> Vec<u8> {
        let mut shstrtab = vec![0u8];
        let mut sections = Vec::new();

        for section in &self.sections {
            let name = shstrtab.len() as u32;
            shstrtab.extend_from_slice(section.name.as_bytes());
            shstrtab.push(0);

            let data = match &section.content {
                Content::Raw(data) => data.clone(),
                Content::Names(symbols) => string_table(symbols).0,
                Content::Symbols(symbols) => self.symbol_table(symbols),
            };

            let entsize = section.entsize.unwrap_or(match section.content {
                Content::Symbols(_) => self.sym_size() as u64,
                _ => 0,
            });

            sections.push((name, section.sh_type, data, entsize));
        }

        let name = shstrtab.len() as u32;
        shstrtab.extend_from_slice(b".shstrtab\0");
        sections.push((name, SHT_STRTAB, shstrtab, 0));

        // section contents right after the header, then the section headers
        let mut body = Vec::new();
        let mut offsets = Vec::new();

        for (_, _, data, _) in &sections {
            align(&mut body, self.header_size(), 8);
            offsets.push((self.header_size() + body.len()) as u64);
            body.extend_from_slice(data);
        }

        align(&mut body, self.header_size(), 8);
        let shoff = (self.header_size() + body.len()) as u64;

        let mut w = self.writer();
        self.write_header(&mut w, shoff, sections.len() as u16 + 1);
        w.buf.extend_from_slice(&body);

        // null section
        w.buf.extend(std::iter::repeat_n(0u8, self.shdr_size()));

        for ((name, sh_type, data, entsize), offset) in sections.iter().zip(offsets) {
            w.u32(*name);
            w.u32(*sh_type);
            w.word(0); // flags
            w.word(0); // addr
            w.word(offset);
            w.word(data.len() as u64);
            w.u32(0); // link
            w.u32(0); // info
            w.word(1); // addralign
            w.word(*entsize);
        }

        w.buf
    }

    fn sym_size(&self) -> usize {
        if self.is_64bit { 24 } else { 16 }
    }

    fn shdr_size(&self) -> usize {
        if self.is_64bit { 64 } else { 40 }
    }

    fn writer(&self) -> Writer {
        Writer {
            buf: Vec::new(),
            is_64bit: self.is_64bit,
            big_endian: self.big_endian,
        }
    }

    fn write_header(&self, w: &mut Writer, shoff: u64, shnum: u16) {
        w.buf.extend_from_slice(b"\x7fELF");
        w.u8(if self.is_64bit { 2 } else { 1 });
        w.u8(if self.big_endian { 2 } else { 1 });
        w.u8(1); // EI_VERSION
        w.buf.extend_from_slice(&[0u8; 9]);

        w.u16(3); // ET_DYN
        w.u16(if self.is_64bit { 62 } else { 3 });
        w.u32(1);
        w.word(0x1040); // entry
        w.word(0); // phoff
        w.word(shoff);
        w.u32(0); // flags
        w.u16(self.header_size() as u16);
        w.u16(0); // phentsize
        w.u16(0); // phnum
        w.u16(self.shdr_size() as u16);
        w.u16(shnum);
        w.u16(shnum - 1); // shstrndx
    }

    fn symbol_table(&self, symbols: &[TestSymbol]) -> Vec<u8> {
        let (_, names) = string_table(symbols);
        let mut w = self.writer();

        // null symbol
        w.buf.extend(std::iter::repeat_n(0u8, self.sym_size()));

        for (sym, name) in symbols.iter().zip(names) {
            if self.is_64bit {
                w.u32(name);
                w.u8(sym.info);
                w.u8(0);
                w.u16(sym.shndx);
                w.u64(sym.value);
                w.u64(sym.size);
            } else {
                w.u32(name);
                w.u32(sym.value as u32);
                w.u32(sym.size as u32);
                w.u8(sym.info);
                w.u8(0);
                w.u16(sym.shndx);
            }
        }

        w.buf
    }
}

/// Returns the string table content for `symbols`, and each name offset.
fn string_table(symbols: &[TestSymbol]) -> (Vec<u8>, Vec<u32>) {
    let mut strtab = vec![0u8];
    let mut offsets = Vec::new();

    for sym in symbols {
        offsets.push(strtab.len() as u32);
        strtab.extend_from_slice(sym.name.as_bytes());
        strtab.push(0);
    }

    (strtab, offsets)
}

fn align(body: &mut Vec<u8>, base: usize, alignment: usize) {
    while (base + body.len()) % alignment != 0 {
        body.push(0);
    }
}

struct Writer {
    buf: Vec<u8>,
    is_64bit: bool,
    big_endian: bool,
}

impl Writer {
    fn u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn u16(&mut self, v: u16) {
        if self.big_endian {
            self.buf.write_u16::<BigEndian>(v).unwrap();
        } else {
            self.buf.write_u16::<LittleEndian>(v).unwrap();
        }
    }

    fn u32(&mut self, v: u32) {
        if self.big_endian {
            self.buf.write_u32::<BigEndian>(v).unwrap();
        } else {
            self.buf.write_u32::<LittleEndian>(v).unwrap();
        }
    }

    fn u64(&mut self, v: u64) {
        if self.big_endian {
            self.buf.write_u64::<BigEndian>(v).unwrap();
        } else {
            self.buf.write_u64::<LittleEndian>(v).unwrap();
        }
    }

    /// Writes a class-dependent word.
    fn word(&mut self, v: u64) {
        if self.is_64bit {
            self.u64(v);
        } else {
            self.u32(v as u32);
        }
    }
}
