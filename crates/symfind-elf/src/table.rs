use std::marker::PhantomData;

use goblin::container::{Container, Ctx};

/// Fixed-size ELF record whose layout depends on the image word size.
pub trait Record: Sized {
    /// Size of the record for the given word size.
    fn record_size(container: Container) -> usize;

    /// Decodes the record at `offset`.
    fn parse(bytes: &[u8], offset: usize, ctx: Ctx) -> crate::Result<Self>;
}

/// Array of records laid out at a file offset with a given stride.
///
/// The whole extent of the table is checked against the image on
/// construction.
pub struct Table<'a, T> {
    image: &'a [u8],
    offset: usize,
    stride: usize,
    count: usize,
    ctx: Ctx,
    _record: PhantomData<T>,
}

impl<'a, T: Record> Table<'a, T> {
    /// Creates a table of `count` records, or returns `None` if the stride
    /// cannot hold a record or the table does not fit in `image`.
    pub fn new(
        image: &'a [u8],
        offset: usize,
        stride: usize,
        count: usize,
        ctx: Ctx,
    ) -> Option<Self> {
        if stride < T::record_size(ctx.container) {
            return None;
        }

        let end = match count.checked_sub(1) {
            Some(last) => stride
                .checked_mul(last)?
                .checked_add(offset)?
                .checked_add(T::record_size(ctx.container))?,
            None => offset,
        };

        if end > image.len() {
            return None;
        }

        Some(Self {
            image,
            offset,
            stride,
            count,
            ctx,
            _record: PhantomData,
        })
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether the table has no record.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Decodes the record at `index`, if any.
    pub fn get(&self, index: usize) -> Option<crate::Result<T>> {
        (index < self.count).then(|| self.parse_at(index))
    }

    /// Iterates over the records in table order.
    pub fn iter(&self) -> impl Iterator<Item = crate::Result<T>> + '_ {
        (0..self.count).map(|index| self.parse_at(index))
    }

    fn parse_at(&self, index: usize) -> crate::Result<T> {
        // in bounds, the extent was checked on construction
        T::parse(self.image, self.offset + index * self.stride, self.ctx)
    }
}

/// Converts a file offset or size to `usize`.
pub(crate) fn to_usize(value: u64) -> Option<usize> {
    usize::try_from(value).ok()
}
