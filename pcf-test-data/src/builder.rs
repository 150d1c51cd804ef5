//! Synthesizing PCF files for tests.
//!
//! The builder lays tables out back to back in type order, immediately after
//! the directory, so the output for a simple font is byte-identical to what a
//! hand-written fixture would contain.

/// Table type bits, as stored in the directory.
pub const PROPERTIES: u32 = 1 << 0;
pub const ACCELERATORS: u32 = 1 << 1;
pub const METRICS: u32 = 1 << 2;
pub const BITMAPS: u32 = 1 << 3;
pub const INK_METRICS: u32 = 1 << 4;
pub const BDF_ENCODINGS: u32 = 1 << 5;
pub const BDF_ACCELERATORS: u32 = 1 << 8;

const MAGIC: &[u8; 4] = b"\x01fcp";
const COMPRESSED: u32 = 0x100;
const INK_BOUNDS: u32 = 0x100;
const LOW_BITS: u32 = 0xFF;

/// A glyph to be written, with canonical (MSBit first, unpadded) rows.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TestGlyph {
    pub code_point: u32,
    pub left: i16,
    pub right: i16,
    pub advance: i16,
    pub ascent: i16,
    pub descent: i16,
    pub attributes: u16,
    pub rows: Vec<Vec<u8>>,
}

impl TestGlyph {
    pub fn new(
        code_point: u32,
        left: i16,
        right: i16,
        advance: i16,
        ascent: i16,
        descent: i16,
    ) -> Self {
        Self {
            code_point,
            left,
            right,
            advance,
            ascent,
            descent,
            ..Default::default()
        }
    }

    pub fn rows<R: AsRef<[u8]>>(mut self, rows: impl IntoIterator<Item = R>) -> Self {
        self.rows = rows.into_iter().map(|row| row.as_ref().to_vec()).collect();
        self
    }

    pub fn attributes(mut self, attributes: u16) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn width(&self) -> usize {
        (self.right as i32 - self.left as i32).max(0) as usize
    }

    pub fn height(&self) -> usize {
        (self.ascent as i32 + self.descent as i32).max(0) as usize
    }

    fn fields(&self) -> [i16; 5] {
        [self.left, self.right, self.advance, self.ascent, self.descent]
    }
}

/// Contents of an accelerator table; min/max bounds are computed from the
/// glyphs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Accelerators {
    /// noOverlap, constantMetrics, terminalFont, constantWidth, inkInside,
    /// inkMetrics, drawDirection, padding
    pub flags: [u8; 8],
    pub font_ascent: i32,
    pub font_descent: i32,
    pub max_overlap: i32,
    /// Explicit ink (min, max) bounds as lsb, rsb, width, ascent, descent.
    pub ink_bounds: Option<[[i16; 5]; 2]>,
}

#[derive(Clone, Debug)]
enum TestProperty {
    Int(i32),
    Str(String),
}

/// Builds a complete PCF file in memory.
#[derive(Clone, Debug)]
pub struct PcfBuilder {
    glyphs: Vec<TestGlyph>,
    metrics_format: u32,
    bitmap_format: u32,
    encoding_format: u32,
    table_format: u32,
    accelerators: Option<Accelerators>,
    bdf_accelerators: Option<Accelerators>,
    ink_metrics: bool,
    properties: Vec<(String, TestProperty)>,
    default_char: u32,
}

impl Default for PcfBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PcfBuilder {
    pub fn new() -> Self {
        Self {
            glyphs: Vec::new(),
            metrics_format: 0x0E,
            bitmap_format: 0x0E,
            encoding_format: 0x0E,
            table_format: 0x0E,
            accelerators: None,
            bdf_accelerators: None,
            ink_metrics: false,
            properties: Vec::new(),
            default_char: 0xFFFF,
        }
    }

    /// Use `format` (low byte only) for every table.
    pub fn format(mut self, format: u32) -> Self {
        let format = format & LOW_BITS;
        self.metrics_format = (self.metrics_format & !LOW_BITS) | format;
        self.bitmap_format = format;
        self.encoding_format = format;
        self.table_format = format;
        self
    }

    /// Format of the metrics table; set `0x100` for compressed metrics.
    pub fn metrics_format(mut self, format: u32) -> Self {
        self.metrics_format = format;
        self
    }

    pub fn bitmap_format(mut self, format: u32) -> Self {
        self.bitmap_format = format;
        self
    }

    pub fn encoding_format(mut self, format: u32) -> Self {
        self.encoding_format = format;
        self
    }

    pub fn accelerators(mut self, accelerators: Accelerators) -> Self {
        self.accelerators = Some(accelerators);
        self
    }

    pub fn bdf_accelerators(mut self, accelerators: Accelerators) -> Self {
        self.bdf_accelerators = Some(accelerators);
        self
    }

    /// Also write an INK_METRICS table mirroring the metrics table.
    pub fn ink_metrics(mut self) -> Self {
        self.ink_metrics = true;
        self
    }

    pub fn glyph(mut self, glyph: TestGlyph) -> Self {
        self.glyphs.push(glyph);
        self
    }

    pub fn glyphs(mut self, glyphs: impl IntoIterator<Item = TestGlyph>) -> Self {
        self.glyphs.extend(glyphs);
        self
    }

    pub fn default_char(mut self, code_point: u32) -> Self {
        self.default_char = code_point;
        self
    }

    pub fn property_int(mut self, name: &str, value: i32) -> Self {
        self.properties
            .push((name.to_string(), TestProperty::Int(value)));
        self
    }

    pub fn property_str(mut self, name: &str, value: &str) -> Self {
        self.properties
            .push((name.to_string(), TestProperty::Str(value.to_string())));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut tables: Vec<(u32, u32, Vec<u8>)> = Vec::new();
        if !self.properties.is_empty() {
            tables.push((PROPERTIES, self.table_format, self.write_properties()));
        }
        if let Some(accel) = &self.accelerators {
            let format = self.accel_format(accel);
            tables.push((ACCELERATORS, format, self.write_accelerators(accel, format)));
        }
        tables.push((METRICS, self.metrics_format, self.write_metrics()));
        tables.push((BITMAPS, self.bitmap_format, self.write_bitmaps()));
        if self.ink_metrics {
            tables.push((INK_METRICS, self.metrics_format, self.write_metrics()));
        }
        tables.push((BDF_ENCODINGS, self.encoding_format, self.write_encodings()));
        if let Some(accel) = &self.bdf_accelerators {
            let format = self.accel_format(accel);
            tables.push((BDF_ACCELERATORS, format, self.write_accelerators(accel, format)));
        }

        let mut out = Vec::new();
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&(tables.len() as u32).to_le_bytes());
        let mut offset = 8 + 16 * tables.len();
        for (kind, format, data) in &tables {
            for word in [*kind, *format, data.len() as u32, offset as u32] {
                out.extend_from_slice(&word.to_le_bytes());
            }
            offset += data.len();
        }
        for (_, _, data) in &tables {
            out.extend_from_slice(data);
        }
        out
    }

    fn accel_format(&self, accel: &Accelerators) -> u32 {
        if accel.ink_bounds.is_some() {
            self.table_format | INK_BOUNDS
        } else {
            self.table_format
        }
    }

    fn write_metrics(&self) -> Vec<u8> {
        let mut table = TableWriter::new(self.metrics_format);
        if self.metrics_format & COMPRESSED != 0 {
            table.u16(self.glyphs.len() as u16);
            for glyph in &self.glyphs {
                for field in glyph.fields() {
                    table.u8((field + 0x80) as u8);
                }
            }
        } else {
            table.u32(self.glyphs.len() as u32);
            for glyph in &self.glyphs {
                for field in glyph.fields() {
                    table.i16(field);
                }
                table.u16(glyph.attributes);
            }
        }
        table.finish()
    }

    fn write_bitmaps(&self) -> Vec<u8> {
        let mut table = TableWriter::new(self.bitmap_format);
        table.u32(self.glyphs.len() as u32);
        let pad = 1usize << (self.bitmap_format & 3);
        let mut offset = 0usize;
        for glyph in &self.glyphs {
            table.u32(offset as u32);
            offset += bytes_per_row(glyph.width(), pad) * glyph.height();
        }
        for pad_index in 0..4 {
            let total: usize = self
                .glyphs
                .iter()
                .map(|glyph| bytes_per_row(glyph.width(), 1 << pad_index) * glyph.height())
                .sum();
            table.u32(total as u32);
        }
        for glyph in &self.glyphs {
            table.bytes(&encode_rows(
                &glyph.rows,
                glyph.width(),
                glyph.height(),
                self.bitmap_format,
            ));
        }
        table.finish()
    }

    fn write_encodings(&self) -> Vec<u8> {
        let mut table = TableWriter::new(self.encoding_format);
        let (mut min1, mut max1, mut min2, mut max2) = (0xFFu32, 0u32, 0xFFu32, 0u32);
        for glyph in &self.glyphs {
            let (byte1, byte2) = (glyph.code_point >> 8, glyph.code_point & 0xFF);
            min1 = min1.min(byte1);
            max1 = max1.max(byte1);
            min2 = min2.min(byte2);
            max2 = max2.max(byte2);
        }
        if self.glyphs.is_empty() {
            (min1, max1, min2, max2) = (0, 0, 0, 0);
        }
        for value in [min2, max2, min1, max1, self.default_char] {
            table.u16(value as u16);
        }
        let cols = (max2 - min2 + 1) as usize;
        let mut indices = vec![0xFFFFu16; cols * (max1 - min1 + 1) as usize];
        for (glyph_index, glyph) in self.glyphs.iter().enumerate() {
            let (byte1, byte2) = (glyph.code_point >> 8, glyph.code_point & 0xFF);
            indices[(byte1 - min1) as usize * cols + (byte2 - min2) as usize] = glyph_index as u16;
        }
        for index in indices {
            table.u16(index);
        }
        table.finish()
    }

    fn write_accelerators(&self, accel: &Accelerators, format: u32) -> Vec<u8> {
        let mut table = TableWriter::new(format);
        table.bytes(&accel.flags);
        table.i32(accel.font_ascent);
        table.i32(accel.font_descent);
        table.i32(accel.max_overlap);
        let mut min = [i16::MAX; 5];
        let mut max = [i16::MIN; 5];
        for glyph in &self.glyphs {
            for (i, field) in glyph.fields().into_iter().enumerate() {
                min[i] = min[i].min(field);
                max[i] = max[i].max(field);
            }
        }
        if self.glyphs.is_empty() {
            (min, max) = ([0; 5], [0; 5]);
        }
        let mut bounds = vec![min, max];
        if let Some([ink_min, ink_max]) = accel.ink_bounds {
            bounds.extend([ink_min, ink_max]);
        }
        for fields in bounds {
            for field in fields {
                table.i16(field);
            }
            table.u16(0);
        }
        table.finish()
    }

    fn write_properties(&self) -> Vec<u8> {
        let mut table = TableWriter::new(self.table_format);
        let mut pool = Vec::new();
        let mut intern = |s: &str| {
            let offset = pool.len() as i32;
            pool.extend_from_slice(s.as_bytes());
            pool.push(0);
            offset
        };
        let records: Vec<_> = self
            .properties
            .iter()
            .map(|(name, value)| {
                let name_offset = intern(name);
                match value {
                    TestProperty::Int(v) => (name_offset, 0u8, *v),
                    TestProperty::Str(s) => (name_offset, 1u8, intern(s)),
                }
            })
            .collect();
        table.i32(records.len() as i32);
        for (name_offset, is_string, value) in &records {
            table.i32(*name_offset);
            table.u8(*is_string);
            table.i32(*value);
        }
        if records.len() % 4 != 0 {
            table.bytes(&vec![0; 4 - records.len() % 4]);
        }
        table.i32(pool.len() as i32);
        table.bytes(&pool);
        table.finish()
    }
}

/// Number of stored bytes per row for a glyph `width` pixels wide.
pub fn bytes_per_row(width: usize, pad: usize) -> usize {
    width.div_ceil(8 * pad) * pad
}

/// Encode canonical rows into the padded, ordered layout described by
/// `format`. This is the inverse of the unpacker under test.
pub fn encode_rows<R: AsRef<[u8]>>(
    rows: &[R],
    width: usize,
    height: usize,
    format: u32,
) -> Vec<u8> {
    let pad = 1usize << (format & 3);
    let byte_msb = format & (1 << 2) != 0;
    let bit_msb = format & (1 << 3) != 0;
    let scan = 1usize << ((format >> 4) & 3);
    let unit = scan.min(pad);
    let stride = bytes_per_row(width, pad);
    let mut out = vec![0u8; stride * height];
    for (y, row) in out.chunks_exact_mut(stride.max(1)).take(height).enumerate() {
        if let Some(src) = rows.get(y) {
            let src = src.as_ref();
            let len = src.len().min(stride);
            row[..len].copy_from_slice(&src[..len]);
        }
        if !bit_msb {
            row.iter_mut().for_each(|byte| *byte = byte.reverse_bits());
        }
        if byte_msb != bit_msb && unit > 1 {
            row.chunks_exact_mut(unit).for_each(|chunk| chunk.reverse());
        }
    }
    out
}

struct TableWriter {
    data: Vec<u8>,
    msb: bool,
}

impl TableWriter {
    fn new(format: u32) -> Self {
        Self {
            data: format.to_le_bytes().to_vec(),
            msb: format & (1 << 2) != 0,
        }
    }

    fn u8(&mut self, value: u8) {
        self.data.push(value);
    }

    fn u16(&mut self, value: u16) {
        let bytes = if self.msb {
            value.to_be_bytes()
        } else {
            value.to_le_bytes()
        };
        self.data.extend_from_slice(&bytes);
    }

    fn i16(&mut self, value: i16) {
        self.u16(value as u16)
    }

    fn u32(&mut self, value: u32) {
        let bytes = if self.msb {
            value.to_be_bytes()
        } else {
            value.to_le_bytes()
        };
        self.data.extend_from_slice(&bytes);
    }

    fn i32(&mut self, value: i32) {
        self.u32(value as u32)
    }

    fn bytes(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    fn finish(self) -> Vec<u8> {
        self.data
    }
}
